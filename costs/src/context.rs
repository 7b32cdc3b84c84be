//! `CostContext` and the combinators used to thread costs through results.

use crate::OperationCost;

/// Wrapped operation result with associated cost.
#[must_use]
#[derive(Debug, Eq, PartialEq)]
pub struct CostContext<T> {
    /// Wrapped operation's return value.
    pub value: T,
    /// Cost of the operation.
    pub cost: OperationCost,
}

impl<T> CostContext<T> {
    /// Take wrapped value out adding its cost to provided accumulator.
    pub fn unwrap_add_cost(self, acc_cost: &mut OperationCost) -> T {
        *acc_cost += self.cost;
        self.value
    }

    /// Take wrapped value out dropping cost data.
    pub fn unwrap(self) -> T {
        self.value
    }
}

/// Type alias for `Result` wrapped into `CostContext`.
pub type CostResult<T, E> = CostContext<Result<T, E>>;

impl<T, E> CostResult<T, E> {
    /// Chain a fallible step after an `Ok`, summing both costs. On `Err` the
    /// step is skipped and the cost so far is kept.
    pub fn flat_map_ok<B>(self, f: impl FnOnce(T) -> CostResult<B, E>) -> CostResult<B, E> {
        let mut cost = self.cost;
        let result = match self.value {
            Ok(x) => f(x).unwrap_add_cost(&mut cost),
            Err(e) => Err(e),
        };
        CostContext {
            value: result,
            cost,
        }
    }
}

/// Extension trait to add costs context to values.
pub trait CostsExt {
    /// Wraps any value into a `CostContext` object with provided costs.
    fn wrap_with_cost(self, cost: OperationCost) -> CostContext<Self>
    where
        Self: Sized,
    {
        CostContext { value: self, cost }
    }
}

impl<T> CostsExt for T {}

/// Works like `?` for functions returning `CostResult`: unwraps a
/// `CostResult`, adding its cost to the accumulator, and on error returns
/// early with everything accumulated so far.
#[macro_export]
macro_rules! cost_return_on_error {
    ( &mut $cost:ident, $($body:tt)+ ) => {
        {
            use $crate::CostsExt;
            let result_with_cost = { $($body)+ };
            let result = result_with_cost.unwrap_add_cost(&mut $cost);
            match result {
                Ok(x) => x,
                Err(e) => return Err(e).wrap_with_cost($cost),
            }
        }
    };
}

/// Same as [`cost_return_on_error`] but for a plain `Result`: nothing is added
/// to the accumulator, which is returned as-is on error.
#[macro_export]
macro_rules! cost_return_on_error_no_add {
    ( &$cost:ident, $($body:tt)+ ) => {
        {
            use $crate::CostsExt;
            let result = { $($body)+ };
            match result {
                Ok(x) => x,
                Err(e) => return Err(e).wrap_with_cost($cost),
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap_add_cost_accumulates() {
        let mut acc = OperationCost::with_node_reads(1);
        let value = 7u32
            .wrap_with_cost(OperationCost::with_node_reads(2))
            .unwrap_add_cost(&mut acc);
        assert_eq!(value, 7);
        assert_eq!(acc, OperationCost::with_node_reads(3));
    }

    #[test]
    fn test_flat_map_ok_skips_on_err() {
        let initial: CostResult<usize, ()> = Err(()).wrap_with_cost(OperationCost::with_node_reads(3));
        let mut executed = false;
        let mapped = initial.flat_map_ok(|x| {
            executed = true;
            Ok(x + 25).wrap_with_cost(OperationCost::with_node_reads(7))
        });

        assert!(!executed);
        assert_eq!(mapped.cost, OperationCost::with_node_reads(3));
        assert_eq!(mapped.value, Err(()));
    }

    #[test]
    fn test_flat_map_ok_sums_costs() {
        let initial: CostResult<usize, ()> = Ok(75).wrap_with_cost(OperationCost::with_node_reads(3));
        let mapped = initial
            .flat_map_ok(|x| Ok(x + 25).wrap_with_cost(OperationCost::with_hash_node_calls(2)));

        assert_eq!(mapped.value, Ok(100));
        assert_eq!(
            mapped.cost,
            OperationCost {
                hash_node_calls: 2,
                node_reads: 3,
                node_writes: 0,
            }
        );
    }

    #[test]
    fn test_flat_map_ok_adds_cost_of_failing_step() {
        let initial: CostResult<usize, ()> = Ok(75).wrap_with_cost(OperationCost::with_node_reads(3));
        let mapped: CostResult<usize, ()> =
            initial.flat_map_ok(|_| Err(()).wrap_with_cost(OperationCost::with_node_reads(7)));

        assert_eq!(mapped.cost, OperationCost::with_node_reads(10));
        assert_eq!(mapped.value, Err(()));
    }

    fn failing_step() -> CostResult<u32, &'static str> {
        Err("boom").wrap_with_cost(OperationCost::with_node_reads(2))
    }

    fn chained() -> CostResult<u32, &'static str> {
        let mut cost = OperationCost::with_hash_node_calls(1);
        let value = crate::cost_return_on_error!(&mut cost, failing_step());
        Ok(value).wrap_with_cost(cost)
    }

    fn validated(input: Result<u32, &'static str>) -> CostResult<u32, &'static str> {
        let cost = OperationCost::with_node_writes(4);
        let value = crate::cost_return_on_error_no_add!(&cost, input);
        Ok(value + 1).wrap_with_cost(cost)
    }

    #[test]
    fn test_cost_return_on_error_keeps_accumulated_cost() {
        let result = chained();
        assert_eq!(result.value, Err("boom"));
        assert_eq!(
            result.cost,
            OperationCost {
                hash_node_calls: 1,
                node_reads: 2,
                node_writes: 0,
            }
        );
    }

    #[test]
    fn test_cost_return_on_error_no_add() {
        assert_eq!(validated(Ok(1)).unwrap(), Ok(2));
        let failed = validated(Err("bad"));
        assert_eq!(failed.value, Err("bad"));
        assert_eq!(failed.cost, OperationCost::with_node_writes(4));
    }
}
