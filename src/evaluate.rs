use crate::host::StateProvider;
use crate::{BinaryOp, Expr, StateCache};

/// Evaluate `expr` against the states visible through `cache`.
///
/// Unknown entities compare unequal to every expected value. Both operands of
/// a binary node are always evaluated so that every referenced entity is read
/// within the pass.
pub fn evaluate<P: StateProvider + ?Sized>(expr: &Expr, cache: &mut StateCache<'_, P>) -> bool {
    match expr {
        Expr::Entity { name, .. } => {
            let expected = expr.expected_value();
            cache.get(name) == expected
        }
        Expr::Not(inner) => !evaluate(inner, cache),
        Expr::Binary { op, left, right } => {
            let left = evaluate(left, cache);
            let right = evaluate(right, cache);
            match op {
                BinaryOp::And => left && right,
                BinaryOp::Or => left || right,
            }
        }
    }
}
