// ABOUTME: Python-style left/right double-dispatch for binary and unary operators

use crate::ast::{CmpOp, Operator, UnaryOperator};
use crate::value::Value;

/// Forward-or-reflected binary dispatch. Returns `None` when neither
/// operand advertises the capability (`NotImplemented` on both sides);
/// the caller turns that into a `TypeError` naming both operand types.
pub fn binary_op(op: Operator, left: &Value, right: &Value) -> Option<BinResult> {
    use Operator::*;
    use Value::*;

    match (op, left, right) {
        // ----- Number arithmetic / bitwise (forward only; the reference
        // never defines a reflected Number method) -----
        (Add, Num(a), Num(b)) => Some(BinResult::Value(Num(a + b))),
        (Sub, Num(a), Num(b)) => Some(BinResult::Value(Num(a - b))),
        (Mult, Num(a), Num(b)) => Some(BinResult::Value(Num(a * b))),
        (Div, Num(a), Num(b)) => Some(BinResult::Value(Num(a / b))),
        (FloorDiv, Num(a), Num(b)) => Some(BinResult::Value(Num((a / b).floor()))),
        (Mod, Num(a), Num(b)) => Some(BinResult::Value(Num(a - b * (a / b).floor()))),
        (Pow, Num(a), Num(b)) => Some(BinResult::Value(Num(a.powf(*b)))),
        (LShift, Num(a), Num(b)) => Some(int_shift_or_error(op, *a, *b, |x, y| x << y)),
        (RShift, Num(a), Num(b)) => Some(int_shift_or_error(op, *a, *b, |x, y| x >> y)),
        (BitAnd, Num(a), Num(b)) => Some(int_shift_or_error(op, *a, *b, |x, y| x & y)),
        (BitXor, Num(a), Num(b)) => Some(int_shift_or_error(op, *a, *b, |x, y| x ^ y)),
        (BitOr, Num(a), Num(b)) => Some(int_shift_or_error(op, *a, *b, |x, y| x | y)),

        // ----- Bool bitwise ops: spec resolves the reference's Num/Bool
        // inconsistency in favor of always returning Bool -----
        (BitAnd, Bool(a), Bool(b)) => Some(BinResult::Value(Bool(a & b))),
        (BitOr, Bool(a), Bool(b)) => Some(BinResult::Value(Bool(a | b))),
        (BitXor, Bool(a), Bool(b)) => Some(BinResult::Value(Bool(a ^ b))),
        (BitAnd, Bool(a), Num(b)) | (BitAnd, Num(b), Bool(a)) => Some(bool_num_bitop(op, *a, *b)),
        (BitOr, Bool(a), Num(b)) | (BitOr, Num(b), Bool(a)) => Some(bool_num_bitop(op, *a, *b)),
        (BitXor, Bool(a), Num(b)) | (BitXor, Num(b), Bool(a)) => Some(bool_num_bitop(op, *a, *b)),

        // ----- String -----
        (Add, Str(a), Str(b)) => Some(BinResult::Value(Str(format!("{}{}", a, b)))),
        // Typo resolved per the Design Notes: `Str * Str` in the reference
        // is treated here as `Str * Num` (standard repetition).
        (Mult, Str(a), Num(b)) | (Mult, Num(b), Str(a)) => Some(string_repeat(a, *b)),

        // ----- Tuple / List: the reference's same-type `*` is preserved
        // as written (see DESIGN.md for the exact reading adopted) -----
        (Add, Tuple(a), Tuple(b)) => {
            let mut out = (**a).clone();
            out.extend(b.iter().cloned());
            Some(BinResult::Value(Value::tuple(out)))
        }
        (Add, List(a), List(b)) => {
            let mut out = a.borrow().clone();
            out.extend(b.borrow().iter().cloned());
            Some(BinResult::Value(Value::list(out)))
        }
        (Mult, Tuple(a), Tuple(b)) => Some(BinResult::Value(Value::tuple(sequence_repeat(a, b.len())))),
        (Mult, List(a), List(b)) => {
            let b_len = b.borrow().len();
            Some(BinResult::Value(Value::list(sequence_repeat(&a.borrow(), b_len))))
        }

        _ => None,
    }
}

fn sequence_repeat(values: &[Value], times: usize) -> Vec<Value> {
    let mut out = Vec::with_capacity(values.len() * times);
    for _ in 0..times {
        out.extend(values.iter().cloned());
    }
    out
}

fn string_repeat(s: &str, count: f64) -> BinResult {
    if count % 1.0 != 0.0 {
        return BinResult::Error("can't multiply sequence by non-int".to_string());
    }
    let n = count.max(0.0) as usize;
    BinResult::Value(Value::Str(s.repeat(n)))
}

fn bool_num_bitop(op: Operator, b: bool, n: f64) -> BinResult {
    if n % 1.0 != 0.0 {
        return BinResult::Error(format!("floats cannot be in {} operations", op.symbol()));
    }
    let a = if b { 1i64 } else { 0 };
    let n = n as i64;
    let result = match op {
        Operator::BitAnd => a & n,
        Operator::BitOr => a | n,
        Operator::BitXor => a ^ n,
        _ => unreachable!(),
    };
    BinResult::Value(Value::Bool(result != 0))
}

fn int_shift_or_error(op: Operator, a: f64, b: f64, f: impl Fn(i64, i64) -> i64) -> BinResult {
    if a % 1.0 != 0.0 || b % 1.0 != 0.0 {
        return BinResult::Error(format!("floats cannot be in {} operations", op.symbol()));
    }
    BinResult::Value(Value::Num(f(a as i64, b as i64) as f64))
}

/// A successful binary dispatch either produces a value or (for the
/// integral/arity guards embedded in the Number/Bool rules) a message
/// that must still surface as a `TypeError`, distinct from the
/// `NotImplemented` fall-through represented by `binary_op` returning
/// `None`.
pub enum BinResult {
    Value(Value),
    Error(String),
}

pub fn unary_op(op: UnaryOperator, operand: &Value) -> Option<BinResult> {
    use UnaryOperator::*;
    use Value::*;

    match (op, operand) {
        (USub, Num(n)) => Some(BinResult::Value(Num(-n))),
        (UAdd, Num(n)) => Some(BinResult::Value(Num(*n))),
        (Invert, Num(n)) => {
            if n % 1.0 != 0.0 {
                Some(BinResult::Error("floats cannot be inverted".to_string()))
            } else {
                Some(BinResult::Value(Num(!(*n as i64) as f64)))
            }
        }
        (USub, Bool(b)) => Some(BinResult::Value(Num(-(*b as i64 as f64)))),
        (UAdd, Bool(b)) => Some(BinResult::Value(Num(*b as i64 as f64))),
        (Invert, Bool(b)) => Some(BinResult::Value(Bool(!b))),
        (Not, v) => Some(BinResult::Value(Bool(!v.truthy()))),
        _ => None,
    }
}

/// Structural equality used by `==`/`!=` and by `Eq` membership tests;
/// unlike ordering, every value type participates.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    use Value::*;
    match (a, b) {
        (Bool(x), Bool(y)) => x == y,
        (None, None) => true,
        (Num(x), Num(y)) => x == y,
        (Str(x), Str(y)) => x == y,
        (Tuple(x), Tuple(y)) => x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| values_equal(a, b)),
        (List(x), List(y)) => {
            let x = x.borrow();
            let y = y.borrow();
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| values_equal(a, b))
        }
        (Bool(x), Num(y)) | (Num(y), Bool(x)) => (*x as i64 as f64) == *y,
        _ => false,
    }
}

/// Identity comparison for `===`/`!==`. Reference-counted value kinds
/// compare by pointer; everything else falls back to value equality,
/// mirroring CPython's small-int/None/bool singleton behaviour.
pub fn values_identical(a: &Value, b: &Value) -> bool {
    use Value::*;
    match (a, b) {
        (Tuple(x), Tuple(y)) => std::rc::Rc::ptr_eq(x, y),
        (List(x), List(y)) => std::rc::Rc::ptr_eq(x, y),
        (Module(x), Module(y)) => std::rc::Rc::ptr_eq(x, y),
        _ => values_equal(a, b),
    }
}

/// Numeric ordering; `None` means the comparison is unsupported for
/// these operand types (only `Num` participates, per the reference).
fn numeric_cmp(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Value::Num(x), Value::Num(y)) => x.partial_cmp(y),
        _ => None,
    }
}

/// Evaluate one step of a comparison chain. Returns `None` when the
/// comparison is unsupported between these operand types (caller raises
/// `TypeError`).
pub fn compare(op: CmpOp, left: &Value, right: &Value) -> Option<bool> {
    use std::cmp::Ordering::*;
    match op {
        CmpOp::Eq => Some(values_equal(left, right)),
        CmpOp::NotEq => Some(!values_equal(left, right)),
        CmpOp::Is => Some(values_identical(left, right)),
        CmpOp::IsNot => Some(!values_identical(left, right)),
        CmpOp::Lt => numeric_cmp(left, right).map(|o| o == Less),
        CmpOp::LtE => numeric_cmp(left, right).map(|o| o != Greater),
        CmpOp::Gt => numeric_cmp(left, right).map(|o| o == Greater),
        CmpOp::GtE => numeric_cmp(left, right).map(|o| o != Less),
        CmpOp::In => contains(right, left),
        CmpOp::NotIn => contains(right, left).map(|b| !b),
    }
}

/// `item in container`: only the right operand's membership capability
/// is consulted, with the String×non-String special case (both operands
/// must be strings for `in` over a string).
fn contains(container: &Value, item: &Value) -> Option<bool> {
    match container {
        Value::Str(s) => match item {
            Value::Str(needle) => Some(s.contains(needle.as_str())),
            _ => None,
        },
        Value::Tuple(items) => Some(items.iter().any(|v| values_equal(v, item))),
        Value::List(items) => Some(items.borrow().iter().any(|v| values_equal(v, item))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_add_is_forward_only() {
        match binary_op(Operator::Add, &Value::Num(1.0), &Value::Num(2.0)) {
            Some(BinResult::Value(Value::Num(n))) => assert_eq!(n, 3.0),
            _ => panic!("expected Num(3.0)"),
        }
        assert!(binary_op(Operator::Add, &Value::Num(1.0), &Value::Str("x".into())).is_none());
    }

    #[test]
    fn string_times_num_repeats() {
        match binary_op(Operator::Mult, &Value::Str("ab".into()), &Value::Num(3.0)) {
            Some(BinResult::Value(Value::Str(s))) => assert_eq!(s, "ababab"),
            _ => panic!("expected repeated string"),
        }
    }

    #[test]
    fn bitwise_rejects_fractional_operands() {
        match binary_op(Operator::BitAnd, &Value::Num(1.5), &Value::Num(2.0)) {
            Some(BinResult::Error(_)) => {}
            _ => panic!("expected float-bitwise error"),
        }
    }

    #[test]
    fn chained_comparison_steps() {
        assert_eq!(compare(CmpOp::Lt, &Value::Num(1.0), &Value::Num(2.0)), Some(true));
        assert_eq!(compare(CmpOp::Lt, &Value::Num(2.0), &Value::Num(1.0)), Some(false));
    }

    #[test]
    fn in_requires_both_strings_for_string_container() {
        assert_eq!(compare(CmpOp::In, &Value::Str("ell".into()), &Value::Str("hello".into())), Some(true));
        assert_eq!(compare(CmpOp::In, &Value::Num(1.0), &Value::Str("hello".into())), None);
    }

    #[test]
    fn bool_bitand_returns_bool_not_num() {
        match binary_op(Operator::BitAnd, &Value::Bool(true), &Value::Bool(false)) {
            Some(BinResult::Value(Value::Bool(b))) => assert!(!b),
            _ => panic!("expected Bool(false)"),
        }
    }
}
