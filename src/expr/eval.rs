//! Numeric evaluation of parsed expressions

use thiserror::Error;

use super::{BinOp, Expr, Func};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Division by zero, log of a negative, overflow, ...
    #[error("expression is undefined at x = {x} (got {value})")]
    NonFinite { x: f64, value: f64 },
}

impl Func {
    pub fn apply(self, v: f64) -> f64 {
        match self {
            Func::Sin => v.sin(),
            Func::Cos => v.cos(),
            Func::Tan => v.tan(),
            Func::Asin => v.asin(),
            Func::Acos => v.acos(),
            Func::Atan => v.atan(),
            Func::Sinh => v.sinh(),
            Func::Cosh => v.cosh(),
            Func::Tanh => v.tanh(),
            Func::Exp => v.exp(),
            Func::Ln => v.ln(),
            Func::Sqrt => v.sqrt(),
            Func::Abs => v.abs(),
            Func::Floor => v.floor(),
            Func::Ceil => v.ceil(),
        }
    }
}

impl Expr {
    /// Evaluate at `x` with IEEE semantics (may return NaN or infinity)
    pub fn eval(&self, x: f64) -> f64 {
        match self {
            Expr::Num(n) => *n,
            Expr::Var => x,
            Expr::Neg(inner) => -inner.eval(x),
            Expr::Binary(op, lhs, rhs) => {
                let (a, b) = (lhs.eval(x), rhs.eval(x));
                match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => a / b,
                    BinOp::Pow => pow(a, b),
                }
            }
            Expr::Call(func, arg) => func.apply(arg.eval(x)),
        }
    }

    /// Evaluate at `x`, rejecting anything that isn't a finite real
    pub fn eval_finite(&self, x: f64) -> Result<f64, EvalError> {
        let value = self.eval(x);
        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvalError::NonFinite { x, value })
        }
    }
}

/// Real power; integer exponents use `powi` so negative bases stay real
fn pow(base: f64, exponent: f64) -> f64 {
    if exponent.fract() == 0.0 && exponent.abs() <= i32::MAX as f64 {
        base.powi(exponent as i32)
    } else {
        base.powf(exponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(src: &str, x: f64) -> f64 {
        Expr::parse(src).unwrap().eval(x)
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(eval("1 + 2 * 3", 0.0), 7.0);
        assert_eq!(eval("(1 + 2) * 3", 0.0), 9.0);
        assert_eq!(eval("10 - 4 - 3", 0.0), 3.0);
        assert_eq!(eval("12 / 4 / 3", 0.0), 1.0);
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(eval("2^3^2", 0.0), 512.0);
        assert_eq!(eval("2**-1", 0.0), 0.5);
    }

    #[test]
    fn test_default_expression_values() {
        assert_eq!(eval("10 - x**2", 0.0), 10.0);
        assert_eq!(eval("10 - x**2", 3.0), 1.0);
        assert_eq!(eval("-x^2", 3.0), -9.0);
    }

    #[test]
    fn test_negative_base_integer_power() {
        assert_eq!(eval("x^3", -2.0), -8.0);
    }

    #[test]
    fn test_functions_and_constants() {
        assert!((eval("sin(pi/2)", 0.0) - 1.0).abs() < 1e-12);
        assert!((eval("ln(e)", 0.0) - 1.0).abs() < 1e-12);
        assert!((eval("log(exp(2))", 0.0) - 2.0).abs() < 1e-12);
        assert_eq!(eval("sqrt(abs(x))", -16.0), 4.0);
    }

    #[test]
    fn test_eval_finite_rejects_undefined_points() {
        let expr = Expr::parse("1/x").unwrap();
        assert!(matches!(
            expr.eval_finite(0.0),
            Err(EvalError::NonFinite { x, .. }) if x == 0.0
        ));
        assert_eq!(expr.eval_finite(2.0), Ok(0.5));

        let expr = Expr::parse("ln(x)").unwrap();
        assert!(expr.eval_finite(-1.0).is_err());
    }
}
