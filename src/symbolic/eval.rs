use super::Expr;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("no value provided for symbol {0}")]
    Unbound(String),
}

impl Expr {
    /// Numerically evaluates the expression, looking up symbols by name.
    pub fn eval(&self, values: &HashMap<String, f64>) -> Result<f64, EvalError> {
        Ok(match self {
            Expr::Number(value) => value.to_f64(),
            Expr::Symbol(symbol) => *values
                .get(symbol.name())
                .ok_or_else(|| EvalError::Unbound(symbol.name().to_string()))?,
            Expr::Add(terms) => {
                let mut result = 0.0;
                for term in terms {
                    result += term.eval(values)?;
                }
                result
            }
            Expr::Mul(factors) => {
                let mut result = 1.0;
                for factor in factors {
                    result *= factor.eval(values)?;
                }
                result
            }
            Expr::Pow(base, exp) => {
                let base = base.eval(values)?;
                match exp.as_number() {
                    Some(e) if e == super::Rational::HALF => base.sqrt(),
                    Some(e) if e.is_integer() && i32::try_from(e.numer()).is_ok() => {
                        base.powi(e.numer() as i32)
                    }
                    _ => base.powf(exp.eval(values)?),
                }
            }
            Expr::Apply(func, arg) => func.apply_f64(arg.eval(values)?),
        })
    }
}
