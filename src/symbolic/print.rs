//! Printing of expressions, either in a human readable form (`Display`) or as C.

use super::{Expr, Rational};
use std::fmt;

// Binding strength of an expression when printed.
const ADD: u8 = 1;
const MUL: u8 = 2;
const POW: u8 = 3;
const ATOM: u8 = 4;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Style {
    Readable,
    C,
}

/// Converts an expression into a C expression.
///
/// Rational constants are emitted as floating point divisions (`(1.0/3.0)`), squares
/// and cubes as explicit products and square roots through `sqrt`.
pub fn ccode(expr: &Expr) -> String {
    Style::C.print(expr)
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Style::Readable.print(self))
    }
}

/// Is this term printed with a leading minus sign?
fn is_negative(term: &Expr) -> bool {
    match term {
        Expr::Number(value) => value.is_negative(),
        Expr::Mul(factors) => factors[0].as_number().is_some_and(Rational::is_negative),
        _ => false,
    }
}

fn negate(term: &Expr) -> Expr {
    -term.clone()
}

impl Style {
    fn print(self, expr: &Expr) -> String {
        match expr {
            Expr::Number(value) => self.number(*value),
            Expr::Symbol(symbol) => symbol.name().to_string(),
            Expr::Add(terms) => self.sum(terms),
            Expr::Mul(_) => self.product(expr),
            Expr::Pow(base, exp) => self.power(base, exp),
            Expr::Apply(func, arg) => format!("{}({})", func.name(), self.print(arg)),
        }
    }

    fn precedence(self, expr: &Expr) -> u8 {
        match expr {
            Expr::Number(value) if value.is_negative() => ADD,
            Expr::Number(value) if !value.is_integer() => match self {
                Style::Readable => MUL,
                Style::C => ATOM,
            },
            Expr::Number(_) | Expr::Symbol(_) | Expr::Apply(_, _) => ATOM,
            Expr::Add(_) => ADD,
            Expr::Mul(_) if is_negative(expr) => ADD,
            Expr::Mul(_) => MUL,
            Expr::Pow(_, exp) => match exp.as_number() {
                Some(e) if e == Rational::HALF => ATOM,
                Some(e) if e.is_negative() => MUL,
                _ if self == Style::C => ATOM,
                _ => POW,
            },
        }
    }

    fn paren(self, expr: &Expr, level: u8) -> String {
        let printed = self.print(expr);
        if self.precedence(expr) < level {
            format!("({printed})")
        } else {
            printed
        }
    }

    fn unit(self) -> &'static str {
        match self {
            Style::Readable => "1",
            Style::C => "1.0",
        }
    }

    fn number(self, value: Rational) -> String {
        match self {
            Style::Readable => value.to_string(),
            Style::C if value.is_integer() => value.to_string(),
            Style::C => format!("({}.0/{}.0)", value.numer(), value.denom()),
        }
    }

    fn sum(self, terms: &[Expr]) -> String {
        let mut result = String::new();

        for (i, term) in terms.iter().enumerate() {
            let negative = is_negative(term);
            let magnitude = if negative { negate(term) } else { term.clone() };
            let printed = self.paren(&magnitude, MUL);

            match (i, negative) {
                (0, false) => result.push_str(&printed),
                (0, true) => {
                    result.push('-');
                    result.push_str(&printed);
                }
                (_, false) => {
                    result.push_str(" + ");
                    result.push_str(&printed);
                }
                (_, true) => {
                    result.push_str(" - ");
                    result.push_str(&printed);
                }
            }
        }

        result
    }

    fn product(self, expr: &Expr) -> String {
        let (coefficient, rest) = expr.clone().split_coefficient();
        let factors = match rest {
            Expr::Mul(factors) => factors,
            other => vec![other],
        };

        let (sign, coefficient) = match coefficient.checked_abs() {
            Some(magnitude) if coefficient.is_negative() => ("-", magnitude),
            _ => ("", coefficient),
        };

        let mut numerator = Vec::new();
        let mut denominator = Vec::new();

        if !coefficient.is_one() {
            match self {
                Style::Readable => {
                    if coefficient.numer() != 1 {
                        numerator.push(coefficient.numer().to_string());
                    }
                    if coefficient.denom() != 1 {
                        denominator.push(coefficient.denom().to_string());
                    }
                }
                Style::C => numerator.push(self.number(coefficient)),
            }
        }

        for factor in &factors {
            match factor {
                Expr::Pow(base, exp) if exp.as_number().is_some_and(Rational::is_negative) => {
                    let flipped = Expr::pow((**base).clone(), negate(exp));
                    denominator.push(self.paren(&flipped, MUL));
                }
                _ => numerator.push(self.paren(factor, MUL)),
            }
        }

        let numerator = if numerator.is_empty() {
            self.unit().to_string()
        } else {
            numerator.join("*")
        };

        match denominator.len() {
            0 => format!("{sign}{numerator}"),
            1 => format!("{sign}{numerator}/{}", denominator[0]),
            _ => format!("{sign}{numerator}/({})", denominator.join("*")),
        }
    }

    fn power(self, base: &Expr, exp: &Expr) -> String {
        if let Some(e) = exp.as_number() {
            if e == Rational::HALF {
                return format!("sqrt({})", self.print(base));
            }

            if let Some(flipped) = e.checked_neg().filter(|_| e.is_negative()) {
                let flipped = Expr::pow(base.clone(), Expr::Number(flipped));
                return format!("{}/{}", self.unit(), self.paren(&flipped, POW));
            }

            if self == Style::C && e.is_integer() && (2..=3).contains(&e.numer()) {
                let printed = self.print(base);
                let repeated = vec![format!("({printed})"); e.numer() as usize];
                return format!("({})", repeated.join("*"));
            }
        }

        match self {
            Style::Readable => format!("{}**{}", self.paren(base, ATOM), self.paren(exp, ATOM)),
            Style::C => format!("pow({}, {})", self.print(base), self.print(exp)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::symbol("x")
    }

    fn y() -> Expr {
        Expr::symbol("y")
    }

    #[test]
    fn readable() {
        assert_eq!((x() - y()).to_string(), "x - y");
        assert_eq!((y() - x()).to_string(), "-x + y");
        assert_eq!((-x()).to_string(), "-x");
        assert_eq!((Expr::integer(2) * x() * y()).to_string(), "2*x*y");
        assert_eq!((x() / y()).to_string(), "x/y");
        assert_eq!((Expr::rational(3, 4) * x()).to_string(), "3*x/4");
        assert_eq!(Expr::pow(x() + y(), Expr::integer(2)).to_string(), "(x + y)**2");
        assert_eq!(Expr::sqrt(x() + Expr::one()).to_string(), "sqrt(x + 1)");
        assert_eq!(Expr::pow(x(), Expr::integer(-1)).to_string(), "1/x");
        assert_eq!((x() * Expr::sin(y())).to_string(), "x*sin(y)");
    }

    #[test]
    fn c_code() {
        assert_eq!(ccode(&Expr::pow(x(), Expr::integer(2))), "((x)*(x))");
        assert_eq!(ccode(&Expr::pow(x(), Expr::integer(5))), "pow(x, 5)");
        assert_eq!(ccode(&(Expr::rational(1, 3) * x())), "(1.0/3.0)*x");
        assert_eq!(ccode(&(Expr::one() / x())), "1.0/x");
        assert_eq!(
            ccode(&Expr::sqrt(Expr::pow(x() - y(), Expr::integer(2)) + Expr::one())),
            "sqrt(((x - y)*(x - y)) + 1)"
        );
        assert_eq!(ccode(&Expr::pow(x(), Expr::rational(-1, 2))), "1.0/sqrt(x)");
    }
}
