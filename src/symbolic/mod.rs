//! A small canonicalizing computer algebra system.
//!
//! Expressions are immutable trees built through the constructors on [`Expr`]
//! (or the arithmetic operators), which always return a canonical form. Sums and
//! products are flattened, constants folded, like terms and equal bases merged,
//! and operands sorted. Two expressions built from equivalent inputs therefore
//! compare equal with `==`, which is what downstream code generation relies on
//! when it compares or deduplicates expressions.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

mod eval;
mod number;
mod print;

pub use eval::EvalError;
pub use number::Rational;
pub use print::ccode;

/// A named symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Elementary functions of a single argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Exp,
    Log,
}

impl Func {
    /// Name of the function, shared by the readable and C printers.
    pub fn name(self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Exp => "exp",
            Func::Log => "log",
        }
    }

    pub fn apply_f64(self, x: f64) -> f64 {
        match self {
            Func::Sin => x.sin(),
            Func::Cos => x.cos(),
            Func::Tan => x.tan(),
            Func::Exp => x.exp(),
            Func::Log => x.ln(),
        }
    }

    /// Exact value at special points (`sin(0) = 0`, `log(1) = 0`, ...).
    fn exact(self, arg: Rational) -> Option<Rational> {
        match self {
            Func::Sin | Func::Tan if arg.is_zero() => Some(Rational::ZERO),
            Func::Cos | Func::Exp if arg.is_zero() => Some(Rational::ONE),
            Func::Log if arg.is_one() => Some(Rational::ZERO),
            _ => None,
        }
    }
}

/// A symbolic expression in canonical form.
///
/// The variants are public for pattern matching, but should only be built through
/// the constructors, which maintain the following invariants:
/// - `Add` holds at least two terms, none of which is an `Add`. Non-constant terms
///   are sorted and distinct up to their coefficient, the constant (if any) comes last.
/// - `Mul` holds at least two factors, none of which is a `Mul`. The numeric
///   coefficient (if not one) comes first, the remaining factors are sorted and
///   have pairwise distinct bases.
/// - `Pow` never has a zero or unit exponent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Expr {
    Number(Rational),
    Symbol(Symbol),
    Add(Vec<Expr>),
    Mul(Vec<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Apply(Func, Box<Expr>),
}

impl Expr {
    pub fn zero() -> Self {
        Expr::Number(Rational::ZERO)
    }

    pub fn one() -> Self {
        Expr::Number(Rational::ONE)
    }

    pub fn integer(value: i64) -> Self {
        Expr::Number(Rational::integer(value))
    }

    pub fn rational(num: i64, den: i64) -> Self {
        Expr::Number(Rational::new(num, den))
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::Symbol(Symbol::new(name))
    }

    /// Canonical sum of the given terms.
    pub fn add(terms: impl IntoIterator<Item = Expr>) -> Self {
        let mut constant = Rational::ZERO;
        // Maps each term (stripped of its coefficient) to its accumulated coefficient.
        let mut collected: BTreeMap<Expr, Rational> = BTreeMap::new();
        // Terms whose coefficient would overflow when merged stay separate.
        let mut unfolded = Vec::new();

        let mut stack: Vec<Expr> = terms.into_iter().collect();
        while let Some(term) = stack.pop() {
            match term {
                Expr::Number(value) => match constant.checked_add(value) {
                    Some(sum) => constant = sum,
                    None => unfolded.push(Expr::Number(value)),
                },
                Expr::Add(inner) => stack.extend(inner),
                other => {
                    let (coefficient, rest) = other.split_coefficient();
                    let current = collected.get(&rest).copied().unwrap_or(Rational::ZERO);
                    match current.checked_add(coefficient) {
                        Some(sum) => {
                            collected.insert(rest, sum);
                        }
                        None => unfolded.push(Expr::scale(coefficient, rest)),
                    }
                }
            }
        }

        let mut result: Vec<Expr> = collected
            .into_iter()
            .filter(|(_, coefficient)| !coefficient.is_zero())
            .map(|(rest, coefficient)| Expr::scale(coefficient, rest))
            .collect();

        if !constant.is_zero() {
            result.push(Expr::Number(constant));
        }
        result.extend(unfolded);

        match result.len() {
            0 => Expr::zero(),
            1 => result.remove(0),
            _ => Expr::Add(result),
        }
    }

    /// Canonical product of the given factors.
    pub fn mul(factors: impl IntoIterator<Item = Expr>) -> Self {
        let mut coefficient = Rational::ONE;
        // Maps each base to the exponents it appears with.
        let mut powers: BTreeMap<Expr, Vec<Expr>> = BTreeMap::new();
        // Constants whose product with the coefficient would overflow.
        let mut unfolded = Vec::new();

        let mut stack: Vec<Expr> = factors.into_iter().collect();
        while let Some(factor) = stack.pop() {
            match factor {
                Expr::Number(value) => fold_factor(&mut coefficient, value, &mut unfolded),
                Expr::Mul(inner) => stack.extend(inner),
                Expr::Pow(base, exp) => powers.entry(*base).or_default().push(*exp),
                other => powers.entry(other).or_default().push(Expr::one()),
            }
        }

        if coefficient.is_zero() {
            return Expr::zero();
        }

        let mut result = Vec::with_capacity(powers.len() + 1);
        let mut renormalize = false;

        for (base, exps) in powers {
            match Expr::pow(base, Expr::add(exps)) {
                Expr::Number(value) => fold_factor(&mut coefficient, value, &mut unfolded),
                product @ Expr::Mul(_) => {
                    renormalize = true;
                    result.push(product);
                }
                other => result.push(other),
            }
        }

        // Merging exponents may have produced a product (e.g. `sqrt(2*x)**2`), which
        // has to be flattened and merged again.
        if renormalize {
            result.push(Expr::Number(coefficient));
            result.extend(unfolded);
            return Expr::mul(result);
        }

        if coefficient.is_zero() {
            return Expr::zero();
        }

        result.sort();

        let mut operands = Vec::with_capacity(result.len() + unfolded.len() + 1);
        if !coefficient.is_one() || (result.is_empty() && unfolded.is_empty()) {
            operands.push(Expr::Number(coefficient));
        }
        operands.extend(unfolded);
        operands.extend(result);

        if operands.len() == 1 {
            operands.remove(0)
        } else {
            Expr::Mul(operands)
        }
    }

    /// Canonical power `base ** exp`.
    pub fn pow(base: Expr, exp: Expr) -> Self {
        if let Expr::Number(e) = exp {
            if e.is_zero() {
                return Expr::one();
            }

            if e.is_one() {
                return base;
            }

            match base {
                Expr::Number(b) => {
                    if let Some(value) = b.pow(e) {
                        return Expr::Number(value);
                    }
                    return Expr::Pow(Box::new(Expr::Number(b)), Box::new(exp));
                }
                Expr::Pow(inner, e1) if e.is_integer() => {
                    return Expr::pow(*inner, Expr::mul([*e1, exp]));
                }
                Expr::Mul(factors) if e.is_integer() => {
                    return Expr::mul(factors.into_iter().map(|f| Expr::pow(f, exp.clone())));
                }
                _ => {}
            }
        }

        if matches!(base, Expr::Number(b) if b.is_one()) {
            return Expr::one();
        }

        Expr::Pow(Box::new(base), Box::new(exp))
    }

    pub fn sqrt(value: Expr) -> Self {
        Expr::pow(value, Expr::Number(Rational::HALF))
    }

    /// Applies an elementary function, evaluating it exactly where possible.
    pub fn apply(func: Func, arg: Expr) -> Self {
        if let Expr::Number(value) = arg {
            if let Some(result) = func.exact(value) {
                return Expr::Number(result);
            }
        }

        Expr::Apply(func, Box::new(arg))
    }

    pub fn sin(arg: Expr) -> Self {
        Expr::apply(Func::Sin, arg)
    }

    pub fn cos(arg: Expr) -> Self {
        Expr::apply(Func::Cos, arg)
    }

    pub fn as_number(&self) -> Option<Rational> {
        match self {
            Expr::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Expr::Symbol(symbol) => Some(symbol),
            _ => None,
        }
    }

    /// Splits a term into its numeric coefficient and the remaining expression.
    pub fn split_coefficient(self) -> (Rational, Expr) {
        match self {
            Expr::Number(value) => (value, Expr::one()),
            Expr::Mul(mut factors) => {
                let Some(value) = factors.first().and_then(Expr::as_number) else {
                    return (Rational::ONE, Expr::Mul(factors));
                };

                factors.remove(0);
                let rest = if factors.len() == 1 {
                    factors.remove(0)
                } else {
                    Expr::Mul(factors)
                };
                (value, rest)
            }
            other => (Rational::ONE, other),
        }
    }

    /// Multiplies an already canonical, coefficient free term by a constant.
    fn scale(coefficient: Rational, term: Expr) -> Expr {
        if coefficient.is_one() {
            return term;
        }

        match term {
            Expr::Mul(mut factors) => {
                factors.insert(0, Expr::Number(coefficient));
                Expr::Mul(factors)
            }
            Expr::Number(value) => match coefficient.checked_mul(value) {
                Some(product) => Expr::Number(product),
                None => Expr::Mul(vec![Expr::Number(coefficient), Expr::Number(value)]),
            },
            other => Expr::Mul(vec![Expr::Number(coefficient), other]),
        }
    }

    /// Collects every symbol appearing in the expression.
    pub fn free_symbols(&self) -> BTreeSet<Symbol> {
        let mut result = BTreeSet::new();
        self.collect_symbols(&mut result);
        result
    }

    fn collect_symbols(&self, out: &mut BTreeSet<Symbol>) {
        match self {
            Expr::Number(_) => {}
            Expr::Symbol(symbol) => {
                out.insert(symbol.clone());
            }
            Expr::Add(operands) | Expr::Mul(operands) => {
                for operand in operands {
                    operand.collect_symbols(out);
                }
            }
            Expr::Pow(base, exp) => {
                base.collect_symbols(out);
                exp.collect_symbols(out);
            }
            Expr::Apply(_, arg) => arg.collect_symbols(out),
        }
    }

    /// Replaces every occurrence of `symbol` with `value`, re-canonicalizing the result.
    pub fn subs(&self, symbol: &Symbol, value: &Expr) -> Expr {
        self.map_symbols(&|s| (s == symbol).then(|| value.clone()))
    }

    /// Simultaneous substitution of several symbols.
    pub fn subs_all(&self, values: &HashMap<Symbol, Expr>) -> Expr {
        self.map_symbols(&|s| values.get(s).cloned())
    }

    fn map_symbols(&self, f: &impl Fn(&Symbol) -> Option<Expr>) -> Expr {
        match self {
            Expr::Number(_) => self.clone(),
            Expr::Symbol(symbol) => f(symbol).unwrap_or_else(|| self.clone()),
            Expr::Add(terms) => Expr::add(terms.iter().map(|t| t.map_symbols(f))),
            Expr::Mul(factors) => Expr::mul(factors.iter().map(|t| t.map_symbols(f))),
            Expr::Pow(base, exp) => Expr::pow(base.map_symbols(f), exp.map_symbols(f)),
            Expr::Apply(func, arg) => Expr::apply(*func, arg.map_symbols(f)),
        }
    }
}

impl From<Symbol> for Expr {
    fn from(value: Symbol) -> Self {
        Expr::Symbol(value)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::integer(value)
    }
}

/// Multiplies `value` into `coefficient`, setting it aside if the product would overflow.
fn fold_factor(coefficient: &mut Rational, value: Rational, unfolded: &mut Vec<Expr>) {
    match coefficient.checked_mul(value) {
        Some(product) => *coefficient = product,
        None => unfolded.push(Expr::Number(value)),
    }
}

impl From<Rational> for Expr {
    fn from(value: Rational) -> Self {
        Expr::Number(value)
    }
}

impl Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        Expr::add([self, rhs])
    }
}

impl Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        Expr::add([self, -rhs])
    }
}

impl Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::mul([self, rhs])
    }
}

impl Div for Expr {
    type Output = Expr;

    fn div(self, rhs: Expr) -> Expr {
        Expr::mul([self, Expr::pow(rhs, Expr::integer(-1))])
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::mul([Expr::integer(-1), self])
    }
}

impl<'a> Add<&'a Expr> for &'a Expr {
    type Output = Expr;

    fn add(self, rhs: &'a Expr) -> Expr {
        self.clone() + rhs.clone()
    }
}

impl<'a> Sub<&'a Expr> for &'a Expr {
    type Output = Expr;

    fn sub(self, rhs: &'a Expr) -> Expr {
        self.clone() - rhs.clone()
    }
}

impl<'a> Mul<&'a Expr> for &'a Expr {
    type Output = Expr;

    fn mul(self, rhs: &'a Expr) -> Expr {
        self.clone() * rhs.clone()
    }
}
