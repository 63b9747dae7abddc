use num::{integer::Roots, rational::Rational64, CheckedAdd, CheckedMul, One, Signed, Zero};
use std::fmt;

/// An exact rational constant, kept in lowest terms with a positive denominator.
///
/// Arithmetic is checked: operations whose exact result does not fit return `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rational(Rational64);

impl Rational {
    pub const ZERO: Self = Self::integer(0);
    pub const ONE: Self = Self::integer(1);
    pub const NEG_ONE: Self = Self::integer(-1);
    pub const HALF: Self = Self(Rational64::new_raw(1, 2));

    /// Builds the rational `num / den`. Panics if `den` is zero.
    pub fn new(num: i64, den: i64) -> Self {
        assert!(den != 0, "rational with zero denominator");
        Self(Rational64::new(num, den))
    }

    pub const fn integer(value: i64) -> Self {
        Self(Rational64::new_raw(value, 1))
    }

    pub fn numer(self) -> i64 {
        *self.0.numer()
    }

    pub fn denom(self) -> i64 {
        *self.0.denom()
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_one(self) -> bool {
        self.0.is_one()
    }

    pub fn is_integer(self) -> bool {
        self.0.is_integer()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_negative()
    }

    pub fn checked_neg(self) -> Option<Self> {
        Some(Self(Rational64::new_raw(
            self.numer().checked_neg()?,
            self.denom(),
        )))
    }

    pub fn checked_abs(self) -> Option<Self> {
        if self.is_negative() {
            self.checked_neg()
        } else {
            Some(self)
        }
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(&rhs.0).map(Self)
    }

    pub fn checked_mul(self, rhs: Self) -> Option<Self> {
        self.0.checked_mul(&rhs.0).map(Self)
    }

    pub fn to_f64(self) -> f64 {
        self.numer() as f64 / self.denom() as f64
    }

    /// Multiplicative inverse, `None` for zero.
    pub fn recip(self) -> Option<Self> {
        let (num, den) = (self.numer(), self.denom());
        if num == 0 {
            return None;
        }

        if num > 0 {
            Some(Self(Rational64::new_raw(den, num)))
        } else {
            Some(Self(Rational64::new_raw(
                den.checked_neg()?,
                num.checked_neg()?,
            )))
        }
    }

    /// Raises to an integer power. `None` if this is zero and the exponent is negative,
    /// or if the result overflows.
    pub fn powi(self, exp: i64) -> Option<Self> {
        let mut base = if exp < 0 { self.recip()? } else { self };
        let mut exp = exp.unsigned_abs();
        let mut result = Self::ONE;

        while exp > 0 {
            if exp & 1 == 1 {
                result = result.checked_mul(base)?;
            }
            exp >>= 1;
            if exp > 0 {
                base = base.checked_mul(base)?;
            }
        }

        Some(result)
    }

    /// Exact `n`-th root, if one exists among the rationals.
    pub fn root(self, n: u32) -> Option<Self> {
        match n {
            0 => return None,
            1 => return Some(self),
            _ => {}
        }

        if self.is_negative() && n % 2 == 0 {
            return None;
        }

        Some(Self::new(
            exact_root(self.numer(), n)?,
            exact_root(self.denom(), n)?,
        ))
    }

    /// Raises to a rational power when the result is itself rational.
    pub fn pow(self, exp: Rational) -> Option<Self> {
        let root = u32::try_from(exp.denom()).ok()?;
        self.root(root)?.powi(exp.numer())
    }
}

fn exact_root(value: i64, n: u32) -> Option<i64> {
    let root = value.nth_root(n);
    (root.checked_pow(n) == Some(value)).then_some(root)
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Self::integer(value)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
