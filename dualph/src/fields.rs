//! Traits for the coefficient rings and fields that chains are defined over.
//! Implementations are provided for `Z/2`, `Z/p`, the rationals, `f64` and the integers.
//!
//! A ring is a value type that performs arithmetic on its associated [`Element`](Ring::Element) type.
//! Everything above this module decides cancellation exclusively through [`Ring::is_zero`].

use std::fmt::Debug;

use num::integer::Integer;
use num::{BigInt, BigRational, One, Zero};

use crate::DualphError;

pub trait Ring: Clone + Debug {
    type Element: Clone + PartialEq + Debug;

    fn zero(&self) -> Self::Element;
    fn one(&self) -> Self::Element;
    fn add(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;
    fn negate(&self, a: &Self::Element) -> Self::Element;
    fn multiply(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;
    fn is_zero(&self, a: &Self::Element) -> bool;

    /// The image of the integer `n` under the unique ring map `Z -> R`.
    /// Boundary coefficients are supplied as small integers and converted with this.
    fn value_of(&self, n: i64) -> Self::Element;

    /// Returns `0` for rings of characteristic zero.
    fn characteristic(&self) -> u32;

    fn subtract(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        self.add(a, &self.negate(b))
    }

    fn is_one(&self, a: &Self::Element) -> bool {
        self.is_zero(&self.subtract(a, &self.one()))
    }
}

pub trait Field: Ring {
    /// Fails with [`DualphError::DivisionByZero`] if `a` is zero.
    fn invert(&self, a: &Self::Element) -> Result<Self::Element, DualphError>;

    fn divide(&self, a: &Self::Element, b: &Self::Element) -> Result<Self::Element, DualphError> {
        Ok(self.multiply(a, &self.invert(b)?))
    }

    fn is_unit(&self, a: &Self::Element) -> bool {
        !self.is_zero(a)
    }
}

// ====== Z2 ===================================

/// The field with two elements, represented by `bool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Z2;

impl Ring for Z2 {
    type Element = bool;

    fn zero(&self) -> bool {
        false
    }

    fn one(&self) -> bool {
        true
    }

    fn add(&self, a: &bool, b: &bool) -> bool {
        a ^ b
    }

    // -1 = 1
    fn negate(&self, a: &bool) -> bool {
        *a
    }

    fn multiply(&self, a: &bool, b: &bool) -> bool {
        *a && *b
    }

    fn is_zero(&self, a: &bool) -> bool {
        !*a
    }

    fn value_of(&self, n: i64) -> bool {
        n.rem_euclid(2) == 1
    }

    fn characteristic(&self) -> u32 {
        2
    }
}

impl Field for Z2 {
    fn invert(&self, a: &bool) -> Result<bool, DualphError> {
        if *a {
            Ok(true)
        } else {
            Err(DualphError::DivisionByZero)
        }
    }
}

// ====== Z/p ==================================

/// The finite field `Z/p` for a prime `p`.
/// Elements are always stored as their canonical representative in `0..p`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModularField {
    p: u32,
}

impl ModularField {
    pub fn new(p: u32) -> Result<Self, DualphError> {
        if !is_prime(p) {
            return Err(DualphError::InvalidModulus(p));
        }
        Ok(Self { p })
    }

    pub fn modulus(&self) -> u32 {
        self.p
    }

    fn reduce(&self, n: i64) -> u32 {
        n.rem_euclid(self.p as i64) as u32
    }
}

fn is_prime(p: u32) -> bool {
    if p < 2 {
        return false;
    }
    let p = p as u64;
    (2..).take_while(|d| d * d <= p).all(|d| p % d != 0)
}

impl Ring for ModularField {
    type Element = u32;

    fn zero(&self) -> u32 {
        0
    }

    fn one(&self) -> u32 {
        1 % self.p
    }

    fn add(&self, a: &u32, b: &u32) -> u32 {
        ((*a as u64 + *b as u64) % self.p as u64) as u32
    }

    fn negate(&self, a: &u32) -> u32 {
        self.reduce(-(*a as i64))
    }

    fn multiply(&self, a: &u32, b: &u32) -> u32 {
        ((*a as u64 * *b as u64) % self.p as u64) as u32
    }

    fn is_zero(&self, a: &u32) -> bool {
        a % self.p == 0
    }

    fn value_of(&self, n: i64) -> u32 {
        self.reduce(n)
    }

    fn characteristic(&self) -> u32 {
        self.p
    }
}

impl Field for ModularField {
    fn invert(&self, a: &u32) -> Result<u32, DualphError> {
        if self.is_zero(a) {
            return Err(DualphError::DivisionByZero);
        }
        // a * x + p * y = 1 since p is prime
        let egcd = (*a as i64).extended_gcd(&(self.p as i64));
        Ok(self.reduce(egcd.x))
    }
}

// ====== Rationals ============================

/// The field of rational numbers, with arbitrary precision numerators and denominators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RationalField;

impl Ring for RationalField {
    type Element = BigRational;

    fn zero(&self) -> BigRational {
        BigRational::zero()
    }

    fn one(&self) -> BigRational {
        BigRational::one()
    }

    fn add(&self, a: &BigRational, b: &BigRational) -> BigRational {
        a + b
    }

    fn negate(&self, a: &BigRational) -> BigRational {
        -a
    }

    fn multiply(&self, a: &BigRational, b: &BigRational) -> BigRational {
        a * b
    }

    fn is_zero(&self, a: &BigRational) -> bool {
        a.is_zero()
    }

    fn value_of(&self, n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    fn characteristic(&self) -> u32 {
        0
    }
}

impl Field for RationalField {
    fn invert(&self, a: &BigRational) -> Result<BigRational, DualphError> {
        if a.is_zero() {
            return Err(DualphError::DivisionByZero);
        }
        Ok(a.recip())
    }
}

// ====== Floating point =======================

/// Default absolute tolerance used by [`FloatField::new`].
pub const DEFAULT_FLOAT_TOLERANCE: f64 = 1e-10;

/// Real numbers approximated by `f64`.
/// Any element whose absolute value is at most `tolerance` is treated as zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatField {
    tolerance: f64,
}

impl FloatField {
    pub fn new() -> Self {
        Self::with_tolerance(DEFAULT_FLOAT_TOLERANCE)
    }

    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance: tolerance.abs(),
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

impl Default for FloatField {
    fn default() -> Self {
        Self::new()
    }
}

impl Ring for FloatField {
    type Element = f64;

    fn zero(&self) -> f64 {
        0.0
    }

    fn one(&self) -> f64 {
        1.0
    }

    fn add(&self, a: &f64, b: &f64) -> f64 {
        a + b
    }

    fn negate(&self, a: &f64) -> f64 {
        -a
    }

    fn multiply(&self, a: &f64, b: &f64) -> f64 {
        a * b
    }

    fn is_zero(&self, a: &f64) -> bool {
        a.abs() <= self.tolerance
    }

    fn value_of(&self, n: i64) -> f64 {
        n as f64
    }

    fn characteristic(&self) -> u32 {
        0
    }
}

impl Field for FloatField {
    fn invert(&self, a: &f64) -> Result<f64, DualphError> {
        if self.is_zero(a) {
            return Err(DualphError::DivisionByZero);
        }
        Ok(a.recip())
    }
}

// ====== Integers =============================

/// The ring of integers. This is not a field so it can be used for chain arithmetic but not for reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntegerRing;

impl Ring for IntegerRing {
    type Element = i64;

    fn zero(&self) -> i64 {
        0
    }

    fn one(&self) -> i64 {
        1
    }

    fn add(&self, a: &i64, b: &i64) -> i64 {
        a + b
    }

    fn negate(&self, a: &i64) -> i64 {
        -a
    }

    fn multiply(&self, a: &i64, b: &i64) -> i64 {
        a * b
    }

    fn is_zero(&self, a: &i64) -> bool {
        *a == 0
    }

    fn value_of(&self, n: i64) -> i64 {
        n
    }

    fn characteristic(&self) -> u32 {
        0
    }

    fn is_one(&self, a: &i64) -> bool {
        *a == 1
    }
}

impl IntegerRing {
    /// Units of the integers are `1` and `-1`.
    pub fn is_unit(&self, a: &i64) -> bool {
        a.abs().is_one()
    }
}

#[cfg(test)]
mod tests {
    use num::BigRational;

    use super::{Field, FloatField, IntegerRing, ModularField, RationalField, Ring, Z2};
    use crate::DualphError;

    #[test]
    fn test_add_mod_2() {
        assert!(!Z2.add(&true, &true));
        assert!(Z2.add(&true, &false));
        assert!(Z2.value_of(-1));
        assert!(Z2.is_zero(&Z2.value_of(4)));
    }

    #[test]
    fn test_invert_mod_2() {
        assert_eq!(Z2.invert(&true), Ok(true));
        assert_eq!(Z2.invert(&false), Err(DualphError::DivisionByZero));
    }

    #[test]
    fn test_modulus_must_be_prime() {
        assert_eq!(ModularField::new(12), Err(DualphError::InvalidModulus(12)));
        assert_eq!(ModularField::new(1), Err(DualphError::InvalidModulus(1)));
        assert!(ModularField::new(2).is_ok());
        assert!(ModularField::new(13).is_ok());
    }

    #[test]
    fn test_add_mod_3() {
        let z3 = ModularField::new(3).unwrap();
        let two = z3.add(&z3.one(), &z3.one());
        assert_eq!(two, 2);
        assert!(z3.is_zero(&z3.add(&z3.one(), &two)));
        assert_eq!(z3.negate(&1), 2);
        assert_eq!(z3.value_of(-1), 2);
        assert_eq!(z3.subtract(&0, &1), 2);
    }

    #[test]
    fn test_prod_mod_3() {
        let z3 = ModularField::new(3).unwrap();
        let two = z3.value_of(2);
        let one = z3.one();
        assert_eq!(z3.multiply(&two, &one), two);
        assert_eq!(z3.multiply(&one, &two), two);
        assert_eq!(z3.multiply(&two, &two), one);
        assert_eq!(z3.multiply(&one, &one), one);
    }

    #[test]
    fn test_inverses_mod_13() {
        let z13 = ModularField::new(13).unwrap();
        for a in 1..13 {
            let inverse = z13.invert(&a).unwrap();
            assert!(z13.is_one(&z13.multiply(&a, &inverse)), "{a} * {inverse} != 1");
        }
        assert_eq!(z13.invert(&0), Err(DualphError::DivisionByZero));
        assert_eq!(z13.divide(&4, &0), Err(DualphError::DivisionByZero));
        assert_eq!(z13.divide(&4, &2), Ok(2));
    }

    #[test]
    fn test_rationals() {
        let q = RationalField;
        let half = q.invert(&q.value_of(2)).unwrap();
        let third = q.divide(&q.one(), &q.value_of(3)).unwrap();
        let sum = q.add(&half, &third);
        assert_eq!(sum, BigRational::new(5.into(), 6.into()));
        assert!(q.is_zero(&q.subtract(&sum, &sum)));
        assert_eq!(q.invert(&q.zero()), Err(DualphError::DivisionByZero));
    }

    #[test]
    fn test_float_tolerance() {
        let r = FloatField::new();
        assert!(r.is_zero(&(0.1 + 0.2 - 0.3)));
        assert!(!r.is_zero(&1e-3));
        let strict = FloatField::with_tolerance(0.0);
        assert!(!strict.is_zero(&(0.1 + 0.2 - 0.3)));
        assert_eq!(r.invert(&1e-12), Err(DualphError::DivisionByZero));
        assert_eq!(r.divide(&1.0, &4.0), Ok(0.25));
    }

    #[test]
    fn test_integers() {
        let z = IntegerRing;
        assert_eq!(z.subtract(&3, &5), -2);
        assert!(z.is_unit(&-1));
        assert!(!z.is_unit(&2));
        assert_eq!(z.characteristic(), 0);
    }
}
