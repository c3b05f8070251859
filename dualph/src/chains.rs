//! Sparse formal sums (chains) over a [`Ring`], together with the free module operations used by the reduction engines.
//!
//! A [`FormalSum`] never stores a coefficient that the ring considers zero.
//! Consequently, for every chain `c` and basis element `m`, `c.coefficient(m)` is zero exactly when `c.contains(m)` is false.
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};

use itertools::{Either, Itertools};
use rustc_hash::FxHashMap;

use crate::fields::Ring;
use crate::streams::BasisElement;

/// Storage strategy of a [`FormalSum`], chosen when the sum is created.
/// This only affects iteration order and performance, never the value of any computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChainOrdering {
    /// Backed by a hash map, iteration order is unspecified.
    #[default]
    Hashed,
    /// Backed by an ordered map, iteration follows the order on the basis type.
    Sorted,
}

#[derive(Clone)]
enum Storage<T, E> {
    Hashed(FxHashMap<T, E>),
    Sorted(BTreeMap<T, E>),
}

impl<T: BasisElement, E> Storage<T, E> {
    fn empty(ordering: ChainOrdering) -> Self {
        match ordering {
            ChainOrdering::Hashed => Storage::Hashed(FxHashMap::default()),
            ChainOrdering::Sorted => Storage::Sorted(BTreeMap::new()),
        }
    }

    fn get(&self, element: &T) -> Option<&E> {
        match self {
            Storage::Hashed(map) => map.get(element),
            Storage::Sorted(map) => map.get(element),
        }
    }

    fn insert(&mut self, element: T, coefficient: E) {
        match self {
            Storage::Hashed(map) => {
                map.insert(element, coefficient);
            }
            Storage::Sorted(map) => {
                map.insert(element, coefficient);
            }
        }
    }

    fn remove(&mut self, element: &T) -> Option<E> {
        match self {
            Storage::Hashed(map) => map.remove(element),
            Storage::Sorted(map) => map.remove(element),
        }
    }

    fn len(&self) -> usize {
        match self {
            Storage::Hashed(map) => map.len(),
            Storage::Sorted(map) => map.len(),
        }
    }
}

/// A finite linear combination of basis elements with non-zero coefficients in `CF`.
#[derive(Clone)]
pub struct FormalSum<CF: Ring, T: BasisElement> {
    ring: CF,
    storage: Storage<T, CF::Element>,
}

impl<CF: Ring, T: BasisElement> FormalSum<CF, T> {
    pub fn new(ring: CF) -> Self {
        Self::with_ordering(ring, ChainOrdering::default())
    }

    pub fn with_ordering(ring: CF, ordering: ChainOrdering) -> Self {
        Self {
            ring,
            storage: Storage::empty(ordering),
        }
    }

    /// The chain `coefficient * element`.
    pub fn from_term(ring: CF, coefficient: CF::Element, element: T) -> Self {
        let mut sum = Self::new(ring);
        sum.put(coefficient, element);
        sum
    }

    pub fn ring(&self) -> &CF {
        &self.ring
    }

    pub fn ordering(&self) -> ChainOrdering {
        match self.storage {
            Storage::Hashed(_) => ChainOrdering::Hashed,
            Storage::Sorted(_) => ChainOrdering::Sorted,
        }
    }

    /// Overwrites the coefficient of `element`.
    /// Putting a zero coefficient removes `element` from the sum.
    pub fn put(&mut self, coefficient: CF::Element, element: T) {
        if self.ring.is_zero(&coefficient) {
            self.storage.remove(&element);
        } else {
            self.storage.insert(element, coefficient);
        }
    }

    pub fn remove(&mut self, element: &T) -> Option<CF::Element> {
        self.storage.remove(element)
    }

    pub fn get(&self, element: &T) -> Option<&CF::Element> {
        self.storage.get(element)
    }

    /// Returns the ring's zero if `element` is absent.
    pub fn coefficient(&self, element: &T) -> CF::Element {
        self.get(element)
            .cloned()
            .unwrap_or_else(|| self.ring.zero())
    }

    pub fn contains(&self, element: &T) -> bool {
        self.get(element).is_some()
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T, &CF::Element)> + '_ {
        match &self.storage {
            Storage::Hashed(map) => Either::Left(map.iter()),
            Storage::Sorted(map) => Either::Right(map.iter()),
        }
    }

    pub fn elements(&self) -> impl Iterator<Item = &T> + '_ {
        self.iter().map(|(element, _)| element)
    }

    /// Terms as `(coefficient, element)` pairs, sorted by element.
    pub fn into_sorted_vec(self) -> Vec<(CF::Element, T)> {
        let terms: Vec<_> = match self.storage {
            Storage::Hashed(map) => map.into_iter().collect(),
            Storage::Sorted(map) => map.into_iter().collect(),
        };
        terms
            .into_iter()
            .sorted_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(element, coefficient)| (coefficient, element))
            .collect()
    }

    /// Adds `coefficient * element` to the sum in place, dropping the entry if it cancels.
    pub fn accumulate_term(&mut self, coefficient: &CF::Element, element: T) {
        if self.ring.is_zero(coefficient) {
            return;
        }
        let updated = match self.get(&element) {
            Some(existing) => self.ring.add(existing, coefficient),
            None => coefficient.clone(),
        };
        self.put(updated, element);
    }

    /// Computes `self += scalar * source` in place.
    pub fn accumulate(&mut self, source: &FormalSum<CF, T>, scalar: &CF::Element) {
        if self.ring.is_zero(scalar) {
            return;
        }
        for (element, coefficient) in source.iter() {
            let term = self.ring.multiply(scalar, coefficient);
            self.accumulate_term(&term, element.clone());
        }
    }
}

impl<CF: Ring, T: BasisElement> PartialEq for FormalSum<CF, T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(element, coefficient)| other.get(element) == Some(coefficient))
    }
}

impl<CF: Ring, T: BasisElement> Debug for FormalSum<CF, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.iter().sorted_by(|(a, _), (b, _)| a.cmp(b)))
            .finish()
    }
}

impl<CF: Ring, T: BasisElement> Display for FormalSum<CF, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_str("0");
        }
        let terms = self
            .iter()
            .sorted_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(element, coefficient)| format!("{coefficient:?} {element:?}"))
            .join(" + ");
        f.write_str(&terms)
    }
}

/// Vector space operations on [`FormalSum`]s with coefficients in `CF`.
///
/// The binary operations allocate a new chain by copying the larger operand and folding in the smaller one.
/// [`accumulate`](FreeModule::accumulate) instead mutates its target and is what the reduction engines use.
#[derive(Debug, Clone)]
pub struct FreeModule<CF: Ring> {
    ring: CF,
    ordering: ChainOrdering,
}

impl<CF: Ring> FreeModule<CF> {
    pub fn new(ring: CF) -> Self {
        Self::with_ordering(ring, ChainOrdering::default())
    }

    pub fn with_ordering(ring: CF, ordering: ChainOrdering) -> Self {
        Self { ring, ordering }
    }

    pub fn ring(&self) -> &CF {
        &self.ring
    }

    pub fn create_new_sum<T: BasisElement>(&self) -> FormalSum<CF, T> {
        FormalSum::with_ordering(self.ring.clone(), self.ordering)
    }

    pub fn create_term<T: BasisElement>(
        &self,
        coefficient: CF::Element,
        element: T,
    ) -> FormalSum<CF, T> {
        let mut sum = self.create_new_sum();
        sum.put(coefficient, element);
        sum
    }

    /// Builds a chain from integer coefficients, e.g. the boundary reported by a stream.
    /// Repeated elements accumulate.
    pub fn create_sum<T: BasisElement>(
        &self,
        terms: impl IntoIterator<Item = (i64, T)>,
    ) -> FormalSum<CF, T> {
        let mut sum = self.create_new_sum();
        for (coefficient, element) in terms {
            self.accumulate_element(&mut sum, element, &self.ring.value_of(coefficient));
        }
        sum
    }

    pub fn add<T: BasisElement>(
        &self,
        a: &FormalSum<CF, T>,
        b: &FormalSum<CF, T>,
    ) -> FormalSum<CF, T> {
        let (larger, smaller) = if a.len() >= b.len() { (a, b) } else { (b, a) };
        let mut result = larger.clone();
        result.accumulate(smaller, &self.ring.one());
        result
    }

    pub fn subtract<T: BasisElement>(
        &self,
        a: &FormalSum<CF, T>,
        b: &FormalSum<CF, T>,
    ) -> FormalSum<CF, T> {
        let one = self.ring.one();
        if a.len() >= b.len() {
            let mut result = a.clone();
            result.accumulate(b, &self.ring.negate(&one));
            result
        } else {
            let mut result = self.negate(b);
            result.accumulate(a, &one);
            result
        }
    }

    pub fn multiply<T: BasisElement>(
        &self,
        scalar: &CF::Element,
        a: &FormalSum<CF, T>,
    ) -> FormalSum<CF, T> {
        let mut result = FormalSum::with_ordering(self.ring.clone(), a.ordering());
        if self.ring.is_zero(scalar) {
            return result;
        }
        for (element, coefficient) in a.iter() {
            // Over a ring with zero divisors the product may vanish, put handles that
            result.put(self.ring.multiply(scalar, coefficient), element.clone());
        }
        result
    }

    pub fn negate<T: BasisElement>(&self, a: &FormalSum<CF, T>) -> FormalSum<CF, T> {
        self.multiply(&self.ring.negate(&self.ring.one()), a)
    }

    /// `target += scalar * source`
    pub fn accumulate<T: BasisElement>(
        &self,
        target: &mut FormalSum<CF, T>,
        source: &FormalSum<CF, T>,
        scalar: &CF::Element,
    ) {
        target.accumulate(source, scalar);
    }

    /// `target += scalar * element`
    pub fn accumulate_element<T: BasisElement>(
        &self,
        target: &mut FormalSum<CF, T>,
        element: T,
        scalar: &CF::Element,
    ) {
        target.accumulate_term(scalar, element);
    }

    /// The standard inner product with respect to the basis.
    pub fn inner_product<T: BasisElement>(
        &self,
        a: &FormalSum<CF, T>,
        b: &FormalSum<CF, T>,
    ) -> CF::Element {
        let (larger, smaller) = if a.len() >= b.len() { (a, b) } else { (b, a) };
        smaller
            .iter()
            .filter_map(|(element, coefficient)| {
                larger
                    .get(element)
                    .map(|other| self.ring.multiply(coefficient, other))
            })
            .fold(self.ring.zero(), |acc, term| self.ring.add(&acc, &term))
    }
}

#[cfg(test)]
mod tests {
    use num::BigRational;

    use super::{ChainOrdering, FormalSum, FreeModule};
    use crate::fields::{IntegerRing, ModularField, RationalField, Ring, Z2};

    #[test]
    fn test_put_zero_is_dropped() {
        let mut sum = FormalSum::new(IntegerRing);
        sum.put(0, "a");
        assert!(sum.is_empty());
        assert!(!sum.contains(&"a"));
        assert_eq!(sum.coefficient(&"a"), 0);

        sum.put(3, "a");
        sum.put(0, "a");
        assert!(sum.is_empty());
    }

    #[test]
    fn test_accumulate_cancels() {
        let mut sum = FormalSum::new(IntegerRing);
        sum.put(1, "a");
        sum.put(3, "b");
        sum.put(-4, "z");

        let mut other = FormalSum::new(IntegerRing);
        other.put(-1, "a");
        other.put(2, "z");

        sum.accumulate(&other, &2);
        assert!(!sum.contains(&"z"));
        assert_eq!(sum.coefficient(&"a"), -1);
        assert_eq!(sum.coefficient(&"b"), 3);
        assert_eq!(sum.len(), 2);
    }

    #[test]
    fn test_cancellation_mod_p() {
        let z3 = ModularField::new(3).unwrap();
        let module = FreeModule::new(z3);
        let a = module.create_sum(vec![(1, 0_usize), (1, 1)]);
        let b = module.create_sum(vec![(2, 0_usize), (1, 2)]);
        let sum = module.add(&a, &b);
        assert!(!sum.contains(&0));
        assert_eq!(sum.coefficient(&1), 1);
        assert_eq!(sum.coefficient(&2), 1);
    }

    #[test]
    fn test_create_sum_accumulates_duplicates() {
        let module = FreeModule::new(Z2);
        let sum = module.create_sum(vec![(1, 4_usize), (1, 4), (1, 5)]);
        assert_eq!(sum.len(), 1);
        assert!(sum.contains(&5));
    }

    #[test]
    fn test_module_operations() {
        let module = FreeModule::new(RationalField);
        let q = RationalField;
        let a = module.create_sum(vec![(1, 'x'), (2, 'y')]);
        let b = module.create_sum(vec![(3, 'y'), (-1, 'z')]);

        let difference = module.subtract(&a, &b);
        assert_eq!(difference.coefficient(&'x'), q.value_of(1));
        assert_eq!(difference.coefficient(&'y'), q.value_of(-1));
        assert_eq!(difference.coefficient(&'z'), q.value_of(1));

        // Should agree with a + (-1) b
        let other = module.add(&a, &module.negate(&b));
        assert_eq!(difference, other);

        let half = BigRational::new(1.into(), 2.into());
        let scaled = module.multiply(&half, &a);
        assert_eq!(scaled.coefficient(&'y'), q.value_of(1));
        assert!(module.multiply(&q.zero(), &a).is_empty());

        assert_eq!(module.inner_product(&a, &b), q.value_of(6));

        let mut c = a.clone();
        module.accumulate_element(&mut c, 'y', &q.value_of(-2));
        module.accumulate_element(&mut c, 'w', &half);
        assert!(!c.contains(&'y'));
        assert_eq!(c.coefficient(&'w'), half);
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn test_subtract_self_is_empty() {
        let module = FreeModule::new(ModularField::new(13).unwrap());
        let a = module.create_sum(vec![(1, 0_usize), (-1, 1), (5, 7)]);
        assert!(module.subtract(&a, &a).is_empty());
    }

    #[test]
    fn test_equality_ignores_ordering() {
        let hashed = FreeModule::new(IntegerRing).create_sum(vec![(2, 3_usize), (1, 1)]);
        let sorted = FreeModule::with_ordering(IntegerRing, ChainOrdering::Sorted)
            .create_sum(vec![(1, 1_usize), (2, 3)]);
        assert_eq!(hashed.ordering(), ChainOrdering::Hashed);
        assert_eq!(sorted.ordering(), ChainOrdering::Sorted);
        assert_eq!(hashed, sorted);

        let elements: Vec<_> = sorted.elements().copied().collect();
        assert_eq!(elements, vec![1, 3]);
        assert_eq!(hashed.into_sorted_vec(), vec![(1, 1), (2, 3)]);
    }

    #[test]
    fn test_display() {
        let module = FreeModule::new(IntegerRing);
        let sum = module.create_sum(vec![(-1, 'b'), (2, 'a')]);
        assert_eq!(format!("{sum}"), "2 'a' + -1 'b'");
        let empty: FormalSum<_, char> = module.create_new_sum();
        assert_eq!(format!("{empty}"), "0");
    }
}
