//! Filtered streams of basis elements, the input to every reduction engine.
//!
//! A [`FilteredStream`] yields its basis elements in non-decreasing filtration index and reports, for each element, its dimension, filtration and boundary.
//! Engines never look at the elements themselves, they only compare them through a [`FilteredComparator`].
//!
//! Two implementors are provided: [`ExplicitStream`](implementors::ExplicitStream) is built element by element by the caller,
//! and [`DualStream`](adaptors::DualStream) is derived from a finalized stream and reports coboundaries instead of boundaries.
use std::cmp::{Ordering, Reverse};
use std::fmt::{Debug, Display};
use std::hash::Hash;

use ordered_float::NotNan;

use crate::chains::FormalSum;
use crate::fields::Ring;
use crate::DualphError;

pub mod adaptors;
pub mod implementors;
#[cfg(test)]
pub(crate) mod tests;

// ========= Traits for basis elements and filtrations =========

pub trait BasisElement: Ord + Clone + Hash + Debug {}
pub trait FiltrationT: Ord + Copy + Debug + Display {}

// Default implementors

impl BasisElement for usize {}
impl BasisElement for isize {}
impl BasisElement for u32 {}
impl BasisElement for char {}
impl BasisElement for &'static str {}
impl BasisElement for String {}
impl FiltrationT for NotNan<f32> {}
impl FiltrationT for NotNan<f64> {}
impl FiltrationT for usize {}
impl FiltrationT for isize {}
impl FiltrationT for u32 {}
impl FiltrationT for i64 {}

impl<T> BasisElement for Reverse<T> where T: BasisElement {}

// ======== Abstract filtered stream trait =====================

pub trait FilteredStream {
    type BasisT: BasisElement;
    type FiltrationT: FiltrationT;

    /// All basis elements in non-decreasing order of [`filtration_index`](Self::filtration_index).
    /// Ties are broken by [`compare_basis`](Self::compare_basis) so that the order is the filtered order.
    fn elements(&self) -> impl Iterator<Item = &Self::BasisT>;

    /// If `element` is not part of the stream, please return [`DualphError::NotInStream`].
    fn dimension(&self, element: &Self::BasisT) -> Result<usize, DualphError>;

    /// A dense index, elements entering at the same time share an index.
    fn filtration_index(&self, element: &Self::BasisT) -> Result<usize, DualphError>;

    fn filtration_value(&self, element: &Self::BasisT) -> Result<Self::FiltrationT, DualphError>;

    /// The boundary of `element` as `(coefficient, face)` pairs.
    /// The coefficients are integers and are mapped into the coefficient field by the engine.
    fn boundary(
        &self,
        element: &Self::BasisT,
    ) -> Result<impl Iterator<Item = (i64, Self::BasisT)>, DualphError>;

    /// The basis comparator, a total order used to break ties between elements with equal filtration index.
    fn compare_basis(&self, a: &Self::BasisT, b: &Self::BasisT) -> Ordering {
        a.cmp(b)
    }

    fn size(&self) -> usize;

    fn max_filtration_index(&self) -> Option<usize>;

    /// Engines refuse to run on a stream that can still change.
    fn is_finalized(&self) -> bool;

    fn contains(&self, element: &Self::BasisT) -> bool;

    fn elements_of_dimension(&self, dimension: usize) -> impl Iterator<Item = &Self::BasisT> {
        self.elements()
            .filter(move |element| self.dimension(element).ok() == Some(dimension))
    }

    fn comparator(&self) -> FilteredComparator<'_, Self>
    where
        Self: Sized,
    {
        FilteredComparator { stream: self }
    }
}

// ======== Filtered comparator ================================

/// The filtered order on a stream: first by filtration index, then by the basis comparator.
pub struct FilteredComparator<'a, S> {
    stream: &'a S,
}

impl<S> Clone for FilteredComparator<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for FilteredComparator<'_, S> {}

impl<'a, S: FilteredStream> FilteredComparator<'a, S> {
    pub fn new(stream: &'a S) -> Self {
        Self { stream }
    }

    // Elements missing from the stream sort before everything else
    pub fn compare(&self, a: &S::BasisT, b: &S::BasisT) -> Ordering {
        let index_a = self.stream.filtration_index(a).ok();
        let index_b = self.stream.filtration_index(b).ok();
        index_a
            .cmp(&index_b)
            .then_with(|| self.stream.compare_basis(a, b))
    }

    /// The pivot of `chain`, i.e. its maximal element in the filtered order.
    pub fn low<'c, CF: Ring>(
        &self,
        chain: &'c FormalSum<CF, S::BasisT>,
    ) -> Option<&'c S::BasisT> {
        chain.elements().max_by(|a, b| self.compare(a, b))
    }

    /// The minimal element of `chain` in the filtered order.
    pub fn high<'c, CF: Ring>(
        &self,
        chain: &'c FormalSum<CF, S::BasisT>,
    ) -> Option<&'c S::BasisT> {
        chain.elements().min_by(|a, b| self.compare(a, b))
    }
}
