// ======== Stream adaptors ====================================

use std::cmp::Ordering;

use rustc_hash::FxHashMap;

use crate::DualphError;

use super::{FilteredComparator, FilteredStream};

// ====== DualStream ===========================

/// The dual of a finalized stream: every boundary is replaced by the corresponding coboundary.
///
/// The coefficient of `tau` in the coboundary of `sigma` is the coefficient of `sigma` in the boundary of `tau`.
/// Iteration runs in reverse filtered order, with filtration indices flipped to `max - index` and the basis comparator reversed, so indices remain non-decreasing along the iteration.
/// Dimensions and filtration values are those of the underlying stream.
pub struct DualStream<'a, S: FilteredStream> {
    stream: &'a S,
    elements: Vec<S::BasisT>,
    coboundaries: FxHashMap<S::BasisT, Vec<(i64, S::BasisT)>>,
    max_index: usize,
}

impl<'a, S: FilteredStream> DualStream<'a, S> {
    pub fn new(stream: &'a S) -> Result<Self, DualphError> {
        if !stream.is_finalized() {
            return Err(DualphError::StreamNotFinalized);
        }

        let mut elements: Vec<S::BasisT> = stream.elements().cloned().collect();
        let mut coboundaries: FxHashMap<S::BasisT, Vec<(i64, S::BasisT)>> = elements
            .iter()
            .map(|element| (element.clone(), vec![]))
            .collect();
        for element in elements.iter() {
            for (coefficient, face) in stream.boundary(element)? {
                coboundaries
                    .get_mut(&face)
                    .ok_or_else(|| DualphError::InvalidBoundary {
                        element: format!("{element:?}"),
                        face: format!("{face:?}"),
                    })?
                    .push((coefficient, element.clone()));
            }
        }
        elements.reverse();

        Ok(Self {
            stream,
            elements,
            coboundaries,
            max_index: stream.max_filtration_index().unwrap_or(0),
        })
    }

    /// The stream this is the dual of.
    pub fn primal(&self) -> &'a S {
        self.stream
    }

    /// The filtered order of the underlying stream.
    pub fn primal_comparator(&self) -> FilteredComparator<'a, S> {
        FilteredComparator::new(self.stream)
    }
}

impl<S: FilteredStream> FilteredStream for DualStream<'_, S> {
    type BasisT = S::BasisT;
    type FiltrationT = S::FiltrationT;

    fn elements(&self) -> impl Iterator<Item = &Self::BasisT> {
        self.elements.iter()
    }

    fn dimension(&self, element: &Self::BasisT) -> Result<usize, DualphError> {
        self.stream.dimension(element)
    }

    fn filtration_index(&self, element: &Self::BasisT) -> Result<usize, DualphError> {
        Ok(self.max_index - self.stream.filtration_index(element)?)
    }

    fn filtration_value(&self, element: &Self::BasisT) -> Result<Self::FiltrationT, DualphError> {
        self.stream.filtration_value(element)
    }

    /// Returns the coboundary of `element` in the underlying stream.
    fn boundary(
        &self,
        element: &Self::BasisT,
    ) -> Result<impl Iterator<Item = (i64, Self::BasisT)>, DualphError> {
        let coboundary =
            self.coboundaries
                .get(element)
                .ok_or_else(|| DualphError::NotInStream {
                    element: format!("{element:?}"),
                })?;
        Ok(coboundary.iter().cloned())
    }

    fn compare_basis(&self, a: &Self::BasisT, b: &Self::BasisT) -> Ordering {
        self.stream.compare_basis(b, a)
    }

    fn size(&self) -> usize {
        self.elements.len()
    }

    fn max_filtration_index(&self) -> Option<usize> {
        self.stream.max_filtration_index()
    }

    fn is_finalized(&self) -> bool {
        true
    }

    fn contains(&self, element: &Self::BasisT) -> bool {
        self.coboundaries.contains_key(element)
    }
}
