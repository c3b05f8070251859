//! Persistence algorithms for finalized [`FilteredStream`]s.
//! Includes the R=DV decomposition of the boundary matrix (pHcol) as well as the dual algorithm over cocycles (pCoh).
//!
//! Both engines implement [`PersistenceAlgorithm`] and are configured with a coefficient field and a [`DimensionWindow`].
//! Over correct input they produce equal barcodes, only the generators attached to augmented intervals differ.

pub mod cohomology;
pub mod homology;

pub use cohomology::*;
pub use homology::*;

use std::fmt::Debug;
use std::ops::RangeInclusive;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::barcodes::{AugmentedBarcodeCollection, BarcodeCollection};
use crate::chains::{FormalSum, FreeModule};
use crate::fields::Field;
use crate::streams::{BasisElement, FilteredStream};
use crate::DualphError;

// ====== DimensionWindow ======================

/// The range of dimensions `[min, max]` for which intervals are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionWindow {
    min: usize,
    max: usize,
}

impl Default for DimensionWindow {
    fn default() -> Self {
        Self { min: 0, max: 2 }
    }
}

impl DimensionWindow {
    pub fn new(min: usize, max: usize) -> Result<Self, DualphError> {
        if min > max {
            return Err(DualphError::InvalidDimensionWindow { min, max });
        }
        Ok(Self { min, max })
    }

    /// Report dimensions `0..=max`.
    pub fn up_to(max: usize) -> Self {
        Self { min: 0, max }
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Whether intervals of this dimension are reported.
    pub fn contains(&self, dimension: usize) -> bool {
        (self.min..=self.max).contains(&dimension)
    }

    /// Dimensions of the columns that have to be reduced, `max + 1` included so that classes in dimension `max` can die.
    pub fn reduction_range(&self) -> RangeInclusive<usize> {
        self.min..=self.max + 1
    }

    pub fn contains_reduction(&self, dimension: usize) -> bool {
        self.reduction_range().contains(&dimension)
    }
}

// ====== PersistenceAlgorithm =================

/// An algorithm that computes the barcode of a finalized stream.
pub trait PersistenceAlgorithm<S: FilteredStream> {
    type CoefficientField: Field;

    fn compute_intervals(&self, stream: &S) -> Result<BarcodeCollection<S::FiltrationT>, DualphError>;

    fn compute_augmented_intervals(
        &self,
        stream: &S,
    ) -> Result<
        AugmentedBarcodeCollection<S::FiltrationT, Self::CoefficientField, S::BasisT>,
        DualphError,
    >;
}

// ====== PivotIndex ===========================

/// Maps a pivot to the columns currently registered under it.
///
/// After every column is reduced each pivot is claimed by at most one column.
/// Any lookup that finds two claimants fails with [`DualphError::DuplicatePivot`].
#[derive(Debug, Clone)]
pub struct PivotIndex<T: BasisElement> {
    columns: FxHashMap<T, FxHashSet<T>>,
}

impl<T: BasisElement> Default for PivotIndex<T> {
    fn default() -> Self {
        Self {
            columns: FxHashMap::default(),
        }
    }
}

impl<T: BasisElement> PivotIndex<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The unique column with this pivot, if any.
    pub fn column_with_pivot(&self, pivot: &T) -> Result<Option<&T>, DualphError> {
        let Some(columns) = self.columns.get(pivot) else {
            return Ok(None);
        };
        if columns.len() > 1 {
            return Err(duplicate_pivot(pivot));
        }
        Ok(columns.iter().next())
    }

    /// Registering a second column under a pivot is an error.
    pub fn register(&mut self, pivot: T, column: T) -> Result<(), DualphError> {
        let columns = self.columns.entry(pivot.clone()).or_default();
        if columns.iter().any(|existing| existing != &column) {
            return Err(duplicate_pivot(&pivot));
        }
        columns.insert(column);
        Ok(())
    }

    pub fn unregister(&mut self, pivot: &T, column: &T) {
        if let Some(columns) = self.columns.get_mut(pivot) {
            columns.remove(column);
            if columns.is_empty() {
                self.columns.remove(pivot);
            }
        }
    }

    /// `(pivot, column)` pairs in unspecified order.
    pub fn pairs(&self) -> impl Iterator<Item = (&T, &T)> + '_ {
        self.columns
            .iter()
            .flat_map(|(pivot, columns)| columns.iter().map(move |column| (pivot, column)))
    }

    pub fn len(&self) -> usize {
        self.columns.values().map(FxHashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn duplicate_pivot<T: Debug>(pivot: &T) -> DualphError {
    DualphError::DuplicatePivot {
        pivot: format!("{pivot:?}"),
    }
}

// ====== Boundary columns =====================

/// The columns of the boundary matrix for the elements of dimension `dimension`, in filtered order.
pub fn boundary_columns<CF, S>(
    field: &CF,
    stream: &S,
    dimension: usize,
) -> Result<Vec<FormalSum<CF, S::BasisT>>, DualphError>
where
    CF: Field,
    S: FilteredStream,
{
    if !stream.is_finalized() {
        return Err(DualphError::StreamNotFinalized);
    }
    let module = FreeModule::new(field.clone());
    stream
        .elements_of_dimension(dimension)
        .map(|element| Ok(module.create_sum(stream.boundary(element)?)))
        .collect()
}
