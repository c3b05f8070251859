//! The pHcol algorithm: column reduction of the boundary matrix into `R = D V`.
//!
//! Columns are reduced in the filtered order of the stream.
//! Every time the pivot of the current column is already claimed by an earlier column, a multiple of that column is subtracted until the pivot is new or the column vanishes.
//! Finite intervals are read off from the pivots of `R`, and infinite intervals from the columns of `R` that reduced to zero and were never claimed as a pivot.
//!
//! In [`HomologyMode::Relative`] the same decomposition is read as relative homology.
//! A pair `(low(i), i)` is then reported in the dimension of `i` with generator `V[i]`, and each unpaired cycle becomes a left-infinite interval ending where it enters.

use log::{debug, info, trace};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::barcodes::{AnnotatedBarcodeCollection, AugmentedBarcodeCollection, BarcodeCollection};
use crate::chains::{FormalSum, FreeModule};
use crate::fields::Field;
use crate::streams::{BasisElement, FilteredStream};
use crate::DualphError;

use super::{duplicate_pivot, DimensionWindow, PersistenceAlgorithm, PivotIndex};

// ====== PersistentHomology ===================

/// Which homology is read off the decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HomologyMode {
    #[default]
    Absolute,
    Relative,
}

/// Persistent homology via the `R = D V` decomposition.
///
/// In absolute mode augmented intervals carry the reduced column `R[i]` of the column that killed the class, or the reduction column `V[f]` of the generator of an infinite class.
/// In relative mode every interval carries the reduction column of the element that reports it.
#[derive(Debug, Clone)]
pub struct PersistentHomology<CF: Field> {
    field: CF,
    window: DimensionWindow,
    mode: HomologyMode,
}

impl<CF: Field> PersistentHomology<CF> {
    pub fn new(field: CF) -> Self {
        Self::with_window(field, DimensionWindow::default())
    }

    pub fn with_window(field: CF, window: DimensionWindow) -> Self {
        Self {
            field,
            window,
            mode: HomologyMode::Absolute,
        }
    }

    /// Relative persistent homology over the default window.
    pub fn relative(field: CF) -> Self {
        Self::new(field).with_mode(HomologyMode::Relative)
    }

    pub fn with_mode(self, mode: HomologyMode) -> Self {
        Self { mode, ..self }
    }

    pub fn field(&self) -> &CF {
        &self.field
    }

    pub fn window(&self) -> DimensionWindow {
        self.window
    }

    pub fn mode(&self) -> HomologyMode {
        self.mode
    }

    /// Reduces every column with dimension in the window's reduction range.
    pub fn decompose<S: FilteredStream>(
        &self,
        stream: &S,
    ) -> Result<RvDecomposition<CF, S::BasisT>, DualphError> {
        RvBuilder::init(stream, self.field.clone(), self.window)?.reduce_all()
    }

    fn read_off<S, G>(
        &self,
        stream: &S,
        decomposition: &RvDecomposition<CF, S::BasisT>,
        finite_generator: impl Fn(&S::BasisT) -> G,
        infinite_generator: impl Fn(&S::BasisT) -> G,
    ) -> Result<AnnotatedBarcodeCollection<S::FiltrationT, G>, DualphError>
    where
        S: FilteredStream,
    {
        let mut barcode = AnnotatedBarcodeCollection::new();

        // Candidate births, i.e. cycles whose dimension is reported
        let mut essential: FxHashSet<&S::BasisT> = FxHashSet::default();
        for column in decomposition.columns() {
            if decomposition.is_cycle(column) && self.window.contains(stream.dimension(column)?) {
                essential.insert(column);
            }
        }

        for column in decomposition.columns() {
            let Some(pivot) = decomposition.low(column) else {
                continue;
            };
            essential.remove(pivot);
            let dimension = match self.mode {
                HomologyMode::Absolute => stream.dimension(pivot)?,
                HomologyMode::Relative => stream.dimension(column)?,
            };
            if !self.window.contains(dimension) {
                continue;
            }
            let birth = stream.filtration_value(pivot)?;
            let death = stream.filtration_value(column)?;
            // Simultaneous birth and death carries no signal
            if birth < death {
                barcode.add_interval_with_generator(dimension, birth, death, finite_generator(column));
            }
        }

        for column in decomposition.columns() {
            if !essential.contains(column) {
                continue;
            }
            let dimension = stream.dimension(column)?;
            let value = stream.filtration_value(column)?;
            let generator = infinite_generator(column);
            match self.mode {
                HomologyMode::Absolute => {
                    barcode.add_right_infinite_interval_with_generator(dimension, value, generator)
                }
                HomologyMode::Relative => {
                    barcode.add_left_infinite_interval_with_generator(dimension, value, generator)
                }
            }
        }

        for dimension in barcode.dimensions() {
            debug!(
                "Dimension {dimension}: {} intervals",
                barcode.entries_at_dimension(dimension).len()
            );
        }
        info!(
            "Homology produced {} intervals from {} columns",
            barcode.len(),
            decomposition.columns().len()
        );
        Ok(barcode)
    }
}

impl<CF: Field, S: FilteredStream> PersistenceAlgorithm<S> for PersistentHomology<CF> {
    type CoefficientField = CF;

    fn compute_intervals(&self, stream: &S) -> Result<BarcodeCollection<S::FiltrationT>, DualphError> {
        let decomposition = self.decompose(stream)?;
        self.read_off(stream, &decomposition, |_| (), |_| ())
    }

    fn compute_augmented_intervals(
        &self,
        stream: &S,
    ) -> Result<AugmentedBarcodeCollection<S::FiltrationT, CF, S::BasisT>, DualphError> {
        let decomposition = self.decompose(stream)?;
        let empty = decomposition.module.create_new_sum();
        let r = |column: &S::BasisT| {
            decomposition
                .r(column)
                .cloned()
                .unwrap_or_else(|| empty.clone())
        };
        let v = |column: &S::BasisT| {
            decomposition
                .v(column)
                .cloned()
                .unwrap_or_else(|| empty.clone())
        };
        match self.mode {
            HomologyMode::Absolute => self.read_off(stream, &decomposition, r, v),
            HomologyMode::Relative => self.read_off(stream, &decomposition, v, v),
        }
    }
}

// ====== RvDecomposition ======================

/// The result of reducing a boundary matrix: the reduced matrix `R`, the reduction matrix `V` and the pivot of every non-zero column of `R`.
#[derive(Debug, Clone)]
pub struct RvDecomposition<CF: Field, T: BasisElement> {
    module: FreeModule<CF>,
    columns: Vec<T>,
    r: FxHashMap<T, FormalSum<CF, T>>,
    v: FxHashMap<T, FormalSum<CF, T>>,
    low: FxHashMap<T, T>,
    pivots: PivotIndex<T>,
}

impl<CF: Field, T: BasisElement> RvDecomposition<CF, T> {
    /// The reduced columns, in filtered order.
    pub fn columns(&self) -> &[T] {
        &self.columns
    }

    pub fn r(&self, column: &T) -> Option<&FormalSum<CF, T>> {
        self.r.get(column)
    }

    pub fn v(&self, column: &T) -> Option<&FormalSum<CF, T>> {
        self.v.get(column)
    }

    /// The pivot of `R[column]`, `None` if the column is zero or was not reduced.
    pub fn low(&self, column: &T) -> Option<&T> {
        self.low.get(column)
    }

    pub fn is_cycle(&self, column: &T) -> bool {
        self.r.get(column).is_some_and(FormalSum::is_empty)
    }

    /// The pivot index built during the reduction.
    pub fn pivots(&self) -> &PivotIndex<T> {
        &self.pivots
    }

    /// Checks that `R = D V` on every reduced column, that each stored pivot is the pivot of its column and that no two columns share a pivot.
    pub fn verify<S>(&self, stream: &S) -> Result<bool, DualphError>
    where
        S: FilteredStream<BasisT = T>,
    {
        let comparator = stream.comparator();
        let mut seen_pivots = FxHashSet::default();
        for column in self.columns.iter() {
            let (Some(r_i), Some(v_i)) = (self.r.get(column), self.v.get(column)) else {
                return Ok(false);
            };

            let mut d_v_i = self.module.create_new_sum();
            for (element, coefficient) in v_i.iter() {
                let boundary = self.module.create_sum(stream.boundary(element)?);
                d_v_i.accumulate(&boundary, coefficient);
            }
            if !self.module.subtract(&d_v_i, r_i).is_empty() {
                return Ok(false);
            }

            if comparator.low(r_i) != self.low.get(column) {
                return Ok(false);
            }
            if let Some(pivot) = self.low.get(column) {
                if !seen_pivots.insert(pivot) {
                    return Ok(false);
                }
            }
        }

        // The index must hold exactly the stored lows
        if self.pivots.len() != self.low.len() {
            return Ok(false);
        }
        Ok(self
            .pivots
            .pairs()
            .all(|(pivot, column)| self.low.get(column) == Some(pivot)))
    }
}

// ====== RvBuilder ============================

struct RvBuilder<'a, CF: Field, S: FilteredStream> {
    stream: &'a S,
    module: FreeModule<CF>,
    window: DimensionWindow,
    pivots: PivotIndex<S::BasisT>,
    columns: Vec<S::BasisT>,
    r: FxHashMap<S::BasisT, FormalSum<CF, S::BasisT>>,
    v: FxHashMap<S::BasisT, FormalSum<CF, S::BasisT>>,
    low: FxHashMap<S::BasisT, S::BasisT>,
}

impl<'a, CF: Field, S: FilteredStream> RvBuilder<'a, CF, S> {
    fn init(stream: &'a S, field: CF, window: DimensionWindow) -> Result<Self, DualphError> {
        if !stream.is_finalized() {
            return Err(DualphError::StreamNotFinalized);
        }
        Ok(Self {
            stream,
            module: FreeModule::new(field),
            window,
            pivots: PivotIndex::new(),
            columns: vec![],
            r: FxHashMap::default(),
            v: FxHashMap::default(),
            low: FxHashMap::default(),
        })
    }

    /// Reduces `r_i` against the saved columns, recording the column operations in `v_i`.
    /// Returns the final pivot of `r_i`.
    fn reduce_column(
        &self,
        r_i: &mut FormalSum<CF, S::BasisT>,
        v_i: &mut FormalSum<CF, S::BasisT>,
    ) -> Result<Option<S::BasisT>, DualphError> {
        let comparator = self.stream.comparator();
        let field = self.module.ring();
        loop {
            let Some(pivot) = comparator.low(r_i).cloned() else {
                // Column reduced to 0 -> found cycle
                return Ok(None);
            };

            let Some(j) = self.pivots.column_with_pivot(&pivot)? else {
                // Cannot reduce further -> found boundary
                return Ok(Some(pivot));
            };
            let (Some(r_j), Some(v_j)) = (self.r.get(j), self.v.get(j)) else {
                return Err(duplicate_pivot(&pivot));
            };

            let ratio = field.divide(&r_i.coefficient(&pivot), &r_j.coefficient(&pivot))?;
            let multiple = field.negate(&ratio);
            trace!("Eliminating pivot {pivot:?} using column {j:?}");

            r_i.accumulate(r_j, &multiple);
            v_i.accumulate(v_j, &multiple);
            // Exact fields cancel the pivot, numeric fields may leave a residue
            r_i.remove(&pivot);
        }
    }

    fn save_column(
        &mut self,
        column: S::BasisT,
        r_i: FormalSum<CF, S::BasisT>,
        v_i: FormalSum<CF, S::BasisT>,
        pivot: Option<S::BasisT>,
    ) -> Result<(), DualphError> {
        if let Some(pivot) = pivot {
            self.pivots.register(pivot.clone(), column.clone())?;
            self.low.insert(column.clone(), pivot);
        }
        self.r.insert(column.clone(), r_i);
        self.v.insert(column.clone(), v_i);
        self.columns.push(column);
        Ok(())
    }

    fn reduce_all(mut self) -> Result<RvDecomposition<CF, S::BasisT>, DualphError> {
        let stream = self.stream;
        let one = self.module.ring().one();
        for element in stream.elements() {
            if !self.window.contains_reduction(stream.dimension(element)?) {
                continue;
            }
            let mut v_i = self.module.create_term(one.clone(), element.clone());
            let mut r_i = self.module.create_sum(stream.boundary(element)?);
            let pivot = self.reduce_column(&mut r_i, &mut v_i)?;
            self.save_column(element.clone(), r_i, v_i, pivot)?;
        }
        info!(
            "Reduced {} columns, found {} pivots",
            self.columns.len(),
            self.pivots.len()
        );
        Ok(RvDecomposition {
            module: self.module,
            columns: self.columns,
            r: self.r,
            v: self.v,
            low: self.low,
            pivots: self.pivots,
        })
    }
}
