// ======== Default stream implementors ========================

use std::cmp::Ordering;

use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::DualphError;

use super::{BasisElement, FilteredStream, FiltrationT};

// ====== ExplicitStream =======================

#[derive(Debug, Clone)]
struct Cell<T, FilT> {
    dimension: usize,
    boundary: Vec<(i64, T)>,
    value: FilT,
}

/// A stream whose cells and boundaries are supplied one by one.
///
/// Cells may be added in any order; once every face is present call [`finalize`](Self::finalize).
/// Finalizing checks the boundaries, sorts the cells into the filtered order and assigns each cell the rank of its filtration value amongst all distinct values.
/// Within one filtration value, lower dimensional cells come first.
#[derive(Debug, Clone)]
pub struct ExplicitStream<T: BasisElement, FilT: FiltrationT> {
    cells: FxHashMap<T, Cell<T, FilT>>,
    order: Vec<T>,
    indices: FxHashMap<T, usize>,
    max_index: Option<usize>,
    finalized: bool,
}

impl<T: BasisElement, FilT: FiltrationT> Default for ExplicitStream<T, FilT> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: BasisElement, FilT: FiltrationT> ExplicitStream<T, FilT> {
    pub fn new() -> Self {
        Self {
            cells: FxHashMap::default(),
            order: vec![],
            indices: FxHashMap::default(),
            max_index: None,
            finalized: false,
        }
    }

    /// Builds and finalizes a stream from `(element, dimension, boundary, filtration_value)` tuples.
    pub fn from_cells(
        cells: impl IntoIterator<Item = (T, usize, Vec<(i64, T)>, FilT)>,
    ) -> Result<Self, DualphError> {
        let mut stream = Self::new();
        for (element, dimension, boundary, value) in cells {
            stream.add_element(element, dimension, boundary, value)?;
        }
        stream.finalize()?;
        Ok(stream)
    }

    /// Adding an element that is already present replaces it.
    pub fn add_element(
        &mut self,
        element: T,
        dimension: usize,
        boundary: Vec<(i64, T)>,
        filtration_value: FilT,
    ) -> Result<(), DualphError> {
        if self.finalized {
            return Err(DualphError::StreamFinalized);
        }
        self.cells.insert(
            element,
            Cell {
                dimension,
                boundary,
                value: filtration_value,
            },
        );
        Ok(())
    }

    /// Returns whether the element was present.
    pub fn remove_element(&mut self, element: &T) -> Result<bool, DualphError> {
        if self.finalized {
            return Err(DualphError::StreamFinalized);
        }
        Ok(self.cells.remove(element).is_some())
    }

    /// Validates every boundary and fixes the filtered order.
    /// Calling this on a finalized stream does nothing.
    pub fn finalize(&mut self) -> Result<(), DualphError> {
        if self.finalized {
            return Ok(());
        }
        for (element, cell) in self.cells.iter() {
            for (_, face) in cell.boundary.iter() {
                let valid = self.cells.get(face).is_some_and(|face_cell| {
                    face_cell.dimension + 1 == cell.dimension && face_cell.value <= cell.value
                });
                if !valid {
                    return Err(DualphError::InvalidBoundary {
                        element: format!("{element:?}"),
                        face: format!("{face:?}"),
                    });
                }
            }
        }

        let distinct_values: Vec<FilT> = self
            .cells
            .values()
            .map(|cell| cell.value)
            .sorted()
            .dedup()
            .collect();

        self.order = self
            .cells
            .iter()
            .sorted_by(|(a, cell_a), (b, cell_b)| {
                cell_a
                    .value
                    .cmp(&cell_b.value)
                    .then_with(|| cell_a.dimension.cmp(&cell_b.dimension))
                    .then_with(|| a.cmp(b))
            })
            .map(|(element, _)| element.clone())
            .collect();

        self.indices = self
            .cells
            .iter()
            .map(|(element, cell)| {
                let rank = distinct_values
                    .binary_search(&cell.value)
                    .unwrap_or_else(|rank| rank);
                (element.clone(), rank)
            })
            .collect();
        self.max_index = distinct_values.len().checked_sub(1);
        self.finalized = true;
        Ok(())
    }

    fn cell(&self, element: &T) -> Result<&Cell<T, FilT>, DualphError> {
        self.cells.get(element).ok_or_else(|| DualphError::NotInStream {
            element: format!("{element:?}"),
        })
    }
}

impl<T: BasisElement, FilT: FiltrationT> FilteredStream for ExplicitStream<T, FilT> {
    type BasisT = T;
    type FiltrationT = FilT;

    /// Empty until the stream is finalized.
    fn elements(&self) -> impl Iterator<Item = &T> {
        self.order.iter()
    }

    fn dimension(&self, element: &T) -> Result<usize, DualphError> {
        Ok(self.cell(element)?.dimension)
    }

    fn filtration_index(&self, element: &T) -> Result<usize, DualphError> {
        if !self.finalized {
            return Err(DualphError::StreamNotFinalized);
        }
        self.indices
            .get(element)
            .copied()
            .ok_or_else(|| DualphError::NotInStream {
                element: format!("{element:?}"),
            })
    }

    fn filtration_value(&self, element: &T) -> Result<FilT, DualphError> {
        Ok(self.cell(element)?.value)
    }

    fn boundary(&self, element: &T) -> Result<impl Iterator<Item = (i64, T)>, DualphError> {
        Ok(self.cell(element)?.boundary.iter().cloned())
    }

    fn compare_basis(&self, a: &T, b: &T) -> Ordering {
        let dimension = |e: &T| self.cells.get(e).map(|cell| cell.dimension);
        dimension(a).cmp(&dimension(b)).then_with(|| a.cmp(b))
    }

    fn size(&self) -> usize {
        self.cells.len()
    }

    fn max_filtration_index(&self) -> Option<usize> {
        self.max_index
    }

    fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn contains(&self, element: &T) -> bool {
        self.cells.contains_key(element)
    }
}
