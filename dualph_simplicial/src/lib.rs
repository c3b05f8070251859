//! Filtered simplicial complexes as [`FilteredStream`]s for the `dualph` engines.
//!
//! A [`SimplexStream`] is an [`ExplicitStream`] of [`Simplex`]es whose boundaries are computed with the usual alternating signs.
//! The [`complexes`] module contains a handful of standard examples.

pub mod complexes;

use std::cmp::Ordering;
use std::fmt::Display;

use dualph::streams::implementors::ExplicitStream;
use dualph::streams::{BasisElement, FilteredStream, FiltrationT};
use dualph::DualphError;
use itertools::Itertools;
use log::debug;
use rustc_hash::FxHashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimplicialError {
    #[error("a simplex needs at least one vertex")]
    EmptySimplex,
    #[error("a simplicial circle needs at least 3 vertices, got {0}")]
    CircleTooSmall(usize),
    #[error(transparent)]
    Stream(#[from] DualphError),
}

// ====== Simplex ==============================

/// A simplex, stored as its strictly increasing list of vertices.
///
/// Simplices are ordered first by dimension and then lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Simplex(Vec<usize>);

impl BasisElement for Simplex {}

impl Simplex {
    /// Vertices may be given in any order, repeats are ignored.
    pub fn new(vertices: impl IntoIterator<Item = usize>) -> Result<Self, SimplicialError> {
        let vertices: Vec<usize> = vertices.into_iter().sorted().dedup().collect();
        if vertices.is_empty() {
            return Err(SimplicialError::EmptySimplex);
        }
        Ok(Self(vertices))
    }

    pub fn vertices(&self) -> &[usize] {
        &self.0
    }

    pub fn dimension(&self) -> usize {
        self.0.len() - 1
    }

    /// The codimension one faces, the `i`th face omits the `i`th vertex.
    pub fn faces(&self) -> impl Iterator<Item = Simplex> + '_ {
        let n_faces = if self.0.len() > 1 { self.0.len() } else { 0 };
        (0..n_faces).map(move |i| {
            Simplex(
                self.0
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, v)| *v)
                    .collect(),
            )
        })
    }

    /// The boundary `sum_i (-1)^i [v_0, .., v_i-hat, .., v_n]`.
    pub fn boundary(&self) -> Vec<(i64, Simplex)> {
        let parity = |i: usize| if i % 2 == 0 { 1 } else { -1 };
        self.faces()
            .enumerate()
            .map(|(i, face)| (parity(i), face))
            .collect()
    }
}

impl Ord for Simplex {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Simplex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Simplex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0.iter().join(","))
    }
}

// ====== SimplexStream ========================

/// A filtered simplicial complex.
#[derive(Debug, Clone)]
pub struct SimplexStream<FilT: FiltrationT> {
    values: FxHashMap<Simplex, FilT>,
    stream: ExplicitStream<Simplex, FilT>,
}

impl<FilT: FiltrationT> Default for SimplexStream<FilT> {
    fn default() -> Self {
        Self::new()
    }
}

impl<FilT: FiltrationT> SimplexStream<FilT> {
    pub fn new() -> Self {
        Self {
            values: FxHashMap::default(),
            stream: ExplicitStream::new(),
        }
    }

    /// Adding a simplex that is already present replaces its filtration value.
    pub fn add_element(&mut self, simplex: Simplex, value: FilT) -> Result<(), SimplicialError> {
        let boundary = simplex.boundary();
        self.stream
            .add_element(simplex.clone(), simplex.dimension(), boundary, value)?;
        self.values.insert(simplex, value);
        Ok(())
    }

    pub fn add_simplex(
        &mut self,
        vertices: impl IntoIterator<Item = usize>,
        value: FilT,
    ) -> Result<Simplex, SimplicialError> {
        let simplex = Simplex::new(vertices)?;
        self.add_element(simplex.clone(), value)?;
        Ok(simplex)
    }

    pub fn remove_simplex(&mut self, simplex: &Simplex) -> Result<bool, SimplicialError> {
        let removed = self.stream.remove_element(simplex)?;
        self.values.remove(simplex);
        Ok(removed)
    }

    /// Adds every missing face of every simplex.
    /// A missing face enters the filtration with the smallest value amongst its cofaces.
    pub fn ensure_all_faces(&mut self) -> Result<(), SimplicialError> {
        if self.stream.is_finalized() {
            return Err(DualphError::StreamFinalized.into());
        }
        let Some(max_dimension) = self.values.keys().map(Simplex::dimension).max() else {
            return Ok(());
        };
        let mut missing: FxHashMap<Simplex, FilT> = FxHashMap::default();
        // Every face of a layer is settled once all simplices of the layer above have been visited
        for dimension in (1..=max_dimension).rev() {
            let layer = self
                .values
                .iter()
                .chain(missing.iter())
                .filter(|(simplex, _)| simplex.dimension() == dimension)
                .map(|(simplex, value)| (simplex.clone(), *value))
                .collect_vec();
            for (simplex, value) in layer {
                for face in simplex.faces() {
                    if self.values.contains_key(&face) {
                        continue;
                    }
                    missing
                        .entry(face)
                        .and_modify(|existing| {
                            if value < *existing {
                                *existing = value;
                            }
                        })
                        .or_insert(value);
                }
            }
        }
        debug!("Adding {} missing faces", missing.len());
        for (face, value) in missing {
            self.add_element(face, value)?;
        }
        Ok(())
    }

    pub fn finalize(&mut self) -> Result<(), SimplicialError> {
        self.stream.finalize()?;
        Ok(())
    }

    /// The simplices of dimension `dimension`, in filtered order once finalized.
    pub fn simplices_of_dimension(&self, dimension: usize) -> Vec<&Simplex> {
        self.stream.elements_of_dimension(dimension).collect()
    }
}

impl<FilT: FiltrationT> FilteredStream for SimplexStream<FilT> {
    type BasisT = Simplex;
    type FiltrationT = FilT;

    fn elements(&self) -> impl Iterator<Item = &Simplex> {
        self.stream.elements()
    }

    fn dimension(&self, element: &Simplex) -> Result<usize, DualphError> {
        self.stream.dimension(element)
    }

    fn filtration_index(&self, element: &Simplex) -> Result<usize, DualphError> {
        self.stream.filtration_index(element)
    }

    fn filtration_value(&self, element: &Simplex) -> Result<FilT, DualphError> {
        self.stream.filtration_value(element)
    }

    fn boundary(
        &self,
        element: &Simplex,
    ) -> Result<impl Iterator<Item = (i64, Simplex)>, DualphError> {
        self.stream.boundary(element)
    }

    fn compare_basis(&self, a: &Simplex, b: &Simplex) -> Ordering {
        self.stream.compare_basis(a, b)
    }

    fn size(&self) -> usize {
        self.stream.size()
    }

    fn max_filtration_index(&self) -> Option<usize> {
        self.stream.max_filtration_index()
    }

    fn is_finalized(&self) -> bool {
        self.stream.is_finalized()
    }

    fn contains(&self, element: &Simplex) -> bool {
        self.stream.contains(element)
    }
}
