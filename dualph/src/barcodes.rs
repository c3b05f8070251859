//! Barcodes: per-dimension multisets of persistence intervals, optionally annotated with a generating chain.
use std::collections::BTreeMap;
use std::fmt::Display;

use itertools::Itertools;

use crate::chains::FormalSum;
use crate::streams::FiltrationT;

/// A half-open interval `[birth, death)`.
///
/// `death = None` marks a right-infinite interval and `birth = None` a left-infinite one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval<FilT> {
    pub birth: Option<FilT>,
    pub death: Option<FilT>,
}

impl<FilT: FiltrationT> Interval<FilT> {
    pub fn finite(birth: FilT, death: FilT) -> Self {
        Self {
            birth: Some(birth),
            death: Some(death),
        }
    }

    pub fn right_infinite(birth: FilT) -> Self {
        Self {
            birth: Some(birth),
            death: None,
        }
    }

    pub fn left_infinite(death: FilT) -> Self {
        Self {
            birth: None,
            death: Some(death),
        }
    }

    pub fn is_infinite(&self) -> bool {
        self.is_left_infinite() || self.is_right_infinite()
    }

    pub fn is_left_infinite(&self) -> bool {
        self.birth.is_none()
    }

    pub fn is_right_infinite(&self) -> bool {
        self.death.is_none()
    }

    /// Whether `birth <= point < death`.
    pub fn contains_point(&self, point: FilT) -> bool {
        self.birth.map_or(true, |birth| birth <= point)
            && self.death.map_or(true, |death| point < death)
    }

    /// Finite intervals with `birth == death` have zero measure.
    pub fn has_positive_measure(&self) -> bool {
        match (self.birth, self.death) {
            (Some(birth), Some(death)) => birth < death,
            _ => true,
        }
    }
}

impl<FilT: FiltrationT> Display for Interval<FilT> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.birth, self.death) {
            (Some(birth), Some(death)) => write!(f, "[{birth}, {death})"),
            (Some(birth), None) => write!(f, "[{birth}, infinity)"),
            (None, Some(death)) => write!(f, "[-infinity, {death})"),
            (None, None) => write!(f, "[-infinity, infinity)"),
        }
    }
}

/// A collection of intervals grouped by dimension, each carrying an annotation of type `G`.
///
/// Equality compares the multisets of intervals in each dimension and ignores the annotations.
#[derive(Debug, Clone)]
pub struct AnnotatedBarcodeCollection<FilT, G> {
    intervals: BTreeMap<usize, Vec<(Interval<FilT>, G)>>,
}

/// A barcode without generators.
pub type BarcodeCollection<FilT> = AnnotatedBarcodeCollection<FilT, ()>;

/// A barcode in which every interval carries a generating chain.
pub type AugmentedBarcodeCollection<FilT, CF, T> = AnnotatedBarcodeCollection<FilT, FormalSum<CF, T>>;

impl<FilT: FiltrationT, G> Default for AnnotatedBarcodeCollection<FilT, G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<FilT: FiltrationT, G> AnnotatedBarcodeCollection<FilT, G> {
    pub fn new() -> Self {
        Self {
            intervals: BTreeMap::new(),
        }
    }

    pub fn push(&mut self, dimension: usize, interval: Interval<FilT>, generator: G) {
        self.intervals
            .entry(dimension)
            .or_default()
            .push((interval, generator));
    }

    pub fn add_interval_with_generator(
        &mut self,
        dimension: usize,
        birth: FilT,
        death: FilT,
        generator: G,
    ) {
        self.push(dimension, Interval::finite(birth, death), generator);
    }

    pub fn add_right_infinite_interval_with_generator(
        &mut self,
        dimension: usize,
        birth: FilT,
        generator: G,
    ) {
        self.push(dimension, Interval::right_infinite(birth), generator);
    }

    pub fn add_left_infinite_interval_with_generator(
        &mut self,
        dimension: usize,
        death: FilT,
        generator: G,
    ) {
        self.push(dimension, Interval::left_infinite(death), generator);
    }

    /// Dimensions with at least one interval, in increasing order.
    pub fn dimensions(&self) -> impl Iterator<Item = usize> + '_ {
        self.intervals
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(dimension, _)| *dimension)
    }

    pub fn entries_at_dimension(&self, dimension: usize) -> &[(Interval<FilT>, G)] {
        self.intervals
            .get(&dimension)
            .map(|entries| entries.as_slice())
            .unwrap_or_default()
    }

    pub fn intervals_at_dimension(&self, dimension: usize) -> Vec<Interval<FilT>> {
        self.entries_at_dimension(dimension)
            .iter()
            .map(|(interval, _)| *interval)
            .collect()
    }

    pub fn generators_at_dimension(&self, dimension: usize) -> Vec<&G> {
        self.entries_at_dimension(dimension)
            .iter()
            .map(|(_, generator)| generator)
            .collect()
    }

    /// All entries as `(dimension, interval, generator)`, grouped by increasing dimension.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Interval<FilT>, &G)> + '_ {
        self.intervals.iter().flat_map(|(dimension, entries)| {
            entries
                .iter()
                .map(move |(interval, generator)| (*dimension, interval, generator))
        })
    }

    /// For each dimension, the number of intervals containing `point`.
    pub fn betti_numbers_at(&self, point: FilT) -> BTreeMap<usize, usize> {
        self.intervals
            .iter()
            .map(|(dimension, entries)| {
                let count = entries
                    .iter()
                    .filter(|(interval, _)| interval.contains_point(point))
                    .count();
                (*dimension, count)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.intervals.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn retain(mut self, keep: impl Fn(usize, &Interval<FilT>) -> bool) -> Self {
        for (dimension, entries) in self.intervals.iter_mut() {
            entries.retain(|(interval, _)| keep(*dimension, interval));
        }
        self.intervals.retain(|_, entries| !entries.is_empty());
        self
    }

    pub fn infinite_intervals(self) -> Self {
        self.retain(|_, interval| interval.is_infinite())
    }

    pub fn filter_by_max_dimension(self, max_dimension: usize) -> Self {
        self.retain(|dimension, _| dimension <= max_dimension)
    }

    pub fn filter_positive_measure(self) -> Self {
        self.retain(|_, interval| interval.has_positive_measure())
    }

    pub fn forget_generators(&self) -> BarcodeCollection<FilT> {
        let mut barcode = BarcodeCollection::new();
        for (dimension, interval, _) in self.iter() {
            barcode.push(dimension, *interval, ());
        }
        barcode
    }

    fn sorted_intervals(&self, dimension: usize) -> Vec<Interval<FilT>> {
        self.intervals_at_dimension(dimension)
            .into_iter()
            .sorted()
            .collect()
    }
}

impl<FilT: FiltrationT> BarcodeCollection<FilT> {
    pub fn add_interval(&mut self, dimension: usize, birth: FilT, death: FilT) {
        self.add_interval_with_generator(dimension, birth, death, ());
    }

    pub fn add_right_infinite_interval(&mut self, dimension: usize, birth: FilT) {
        self.add_right_infinite_interval_with_generator(dimension, birth, ());
    }

    pub fn add_left_infinite_interval(&mut self, dimension: usize, death: FilT) {
        self.add_left_infinite_interval_with_generator(dimension, death, ());
    }
}

impl<FilT: FiltrationT, G, H> PartialEq<AnnotatedBarcodeCollection<FilT, H>>
    for AnnotatedBarcodeCollection<FilT, G>
{
    fn eq(&self, other: &AnnotatedBarcodeCollection<FilT, H>) -> bool {
        self.dimensions()
            .chain(other.dimensions())
            .unique()
            .all(|dimension| self.sorted_intervals(dimension) == other.sorted_intervals(dimension))
    }
}

impl<FilT: FiltrationT, G> Display for AnnotatedBarcodeCollection<FilT, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for dimension in self.dimensions() {
            writeln!(f, "Dimension: {dimension}")?;
            for interval in self.sorted_intervals(dimension) {
                writeln!(f, "{interval}")?;
            }
        }
        Ok(())
    }
}
