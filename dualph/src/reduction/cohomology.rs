//! The pCoh algorithm: persistent cohomology over live cocycles.
//!
//! Elements are processed in the filtered order of the primal stream while a set of live cocycles is maintained, each alongside its coboundary.
//! The coboundaries are obtained from the [`DualStream`] of the input.
//! When an element appears in the coboundary of some live cocycles, the youngest of them dies there and is subtracted from the others.
//! Otherwise the element starts a new live cocycle.

use log::{debug, info, trace};
use rustc_hash::FxHashMap;

use crate::barcodes::{AnnotatedBarcodeCollection, AugmentedBarcodeCollection, BarcodeCollection};
use crate::chains::{FormalSum, FreeModule};
use crate::fields::Field;
use crate::streams::adaptors::DualStream;
use crate::streams::{BasisElement, FilteredStream};
use crate::DualphError;

use super::{duplicate_pivot, DimensionWindow, PersistenceAlgorithm};

// ====== PersistentCohomology =================

/// Persistent (absolute) cohomology.
///
/// Produces the same barcode as [`PersistentHomology`](super::PersistentHomology).
/// Augmented finite intervals carry the cocycle that was killed, infinite intervals carry a surviving cocycle.
#[derive(Debug, Clone)]
pub struct PersistentCohomology<CF: Field> {
    field: CF,
    window: DimensionWindow,
}

#[derive(Debug, Clone)]
struct Cocycle<CF: Field, T: BasisElement> {
    dimension: usize,
    cochain: FormalSum<CF, T>,
    coboundary: FormalSum<CF, T>,
}

impl<CF: Field> PersistentCohomology<CF> {
    pub fn new(field: CF) -> Self {
        Self::with_window(field, DimensionWindow::default())
    }

    pub fn with_window(field: CF, window: DimensionWindow) -> Self {
        Self { field, window }
    }

    pub fn field(&self) -> &CF {
        &self.field
    }

    pub fn window(&self) -> DimensionWindow {
        self.window
    }

    fn run<S, G>(
        &self,
        stream: &S,
        generator: impl Fn(FormalSum<CF, S::BasisT>) -> G,
    ) -> Result<AnnotatedBarcodeCollection<S::FiltrationT, G>, DualphError>
    where
        S: FilteredStream,
    {
        let dual = DualStream::new(stream)?;
        let comparator = dual.primal_comparator();
        let module = FreeModule::new(self.field.clone());
        let field = module.ring();
        let one = field.one();

        // Cocycles one dimension below the window decide which elements of the lowest dimension are negative
        let processed = self.window.min().saturating_sub(1)..=self.window.max() + 1;

        let mut barcode = AnnotatedBarcodeCollection::new();
        let mut live: FxHashMap<S::BasisT, Cocycle<CF, S::BasisT>> = FxHashMap::default();
        let mut registered = vec![];
        let mut processed_count = 0;

        for sigma in dual.primal().elements() {
            let dimension = stream.dimension(sigma)?;
            if !processed.contains(&dimension) {
                continue;
            }
            processed_count += 1;

            let candidates: Vec<(S::BasisT, CF::Element)> = live
                .iter()
                .filter(|(_, cocycle)| cocycle.dimension + 1 == dimension)
                .filter_map(|(key, cocycle)| {
                    cocycle
                        .coboundary
                        .get(sigma)
                        .map(|coefficient| (key.clone(), coefficient.clone()))
                })
                .collect();

            let Some((j, c_j)) = candidates
                .iter()
                .max_by(|(a, _), (b, _)| comparator.compare(a, b))
            else {
                live.insert(
                    sigma.clone(),
                    Cocycle {
                        dimension,
                        cochain: module.create_term(one.clone(), sigma.clone()),
                        coboundary: module.create_sum(dual.boundary(sigma)?),
                    },
                );
                registered.push(sigma.clone());
                continue;
            };

            let killed = live.remove(j).ok_or_else(|| duplicate_pivot(j))?;
            trace!("Cocycle {j:?} dies at {sigma:?}");
            for (i, c_i) in candidates.iter().filter(|(i, _)| i != j) {
                let ratio = field.divide(c_i, c_j)?;
                let multiple = field.negate(&ratio);
                let cocycle = live.get_mut(i).ok_or_else(|| duplicate_pivot(i))?;
                cocycle.cochain.accumulate(&killed.cochain, &multiple);
                cocycle.coboundary.accumulate(&killed.coboundary, &multiple);
                // Exact fields cancel sigma, numeric fields may leave a residue
                cocycle.coboundary.remove(sigma);
            }

            if !self.window.contains(killed.dimension) {
                continue;
            }
            let birth = stream.filtration_value(j)?;
            let death = stream.filtration_value(sigma)?;
            // Simultaneous birth and death carries no signal
            if birth < death {
                barcode.add_interval_with_generator(
                    killed.dimension,
                    birth,
                    death,
                    generator(killed.cochain),
                );
            }
        }

        for key in registered {
            let Some(cocycle) = live.remove(&key) else {
                continue;
            };
            if self.window.contains(cocycle.dimension) {
                barcode.add_right_infinite_interval_with_generator(
                    cocycle.dimension,
                    stream.filtration_value(&key)?,
                    generator(cocycle.cochain),
                );
            }
        }

        for dimension in barcode.dimensions() {
            debug!(
                "Dimension {dimension}: {} intervals",
                barcode.entries_at_dimension(dimension).len()
            );
        }
        info!(
            "Cohomology produced {} intervals from {} elements",
            barcode.len(),
            processed_count
        );
        Ok(barcode)
    }
}

impl<CF: Field, S: FilteredStream> PersistenceAlgorithm<S> for PersistentCohomology<CF> {
    type CoefficientField = CF;

    fn compute_intervals(&self, stream: &S) -> Result<BarcodeCollection<S::FiltrationT>, DualphError> {
        self.run(stream, |_| ())
    }

    fn compute_augmented_intervals(
        &self,
        stream: &S,
    ) -> Result<AugmentedBarcodeCollection<S::FiltrationT, CF, S::BasisT>, DualphError> {
        self.run(stream, |cochain| cochain)
    }
}

#[cfg(test)]
mod tests {
    use crate::barcodes::BarcodeCollection;
    use crate::chains::{FormalSum, FreeModule};
    use crate::fields::{Field, ModularField, RationalField, Z2};
    use crate::reduction::{DimensionWindow, PersistenceAlgorithm, PersistentHomology};
    use crate::streams::adaptors::DualStream;
    use crate::streams::implementors::ExplicitStream;
    use crate::streams::tests::{filtered_triangle, zomorodian_carlsson};
    use crate::streams::FilteredStream;
    use crate::DualphError;

    use super::PersistentCohomology;

    fn coboundary_of<CF: Field, S: FilteredStream>(
        module: &FreeModule<CF>,
        dual: &DualStream<'_, S>,
        cochain: &FormalSum<CF, S::BasisT>,
    ) -> FormalSum<CF, S::BasisT> {
        let mut result = module.create_new_sum();
        for (element, coefficient) in cochain.iter() {
            result.accumulate(&module.create_sum(dual.boundary(element).unwrap()), coefficient);
        }
        result
    }

    #[test]
    fn test_agrees_with_homology() {
        for stream in [zomorodian_carlsson(), filtered_triangle()] {
            let field = ModularField::new(11).unwrap();
            let homology = PersistentHomology::new(field).compute_intervals(&stream).unwrap();
            let cohomology = PersistentCohomology::new(field).compute_intervals(&stream).unwrap();
            assert_eq!(homology, cohomology);
            assert_eq!(
                PersistentCohomology::new(Z2).compute_intervals(&stream).unwrap(),
                homology
            );
        }
    }

    #[test]
    fn test_zomorodian_carlsson() {
        let barcode = PersistentCohomology::new(RationalField)
            .compute_intervals(&zomorodian_carlsson())
            .unwrap();
        let mut expected = BarcodeCollection::new();
        expected.add_right_infinite_interval(0, 0);
        expected.add_interval(0, 0, 1);
        expected.add_interval(0, 1, 2);
        expected.add_interval(1, 2, 5);
        expected.add_interval(1, 3, 4);
        assert_eq!(barcode, expected);
    }

    #[test]
    fn test_window_above_zero() {
        let stream = zomorodian_carlsson();
        let window = DimensionWindow::new(1, 1).unwrap();
        let barcode = PersistentCohomology::with_window(Z2, window)
            .compute_intervals(&stream)
            .unwrap();
        let mut expected = BarcodeCollection::new();
        expected.add_interval(1, 2, 5);
        expected.add_interval(1, 3, 4);
        assert_eq!(barcode, expected);
        assert_eq!(
            PersistentHomology::with_window(Z2, window)
                .compute_intervals(&stream)
                .unwrap(),
            barcode
        );
    }

    #[test]
    fn test_augmented_generators() {
        let stream = zomorodian_carlsson();
        let dual = DualStream::new(&stream).unwrap();
        let field = ModularField::new(5).unwrap();
        let module = FreeModule::new(field);
        let barcode = PersistentCohomology::new(field)
            .compute_augmented_intervals(&stream)
            .unwrap();
        assert_eq!(barcode.len(), 5);
        for (dimension, interval, cochain) in barcode.iter() {
            assert!(cochain
                .elements()
                .all(|element| stream.dimension(element).unwrap() == dimension));
            let coboundary = coboundary_of(&module, &dual, cochain);
            match interval.death {
                // A surviving cocycle is a cocycle of the whole complex
                None => assert!(coboundary.is_empty()),
                // A killed cocycle is a cocycle until its death
                Some(death) => assert!(coboundary
                    .elements()
                    .all(|element| stream.filtration_value(element).unwrap() >= death)),
            }
        }
    }

    #[test]
    fn test_rejects_unfinalized_stream() {
        let mut stream = ExplicitStream::new();
        stream.add_element(0_usize, 0, vec![], 0_usize).unwrap();
        assert_eq!(
            PersistentCohomology::new(Z2).compute_intervals(&stream),
            Err(DualphError::StreamNotFinalized)
        );
    }
}
