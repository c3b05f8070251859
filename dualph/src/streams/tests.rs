// ======== Tests ==============================================

use std::cmp::Ordering;

use crate::chains::FreeModule;
use crate::fields::Z2;
use crate::DualphError;

use super::adaptors::DualStream;
use super::implementors::ExplicitStream;
use super::FilteredStream;

// A filled triangle whose edges and face arrive at different times
//   vertices 0, 1, 2 at time 0
//   edges 3 = [0, 1] and 4 = [1, 2] at time 1, 5 = [0, 2] at time 2
//   face 6 = [3, 4, 5] at time 3
pub(crate) fn filtered_triangle() -> ExplicitStream<usize, usize> {
    ExplicitStream::from_cells(vec![
        (6, 2, vec![(1, 4), (-1, 5), (1, 3)], 3),
        (0, 0, vec![], 0),
        (1, 0, vec![], 0),
        (2, 0, vec![], 0),
        (5, 1, vec![(1, 2), (-1, 0)], 2),
        (3, 1, vec![(1, 1), (-1, 0)], 1),
        (4, 1, vec![(1, 2), (-1, 1)], 1),
    ])
    .unwrap()
}

// The example from Zomorodian and Carlsson, "Computing persistent homology"
//   vertices a = 0, b = 1 at time 0 and c = 2, d = 3 at time 1
//   edges ab = 4, bc = 5 at time 1, cd = 6, ad = 7 at time 2, ac = 8 at time 3
//   faces abc = 9 at time 4, acd = 10 at time 5
pub(crate) fn zomorodian_carlsson() -> ExplicitStream<usize, usize> {
    ExplicitStream::from_cells(vec![
        (0, 0, vec![], 0),
        (1, 0, vec![], 0),
        (2, 0, vec![], 1),
        (3, 0, vec![], 1),
        (4, 1, vec![(1, 1), (-1, 0)], 1),
        (5, 1, vec![(1, 2), (-1, 1)], 1),
        (6, 1, vec![(1, 3), (-1, 2)], 2),
        (7, 1, vec![(1, 3), (-1, 0)], 2),
        (8, 1, vec![(1, 2), (-1, 0)], 3),
        (9, 2, vec![(1, 5), (-1, 8), (1, 4)], 4),
        (10, 2, vec![(1, 6), (-1, 7), (1, 8)], 5),
    ])
    .unwrap()
}

#[test]
fn test_finalize_orders_elements() {
    let stream = filtered_triangle();
    let order: Vec<_> = stream.elements().copied().collect();
    assert_eq!(order, vec![0, 1, 2, 3, 4, 5, 6]);
    assert_eq!(stream.size(), 7);
    assert_eq!(stream.max_filtration_index(), Some(3));
    assert_eq!(stream.filtration_index(&4), Ok(1));
    assert_eq!(stream.filtration_value(&5), Ok(2));
    assert_eq!(stream.dimension(&6), Ok(2));
    let dim_one: Vec<_> = stream.elements_of_dimension(1).copied().collect();
    assert_eq!(dim_one, vec![3, 4, 5]);
}

#[test]
fn test_indices_are_dense() {
    let stream =
        ExplicitStream::from_cells(vec![(0_usize, 0, vec![], 10_usize), (1, 0, vec![], 40)])
            .unwrap();
    assert_eq!(stream.filtration_index(&0), Ok(0));
    assert_eq!(stream.filtration_index(&1), Ok(1));
}

#[test]
fn test_faces_precede_cofaces() {
    // Cofaces with smaller labels must still come after their faces
    let stream = ExplicitStream::from_cells(vec![
        (0_usize, 1, vec![(1, 1), (-1, 2)], 0_usize),
        (1, 0, vec![], 0),
        (2, 0, vec![], 0),
    ])
    .unwrap();
    let order: Vec<_> = stream.elements().copied().collect();
    assert_eq!(order, vec![1, 2, 0]);
    assert_eq!(stream.comparator().compare(&0, &1), Ordering::Greater);
}

#[test]
fn test_readding_replaces() {
    let mut stream = ExplicitStream::new();
    stream.add_element(0_usize, 0, vec![], 5_usize).unwrap();
    stream.add_element(0_usize, 0, vec![], 2_usize).unwrap();
    assert_eq!(stream.size(), 1);
    assert_eq!(stream.filtration_value(&0), Ok(2));
    assert_eq!(stream.remove_element(&0), Ok(true));
    assert_eq!(stream.remove_element(&0), Ok(false));
}

#[test]
fn test_finalized_stream_is_immutable() {
    let mut stream = filtered_triangle();
    assert!(stream.is_finalized());
    assert_eq!(
        stream.add_element(7, 0, vec![], 0),
        Err(DualphError::StreamFinalized)
    );
    assert_eq!(stream.remove_element(&0), Err(DualphError::StreamFinalized));
}

#[test]
fn test_index_requires_finalize() {
    let mut stream = ExplicitStream::new();
    stream.add_element(0_usize, 0, vec![], 0_usize).unwrap();
    assert_eq!(stream.elements().count(), 0);
    assert_eq!(
        stream.filtration_index(&0),
        Err(DualphError::StreamNotFinalized)
    );
    assert_eq!(
        DualStream::new(&stream).err(),
        Some(DualphError::StreamNotFinalized)
    );
}

#[test]
fn test_invalid_boundaries() {
    let missing_face = ExplicitStream::from_cells(vec![
        (0_usize, 0, vec![], 0_usize),
        (1, 1, vec![(1, 0), (-1, 2)], 0),
    ]);
    assert!(matches!(
        missing_face,
        Err(DualphError::InvalidBoundary { .. })
    ));

    let face_too_late = ExplicitStream::from_cells(vec![
        (0_usize, 0, vec![], 3_usize),
        (1, 0, vec![], 0),
        (2, 1, vec![(1, 0), (-1, 1)], 1),
    ]);
    assert!(matches!(
        face_too_late,
        Err(DualphError::InvalidBoundary { .. })
    ));

    let wrong_dimension = ExplicitStream::from_cells(vec![
        (0_usize, 0, vec![], 0_usize),
        (1, 2, vec![(1, 0)], 0),
    ]);
    assert!(matches!(
        wrong_dimension,
        Err(DualphError::InvalidBoundary { .. })
    ));
}

#[test]
fn test_unknown_element() {
    let stream = filtered_triangle();
    assert!(!stream.contains(&10));
    assert!(matches!(
        stream.dimension(&10),
        Err(DualphError::NotInStream { .. })
    ));
}

#[test]
fn test_dual_stream() {
    let stream = filtered_triangle();
    let dual = DualStream::new(&stream).unwrap();
    assert!(std::ptr::eq(dual.primal(), &stream));
    assert_eq!(dual.primal_comparator().compare(&3, &5), Ordering::Less);
    assert_eq!(dual.comparator().compare(&3, &5), Ordering::Greater);

    let order: Vec<_> = dual.elements().copied().collect();
    assert_eq!(order, vec![6, 5, 4, 3, 2, 1, 0]);
    assert_eq!(dual.filtration_index(&6), Ok(0));
    assert_eq!(dual.filtration_index(&0), Ok(3));
    assert_eq!(dual.filtration_value(&6), Ok(3));
    assert_eq!(dual.dimension(&6), Ok(2));
    assert_eq!(dual.compare_basis(&3, &4), Ordering::Greater);

    let indices: Vec<_> = dual
        .elements()
        .map(|e| dual.filtration_index(e).unwrap())
        .collect();
    assert!(indices.windows(2).all(|pair| pair[0] <= pair[1]));

    let module = FreeModule::new(Z2);
    let coboundary = module.create_sum(dual.boundary(&1).unwrap());
    assert_eq!(coboundary, module.create_sum(vec![(1, 3), (1, 4)]));
    assert_eq!(dual.boundary(&6).unwrap().count(), 0);
    // Signs carry over from the boundary
    let coefficients: Vec<_> = dual.boundary(&5).unwrap().collect();
    assert_eq!(coefficients, vec![(-1, 6)]);
}

#[test]
fn test_comparator_low_high() {
    let stream = filtered_triangle();
    let comparator = stream.comparator();
    let module = FreeModule::new(Z2);
    let chain = module.create_sum(vec![(1, 4_usize), (1, 0), (1, 5)]);
    assert_eq!(comparator.low(&chain), Some(&5));
    assert_eq!(comparator.high(&chain), Some(&0));
    assert_eq!(comparator.low(&module.create_new_sum()), None);
}
