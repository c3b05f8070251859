//! Standard filtered simplicial complexes, all finalized and with [`usize`] filtration values.
//!
//! Unless stated otherwise every simplex enters at time 0.

use crate::{SimplexStream, SimplicialError};

type ExampleResult = Result<SimplexStream<usize>, SimplicialError>;

/// The full `dimension`-simplex on vertices `0..=dimension`, together with all of its faces.
pub fn full_simplex(dimension: usize) -> ExampleResult {
    let mut stream = SimplexStream::new();
    stream.add_simplex(0..=dimension, 0)?;
    stream.ensure_all_faces()?;
    stream.finalize()?;
    Ok(stream)
}

/// The filled triangle: 3 vertices, 3 edges and the 2-cell.
pub fn triangle() -> ExampleResult {
    full_simplex(2)
}

/// The solid tetrahedron with all of its faces.
pub fn tetrahedron() -> ExampleResult {
    full_simplex(3)
}

/// The boundary of the `(dimension + 1)`-simplex, a triangulated `dimension`-sphere.
pub fn simplicial_sphere(dimension: usize) -> ExampleResult {
    let mut stream = SimplexStream::new();
    let top = stream.add_simplex(0..=dimension + 1, 0)?;
    stream.ensure_all_faces()?;
    stream.remove_simplex(&top)?;
    stream.finalize()?;
    Ok(stream)
}

/// A cycle on the vertices `0..m`.
pub fn circle(m: usize) -> ExampleResult {
    if m < 3 {
        return Err(SimplicialError::CircleTooSmall(m));
    }
    let mut stream = SimplexStream::new();
    for i in 0..m {
        stream.add_simplex([i], 0)?;
    }
    for i in 0..m {
        stream.add_simplex([i, (i + 1) % m], 0)?;
    }
    stream.finalize()?;
    Ok(stream)
}

/// The 9 vertex torus, obtained by cutting each square of a 3 by 3 grid with periodic boundary into two triangles.
pub fn torus() -> ExampleResult {
    let vertex = |i: usize, j: usize| 3 * (i % 3) + (j % 3);
    let mut stream = SimplexStream::new();
    for i in 0..3 {
        for j in 0..3 {
            stream.add_simplex([vertex(i, j), vertex(i + 1, j), vertex(i + 1, j + 1)], 0)?;
            stream.add_simplex([vertex(i, j), vertex(i, j + 1), vertex(i + 1, j + 1)], 0)?;
        }
    }
    stream.ensure_all_faces()?;
    stream.finalize()?;
    Ok(stream)
}

/// The running example of Zomorodian and Carlsson, "Computing persistent homology".
pub fn zomorodian_carlsson() -> ExampleResult {
    let mut stream = SimplexStream::new();
    stream.add_simplex([0], 0)?;
    stream.add_simplex([1], 0)?;

    stream.add_simplex([2], 1)?;
    stream.add_simplex([3], 1)?;
    stream.add_simplex([0, 1], 1)?;
    stream.add_simplex([1, 2], 1)?;

    stream.add_simplex([2, 3], 2)?;
    stream.add_simplex([3, 0], 2)?;

    stream.add_simplex([0, 2], 3)?;

    stream.add_simplex([0, 1, 2], 4)?;

    stream.add_simplex([0, 2, 3], 5)?;

    stream.finalize()?;
    Ok(stream)
}

/// A triangle whose simplices enter one at a time, at times 1 to 7.
pub fn filtered_triangle() -> ExampleResult {
    let mut stream = SimplexStream::new();
    stream.add_simplex([1], 1)?;
    stream.add_simplex([2], 2)?;
    stream.add_simplex([3], 3)?;
    stream.add_simplex([1, 2], 4)?;
    stream.add_simplex([2, 3], 5)?;
    stream.add_simplex([1, 3], 6)?;
    stream.add_simplex([1, 2, 3], 7)?;
    stream.finalize()?;
    Ok(stream)
}
