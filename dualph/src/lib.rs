//! Persistent homology and cohomology of filtered chain complexes.
//!
//! A caller provides a finalized [`FilteredStream`](streams::FilteredStream) and hands it to one of the engines in [`reduction`]:
//! * [`PersistentHomology`](reduction::PersistentHomology) computes the `R = D V` decomposition of the boundary matrix (pHcol);
//! * [`PersistentCohomology`](reduction::PersistentCohomology) runs the dual algorithm over live cocycles (pCoh).
//!
//! Both produce the same [`BarcodeCollection`](barcodes::BarcodeCollection) and can optionally attach a generating chain to every interval.
//! All arithmetic goes through the [`Field`](fields::Field) trait so that exact fields (`Z/p`, rationals) and numeric fields can be used interchangeably.

use thiserror::Error;

pub mod barcodes;
pub mod chains;
pub mod fields;
pub mod reduction;
pub mod streams;

/// Errors raised by arithmetic, stream construction and the reduction engines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DualphError {
    /// Attempted to invert (or divide by) the additive identity.
    #[error("division by the additive identity")]
    DivisionByZero,
    /// A reduction engine was handed a stream that has not been finalized.
    #[error("stream must be finalized before it is reduced")]
    StreamNotFinalized,
    /// Attempted to modify a stream after it was finalized.
    #[error("stream is finalized and can no longer be modified")]
    StreamFinalized,
    /// Two reduced columns claim the same pivot; this is a defect in the engine.
    #[error("internal consistency failure: pivot {pivot} is claimed by more than one column")]
    DuplicatePivot { pivot: String },
    #[error("{0} is not a prime modulus")]
    InvalidModulus(u32),
    #[error("dimension window [{min}, {max}] is empty")]
    InvalidDimensionWindow { min: usize, max: usize },
    #[error("{element} is not an element of the stream")]
    NotInStream { element: String },
    /// A boundary refers to a face that is missing, has the wrong dimension or enters the filtration after its coface.
    #[error("invalid boundary of {element}: face {face}")]
    InvalidBoundary { element: String, face: String },
}
