//! Error types for spectral analysis.

use thiserror::Error;

/// Errors that can occur deriving spectral quantities.
#[derive(Debug, Error)]
pub enum SpectralError {
    /// The adjacency matrix has no vertices.
    #[error("cannot decompose an empty matrix")]
    EmptyMatrix,

    /// The Laplacian has a complex eigenvalue; the real-valued
    /// decomposition this facility exposes does not apply.
    #[error("laplacian spectrum is not real (eigenvalue {index} has imaginary part {imaginary})")]
    ComplexSpectrum {
        /// Index of the offending eigenvalue.
        index: usize,
        /// Its imaginary part.
        imaginary: f64,
    },

    /// The underlying decomposition did not produce the requested factors.
    #[error("decomposition failed: {message}")]
    DecompositionFailed {
        /// What was missing.
        message: String,
    },
}
