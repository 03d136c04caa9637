//! Error types shared by every core conversion.

/// Errors produced by the core conversions.
///
/// Every variant is local and recoverable: callers branch on it instead of
/// inspecting printed output. A cents magnitude of 99 or more is *not* an
/// error; it is reported as [`crate::tuning::TuningBand::Unclassified`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The text is not of the form `<letter>[accidental]<octave>`.
    #[error("malformed pitch name {0:?}")]
    Parse(String),

    /// The letter/accidental pair is in neither the sharp nor the flat table.
    #[error("pitch {0:?} is not in the sharp or flat note table")]
    UnknownPitch(String),

    /// A value outside the mathematical domain of the operation, such as a
    /// non-positive frequency passed to a logarithm.
    #[error("domain error: {0}")]
    Domain(String),

    /// A malformed line in a song description.
    #[error("song line {line}: {message}")]
    Format { line: usize, message: String },
}

/// Convenience result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Rejects frequencies a logarithm cannot take.
pub(crate) fn ensure_positive(freq: f64) -> Result<f64> {
    if freq.is_finite() && freq > 0.0 {
        Ok(freq)
    } else {
        Err(Error::Domain(format!(
            "frequency must be positive and finite, got {freq}"
        )))
    }
}
