//! Error types raised while walking geometry documents.

use thiserror::Error;

/// Errors describing a geometry document the walkers cannot interpret.
///
/// `path` values use a compact index notation such as `coordinates[0][3]`
/// so callers can point users at the offending member.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum GeometryError {
    /// A point contained an ordinate that is not a JSON number.
    #[error("non-numeric ordinate at {path}")]
    NonNumericOrdinate {
        /// Location of the offending point.
        path: String,
    },
    /// A point had fewer than two ordinates.
    #[error("expected a point with at least two ordinates at {path}")]
    NotAPoint {
        /// Location of the offending point.
        path: String,
    },
    /// A point tree level was not a sequence where one was required.
    #[error("expected a nested coordinate sequence at {path}")]
    UnexpectedShape {
        /// Location of the offending member.
        path: String,
    },
    /// A computed ordinate was NaN or infinite and cannot be written back.
    #[error("non-finite ordinate produced at {path}")]
    NonFiniteOrdinate {
        /// Location of the offending point.
        path: String,
    },
    /// A topology document was structurally invalid.
    #[error("invalid topology: {reason}")]
    InvalidTopology {
        /// Human readable description of the defect.
        reason: String,
    },
    /// A topology geometry referenced an arc that does not exist.
    #[error("topology arc index {index} is out of range")]
    ArcOutOfRange {
        /// The arc reference as written in the document.
        index: i64,
    },
}

impl GeometryError {
    pub(crate) fn invalid_topology(reason: impl Into<String>) -> Self {
        Self::InvalidTopology {
            reason: reason.into(),
        }
    }
}
