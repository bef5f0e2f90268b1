//! Value-level error types.

use mex_reg::UnitError;
use thiserror::Error;

/// Errors raised by value arithmetic and broadcasting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    /// Operand kind or shape does not fit the operation
    #[error("{0}")]
    Type(String),

    /// Mathematically undefined result
    #[error("{0}")]
    Domain(String),

    /// Conversion names a unit the registry does not know
    #[error("unknown unit '{0}'")]
    UnknownUnit(String),
}

impl ValueError {
    pub fn type_error(message: impl Into<String>) -> Self {
        ValueError::Type(message.into())
    }

    pub fn domain(message: impl Into<String>) -> Self {
        ValueError::Domain(message.into())
    }
}

impl From<UnitError> for ValueError {
    fn from(err: UnitError) -> Self {
        match err {
            UnitError::UnknownUnit(name) => ValueError::UnknownUnit(name),
            incompatible @ UnitError::IncompatibleDimensions { .. } => {
                ValueError::Type(incompatible.to_string())
            }
        }
    }
}
