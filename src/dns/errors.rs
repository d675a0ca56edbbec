//! Error types for record validation, serial arithmetic and address conversion

use std::error::Error;
use std::fmt;

use crate::dns::repository::RepositoryError;

/// Error raised by the validation engine
///
/// Validators never return this for an ordinary format violation; they report
/// through [`ValidationResult`](crate::dns::validation_result::ValidationResult).
/// Converters used outside the pipeline (reverse names, serials) return it
/// directly.
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneError {
    /// Malformed textual input
    Format(FormatError),
    /// Well-formed value outside its RFC bound
    Range(RangeError),
    /// Cross-record invariant violated
    Conflict(ConflictError),
    /// Operation not permitted in the current state
    IllegalState(String),
    /// Collaborator failure
    Repository(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormatError {
    pub field: &'static str,
    pub input: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeError {
    pub field: &'static str,
    pub value: String,
    pub min: String,
    pub max: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConflictError {
    pub kind: ConflictKind,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// A CNAME would share its name with other records
    CnameNotUnique,
    /// A record would share its name with an existing CNAME
    CnameExists,
    /// A CNAME name is already the target of an MX or NS record
    CnameIsMxNsTarget,
    /// An MX or NS record would point at a CNAME
    TargetIsAlias,
}

impl ZoneError {
    pub fn format(field: &'static str, input: &str, reason: impl Into<String>) -> Self {
        ZoneError::Format(FormatError {
            field,
            input: input.to_string(),
            reason: reason.into(),
        })
    }

    pub fn range<V: fmt::Display>(field: &'static str, value: V, min: V, max: V) -> Self {
        ZoneError::Range(RangeError {
            field,
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        })
    }

    pub fn conflict(kind: ConflictKind, name: &str) -> Self {
        ZoneError::Conflict(ConflictError {
            kind,
            name: name.to_string(),
        })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ZoneError::Conflict(_))
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::CnameNotUnique => {
                write!(f, "This is not a valid CNAME. There already exists a record with this name")
            }
            ConflictKind::CnameExists => {
                write!(f, "This is not a valid record. There already exists a CNAME with this name")
            }
            ConflictKind::CnameIsMxNsTarget => {
                write!(f, "This is not a valid CNAME. An MX or NS record already points to this name")
            }
            ConflictKind::TargetIsAlias => {
                write!(f, "An NS or MX record can not point to a CNAME record")
            }
        }
    }
}

impl fmt::Display for ZoneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneError::Format(e) => {
                write!(f, "Invalid {} '{}': {}", e.field, e.input, e.reason)
            }
            ZoneError::Range(e) => write!(
                f,
                "The {} {} is out of range ({} to {})",
                e.field, e.value, e.min, e.max
            ),
            ZoneError::Conflict(e) => write!(f, "{} ({})", e.kind, e.name),
            ZoneError::IllegalState(msg) => write!(f, "Illegal state: {}", msg),
            ZoneError::Repository(msg) => write!(f, "Record lookup failed: {}", msg),
        }
    }
}

impl Error for ZoneError {}

impl From<RepositoryError> for ZoneError {
    fn from(err: RepositoryError) -> Self {
        ZoneError::Repository(err.to_string())
    }
}

/// Result type alias for engine operations
pub type ZoneResult<T> = Result<T, ZoneError>;
