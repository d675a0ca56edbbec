//! Uniform outcome of every record validator

use serde_derive::Serialize;

use crate::dns::errors::{ZoneError, ZoneResult};

/// Success or failure of a validation, with any warnings collected on the way
///
/// Only the constructors below create a result. After construction the only
/// permitted change is appending warnings, and the payload is reachable only
/// when the result is valid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult<T> {
    valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
    data: Option<T>,
}

impl<T> ValidationResult<T> {
    pub fn success(data: T) -> Self {
        Self::success_with_warnings(data, Vec::new())
    }

    pub fn success_with_warnings(data: T, warnings: Vec<String>) -> Self {
        ValidationResult {
            valid: true,
            errors: Vec::new(),
            warnings,
            data: Some(data),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self::failure_with_warnings(error, Vec::new())
    }

    pub fn failure_with_warnings(error: impl Into<String>, warnings: Vec<String>) -> Self {
        Self::from_errors_with_warnings(vec![error.into()], warnings)
    }

    pub fn from_errors(errors: Vec<String>) -> Self {
        Self::from_errors_with_warnings(errors, Vec::new())
    }

    pub fn from_errors_with_warnings(errors: Vec<String>, warnings: Vec<String>) -> Self {
        ValidationResult {
            valid: false,
            errors,
            warnings,
            data: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// First error message, or an empty string when there is none
    pub fn first_error(&self) -> &str {
        self.errors.first().map(String::as_str).unwrap_or("")
    }

    /// Payload of a successful validation
    pub fn data(&self) -> ZoneResult<&T> {
        match (&self.data, self.valid) {
            (Some(data), true) => Ok(data),
            _ => Err(self.illegal_access()),
        }
    }

    pub fn into_data(self) -> ZoneResult<T> {
        if !self.valid {
            return Err(self.illegal_access());
        }
        let err = self.illegal_access();
        self.data.ok_or(err)
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn first_warning(&self) -> &str {
        self.warnings.first().map(String::as_str).unwrap_or("")
    }

    pub fn add_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn add_warnings<I, S>(mut self, warnings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.warnings.extend(warnings.into_iter().map(Into::into));
        self
    }

    /// Transform the payload of a successful result, keeping the warnings
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ValidationResult<U> {
        ValidationResult {
            valid: self.valid,
            errors: self.errors,
            warnings: self.warnings,
            data: self.data.map(f),
        }
    }

    /// Re-type a failed result so it can be returned from another validator
    pub(crate) fn cast_failure<U>(self) -> ValidationResult<U> {
        debug_assert!(!self.valid);
        ValidationResult::from_errors_with_warnings(self.errors, self.warnings)
    }

    fn illegal_access(&self) -> ZoneError {
        ZoneError::IllegalState(format!(
            "cannot read data of a failed validation: {}",
            self.first_error()
        ))
    }
}
