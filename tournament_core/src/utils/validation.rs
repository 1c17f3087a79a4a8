//! Field-level validation errors for tournament/event/team setters. Entity
//! constructors and setters (`Tournament::validate`, `Event::validate`, the
//! Draw Plan Engine's `team_count` check) build these one field at a time
//! rather than bailing out on the first problem, so a caller can show every
//! bad field at once instead of playing whack-a-mole.

use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fmt::{self, Display},
};
use thiserror::Error;

/// Why a field failed validation. `Custom` covers anything this crate's
/// setters need beyond the two built-in shapes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum FieldErrorCode {
    Required,
    InvalidFormat,
    Custom(String),
}

impl FieldErrorCode {
    fn as_str(&self) -> &str {
        match self {
            FieldErrorCode::Required => "required",
            FieldErrorCode::InvalidFormat => "invalid_format",
            FieldErrorCode::Custom(c) => c,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    field: String,
    code: FieldErrorCode,
    message: String,
    params: HashMap<String, String>,
}

impl Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}: {}", self.field, self.code.as_str())?;
        } else {
            write!(f, "{}", self.message)?;
        }
        for (key, value) in self.params.iter() {
            write!(f, " [{key}={value}]")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldError {}

impl FieldError {
    pub fn field(&self) -> &str {
        &self.field
    }
    pub fn code(&self) -> &str {
        self.code.as_str()
    }
    pub fn message(&self) -> &str {
        &self.message
    }
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn builder() -> FieldErrorBuilder<Pending> {
        FieldErrorBuilder {
            field: Pending,
            code: FieldErrorCode::Custom(String::new()),
            message: String::new(),
            params: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Error, Default, Serialize, Deserialize, PartialEq, Eq)]
#[error("validation failed with {} error(s)", errors.len())]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl From<FieldError> for ValidationErrors {
    fn from(value: FieldError) -> Self {
        Self { errors: vec![value] }
    }
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn push(&mut self, err: FieldError) {
        self.errors.push(err);
    }
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

pub type ValidationResult<T> = Result<T, ValidationErrors>;

/// Typestate markers: a [`FieldErrorBuilder`] can't reach `.done()` until a
/// field name has been attached.
pub struct Pending;
pub struct Targeted(String);

pub struct FieldErrorBuilder<S> {
    field: S,
    code: FieldErrorCode,
    message: String,
    params: HashMap<String, String>,
}

impl FieldErrorBuilder<Pending> {
    pub fn on(self, field: impl Into<String>) -> FieldErrorBuilder<Targeted> {
        FieldErrorBuilder {
            field: Targeted(field.into()),
            code: self.code,
            message: self.message,
            params: self.params,
        }
    }
}

impl FieldErrorBuilder<Targeted> {
    pub fn required(mut self) -> Self {
        self.code = FieldErrorCode::Required;
        self
    }
    pub fn invalid_format(mut self) -> Self {
        self.code = FieldErrorCode::InvalidFormat;
        self
    }
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = FieldErrorCode::Custom(code.into());
        self
    }
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
    pub fn detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
    pub fn done(self) -> FieldError {
        FieldError {
            field: self.field.0,
            code: self.code,
            message: self.message,
            params: self.params,
        }
    }
}
