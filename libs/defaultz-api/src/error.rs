use std::fmt;

use crate::shape::FieldDescriptor;

/// Error kind for defaulting failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Root value is not a record.
    InvalidInput,
    /// The static type graph is self-referential.
    CyclicType,
    /// The registry lacks an extractor or converters.
    Misconfigured,
    CannotExtractDefault,
    /// A converter rejected the raw string as malformed.
    InvalidDefaultValue,
    /// A sequence or map element failed to parse.
    InvalidDefaultValueItem,
    /// A map key failed to parse.
    InvalidDefaultValueKey,
    NotSupported,
    CannotSetField,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::CyclicType => "cyclic type",
            ErrorKind::Misconfigured => "misconfigured registry",
            ErrorKind::CannotExtractDefault => "cannot extract default value",
            ErrorKind::InvalidDefaultValue => "invalid default value",
            ErrorKind::InvalidDefaultValueItem => "invalid default value item",
            ErrorKind::InvalidDefaultValueKey => "invalid default value key",
            ErrorKind::NotSupported => "not supported",
            ErrorKind::CannotSetField => "cannot set field",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure scoped to one field: what went wrong, where, and (optionally)
/// which converter raised it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub kind: ErrorKind,
    pub converter: Option<String>,
    /// Path of the enclosing record, from the root.
    pub path: String,
    pub field: &'static str,
    pub type_name: &'static str,
    pub tags: String,
    pub message: String,
}

impl FieldError {
    pub fn new(
        kind: ErrorKind,
        path: &str,
        field: &FieldDescriptor,
        msg: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            converter: None,
            path: path.to_string(),
            field: field.name,
            type_name: field.type_name,
            tags: field.render_tags(),
            message: msg.into(),
        }
    }

    pub fn invalid_value(path: &str, field: &FieldDescriptor, msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidDefaultValue, path, field, msg)
    }

    pub fn invalid_item(path: &str, field: &FieldDescriptor, msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidDefaultValueItem, path, field, msg)
    }

    pub fn invalid_key(path: &str, field: &FieldDescriptor, msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidDefaultValueKey, path, field, msg)
    }

    /// Attribute the error to a converter.
    pub fn raised_by(mut self, converter: &str) -> Self {
        self.converter = Some(converter.to_string());
        self
    }

    /// Full dotted path of the offending field.
    pub fn field_path(&self) -> String {
        format!("{}.{}", self.path, self.field)
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(converter) = &self.converter {
            write!(f, "({converter}): ")?;
        }
        write!(
            f,
            "{} - {}, path:'{}', field:'{} {} `{}`'",
            self.kind,
            self.message,
            self.field_path(),
            self.field,
            self.type_name,
            self.tags
        )
    }
}

impl std::error::Error for FieldError {}
