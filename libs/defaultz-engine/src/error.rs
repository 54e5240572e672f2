use defaultz_api::{ErrorKind, FieldError};

/// Failure of an `apply_defaults` call.
///
/// Every variant is fatal to the traversal that raised it. Fields defaulted
/// before the failure keep their new values.
#[derive(Debug, thiserror::Error)]
pub enum DefaultsError {
    #[error("object must be a mutable reference to a record, got `{type_name}`")]
    InvalidInput { type_name: &'static str },

    #[error("type definition must not have cycles: `{type_name}`")]
    CyclicType { type_name: &'static str },

    #[error("{0}")]
    Misconfigured(String),

    /// Raised by the engine itself (extraction, shape, writability).
    #[error("{0}")]
    Field(FieldError),

    /// The only error reported by a converter chain that set nothing.
    #[error("failed to apply default value: {0}")]
    Conversion(FieldError),

    /// Several converters of one chain failed and none set a value.
    #[error("failed to apply default value: {} errors occurred:{}", .0.len(), render_list(.0))]
    Aggregate(Vec<FieldError>),
}

impl DefaultsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DefaultsError::InvalidInput { .. } => ErrorKind::InvalidInput,
            DefaultsError::CyclicType { .. } => ErrorKind::CyclicType,
            DefaultsError::Misconfigured(_) => ErrorKind::Misconfigured,
            DefaultsError::Field(e) | DefaultsError::Conversion(e) => e.kind,
            DefaultsError::Aggregate(errors) => errors
                .first()
                .map(|e| e.kind)
                .unwrap_or(ErrorKind::InvalidDefaultValue),
        }
    }

    /// Field-scoped errors carried by this error, if any.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            DefaultsError::Field(e) | DefaultsError::Conversion(e) => std::slice::from_ref(e),
            DefaultsError::Aggregate(errors) => errors,
            _ => &[],
        }
    }
}

fn render_list(errors: &[FieldError]) -> String {
    errors.iter().map(|e| format!("\n\t* {e}")).collect()
}

/// Failure to load a [`crate::config::DefaultzConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("bad config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
