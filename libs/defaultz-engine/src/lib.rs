//! Fills unset fields of records with defaults declared in field tags.
//!
//! ```ignore
//! use defaultz_api::Record;
//!
//! #[derive(Record, Default)]
//! pub struct Server {
//!     #[tag(default = "0.0.0.0")]
//!     pub host: String,
//!     #[tag(default = "8080")]
//!     pub port: u16,
//!     #[tag(default = "30s")]
//!     pub idle_timeout: std::time::Duration,
//! }
//!
//! let mut server = Server::default();
//! defaultz_engine::apply_defaults(&mut server)?;
//! ```
//!
//! Defaults are parsed by converters, chained per field kind in priority
//! order and kept in a [`Registry`]. The process-wide registry returned by
//! [`default_registry`] carries the built-in converters and reads the
//! `default` tag.

pub mod config;
pub mod converters;
pub mod cycle;
pub mod error;
pub mod extractor;
pub mod registry;
mod walk;

use std::sync::{Arc, LazyLock};

pub use config::DefaultzConfig;
pub use defaultz_api::{Conversion, Converter, ErrorKind, FieldError, Kind};
pub use error::{ConfigError, DefaultsError};
pub use extractor::{ExtractError, Extractor, TagExtractor};
pub use registry::{Prioritized, Registry, PRIORITY_PRIMITIVE, PRIORITY_SECONDARY};

static DEFAULT_REGISTRY: LazyLock<Arc<Registry>> = LazyLock::new(|| Arc::new(registry::builtin()));

/// Shared registry with the built-in converters and the canonical extractor
/// (tag `default`, no prefix, separator `,`).
pub fn default_registry() -> Arc<Registry> {
    Arc::clone(&DEFAULT_REGISTRY)
}

/// [`Registry::apply_defaults`] on the [`default_registry`].
pub fn apply_defaults(target: &mut dyn defaultz_api::Value) -> Result<(), DefaultsError> {
    DEFAULT_REGISTRY.apply_defaults(target)
}
