use std::collections::HashMap;
use std::sync::Arc;

use defaultz_api::{Converter, Kind, Value};

use crate::config::DefaultzConfig;
use crate::converters;
use crate::error::DefaultsError;
use crate::extractor::{Extractor, TagExtractor};
use crate::walk;

/// Priority of the built-in scalar and collection converters.
pub const PRIORITY_PRIMITIVE: i32 = 1000;
/// Priority of the built-in converters that refine a primitive kind
/// (durations on top of integers).
pub const PRIORITY_SECONDARY: i32 = 2000;

/// A converter together with its place in the chain. Lower runs first.
#[derive(Clone)]
pub struct Prioritized {
    pub priority: i32,
    pub converter: Arc<dyn Converter>,
}

impl std::fmt::Debug for Prioritized {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prioritized")
            .field("priority", &self.priority)
            .field("converter", &self.converter.name())
            .finish()
    }
}

/// Converter chains per kind, the extractor, and traversal options.
///
/// Built once, then shared read-only: registration needs `&mut self`,
/// application only `&self`.
///
/// ```ignore
/// let mut registry = Registry::new()
///     .with_builtin_converters()
///     .with_extractor(TagExtractor::default());
/// registry.register(PRIORITY_SECONDARY, MyConverter);
/// registry.apply_defaults(&mut config)?;
/// ```
pub struct Registry {
    extractor: Option<Arc<dyn Extractor>>,
    chains: HashMap<Kind, Vec<Prioritized>>,
    ignore_unsettable: bool,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("has_extractor", &self.extractor.is_some())
            .field("chains", &self.chains)
            .field("ignore_unsettable", &self.ignore_unsettable)
            .finish()
    }
}

impl Registry {
    /// Empty registry: no converters, no extractor.
    pub fn new() -> Self {
        Self {
            extractor: None,
            chains: HashMap::new(),
            ignore_unsettable: false,
        }
    }

    /// Registry with the built-in converters and the extractor described by
    /// `config`.
    pub fn from_config(config: &DefaultzConfig) -> Self {
        Self::new()
            .with_builtin_converters()
            .with_extractor(config.extractor.clone())
            .with_ignore_unsettable(config.ignore_unsettable)
    }

    /// Registers the built-in converters: bool, integers, floats, strings,
    /// sequences and maps at [`PRIORITY_PRIMITIVE`], durations at
    /// [`PRIORITY_SECONDARY`].
    pub fn with_builtin_converters(mut self) -> Self {
        converters::install(&mut self);
        self
    }

    pub fn with_extractor(mut self, extractor: impl Extractor + 'static) -> Self {
        self.extractor = Some(Arc::new(extractor));
        self
    }

    /// Skip fields that cannot be written instead of failing.
    pub fn with_ignore_unsettable(mut self, ignore: bool) -> Self {
        self.ignore_unsettable = ignore;
        self
    }

    /// Adds `converter` to the chain of every kind it declares.
    ///
    /// Chains stay sorted by ascending priority; converters registered with
    /// equal priority keep registration order.
    pub fn register(&mut self, priority: i32, converter: impl Converter + 'static) -> &mut Self {
        self.register_shared(priority, Arc::new(converter))
    }

    /// Same as [`Registry::register`] for an already shared converter.
    pub fn register_shared(&mut self, priority: i32, converter: Arc<dyn Converter>) -> &mut Self {
        for &kind in converter.kinds() {
            let chain = self.chains.entry(kind).or_default();
            chain.push(Prioritized {
                priority,
                converter: Arc::clone(&converter),
            });
            // Stable: equal priorities keep insertion order.
            chain.sort_by_key(|entry| entry.priority);
        }
        tracing::debug!(
            converter = converter.name(),
            priority,
            kinds = ?converter.kinds(),
            "registered converter"
        );
        self
    }

    /// Converter chain for `kind`, in execution order.
    pub fn chain(&self, kind: Kind) -> &[Prioritized] {
        self.chains.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether no converter is registered at all.
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    pub fn extractor(&self) -> Option<&dyn Extractor> {
        self.extractor.as_deref()
    }

    pub fn ignores_unsettable(&self) -> bool {
        self.ignore_unsettable
    }

    /// Fills every unset, tagged field of `target` with its default.
    ///
    /// `target` must be a record. Fields that already hold a non-zero value
    /// are left alone, so applying twice is the same as applying once.
    pub fn apply_defaults(&self, target: &mut dyn Value) -> Result<(), DefaultsError> {
        walk::apply(self, target)
    }
}

/// Canonical registry: built-in converters and [`TagExtractor::default`].
pub(crate) fn builtin() -> Registry {
    Registry::new()
        .with_builtin_converters()
        .with_extractor(TagExtractor::default())
}
