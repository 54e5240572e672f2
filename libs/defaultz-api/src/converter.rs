use crate::error::FieldError;
use crate::kind::Kind;
use crate::shape::FieldDescriptor;
use crate::value::Value;

/// Populates fields of specific kinds from a raw default spec.
///
/// Converters are stateless and shared: one instance is registered once and
/// consulted for every field of the kinds it declares, in priority order
/// together with the other converters registered for that kind.
pub trait Converter: Send + Sync {
    /// Name used in error messages. By convention the crate prefix plus the
    /// type name, e.g. `defaultz.StringConverter`.
    fn name(&self) -> &str;

    /// Kinds this converter handles. For an optional field the kind of the
    /// wrapped type is used.
    fn kinds(&self) -> &[Kind];

    /// Parses `raw` and writes it into `target`.
    ///
    /// `path` is the path of the enclosing record. A converter writes at most
    /// once, and only when it reports `set`; optional targets are allocated
    /// by the converter itself (see [`crate::value::populate`]).
    fn convert(
        &self,
        raw: &str,
        path: &str,
        field: &FieldDescriptor,
        target: &mut dyn Value,
    ) -> Conversion;
}

/// Outcome of one converter in a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Whether the next converter in the chain should run.
    pub next: bool,
    /// Whether a value was written.
    pub set: bool,
    /// Why this converter could not handle the raw value.
    pub error: Option<FieldError>,
}

impl Conversion {
    /// A value was written; later converters still run.
    pub fn applied() -> Self {
        Self {
            next: true,
            set: true,
            error: None,
        }
    }

    /// Nothing written, no complaint.
    pub fn declined() -> Self {
        Self {
            next: true,
            set: false,
            error: None,
        }
    }

    /// Nothing written; the error is kept unless another converter sets a value.
    pub fn failed(error: FieldError) -> Self {
        Self {
            next: true,
            set: false,
            error: Some(error),
        }
    }

    /// Ends the chain after this converter.
    pub fn stop(mut self) -> Self {
        self.next = false;
        self
    }
}

impl From<Result<(), FieldError>> for Conversion {
    fn from(result: Result<(), FieldError>) -> Self {
        match result {
            Ok(()) => Conversion::applied(),
            Err(e) => Conversion::failed(e),
        }
    }
}
