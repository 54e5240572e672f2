use std::fmt;

use defaultz_api::{ErrorKind, FieldDescriptor, FieldError, Record, Shape, Slot, Value};

use crate::cycle;
use crate::error::DefaultsError;
use crate::extractor::Extractor;
use crate::registry::{Prioritized, Registry};

/// Path of the root record in error messages when its type has no name.
const ANONYMOUS_ROOT: &str = "<root>";

pub(crate) fn apply(registry: &Registry, target: &mut dyn Value) -> Result<(), DefaultsError> {
    let shape = target.shape();
    let Slot::Record(record) = target.slot() else {
        return Err(DefaultsError::InvalidInput {
            type_name: shape.type_name,
        });
    };

    if cycle::has_cycle(&shape) {
        return Err(DefaultsError::CyclicType {
            type_name: shape.type_name,
        });
    }

    let extractor = registry
        .extractor()
        .ok_or_else(|| DefaultsError::Misconfigured("default extractor is not set".into()))?;
    if registry.is_empty() {
        return Err(DefaultsError::Misconfigured("no converters are registered".into()));
    }

    let path = root_path(&shape);
    tracing::trace!(root = %path, "applying defaults");
    Walker {
        registry,
        extractor,
    }
    .walk_record(record, path, true)
}

fn root_path(shape: &Shape) -> &'static str {
    if shape.type_name.is_empty() {
        ANONYMOUS_ROOT
    } else {
        shape.type_name
    }
}

/// `path.field`, rendered only when logged or recursed into.
#[derive(Clone, Copy)]
struct FieldPath<'a> {
    path: &'a str,
    field: &'a str,
}

impl fmt::Display for FieldPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.path, self.field)
    }
}

struct Walker<'r> {
    registry: &'r Registry,
    extractor: &'r dyn Extractor,
}

impl Walker<'_> {
    /// `writable` is false once any enclosing field is not writable.
    fn walk_record(
        &self,
        record: &mut dyn Record,
        path: &str,
        writable: bool,
    ) -> Result<(), DefaultsError> {
        let fields = record.fields();
        for (index, field) in fields.iter().enumerate() {
            let Some(value) = record.field_mut(index) else {
                continue;
            };
            self.walk_field(field, value, path, writable && field.writable)?;
        }
        Ok(())
    }

    fn walk_field(
        &self,
        field: &FieldDescriptor,
        value: &mut dyn Value,
        path: &str,
        writable: bool,
    ) -> Result<(), DefaultsError> {
        let field_path = FieldPath {
            path,
            field: field.name,
        };

        if self.descend(field, value, field_path, writable)? {
            return Ok(());
        }

        if !value.is_zero() {
            tracing::trace!(path = %field_path, "field already set");
            return Ok(());
        }

        let raw = match self.extractor.extract_default(field) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(()),
            Err(e) => {
                return Err(DefaultsError::Field(FieldError::new(
                    ErrorKind::CannotExtractDefault,
                    path,
                    field,
                    e.to_string(),
                )));
            }
        };

        let shape = field.shape();
        if shape.is_nested_optional() {
            return Err(DefaultsError::Field(FieldError::new(
                ErrorKind::NotSupported,
                path,
                field,
                "nested optional is not allowed",
            )));
        }

        let kind = shape.effective_kind();
        let chain = self.registry.chain(kind);
        if chain.is_empty() {
            return Err(DefaultsError::Field(FieldError::new(
                ErrorKind::NotSupported,
                path,
                field,
                format!("no converters found for kind '{kind}'"),
            )));
        }

        if !writable {
            return self.unwritable(field, field_path);
        }

        self.run_chain(chain, &raw, path, field, value)?;
        tracing::trace!(path = %field_path, default = %raw, "default applied");
        Ok(())
    }

    /// Recurses into nested records. Returns whether the field was one.
    ///
    /// An unset optional record is allocated first, so defaults inside it
    /// apply. Fixed-size arrays of records are walked element by element.
    fn descend(
        &self,
        field: &FieldDescriptor,
        value: &mut dyn Value,
        field_path: FieldPath<'_>,
        writable: bool,
    ) -> Result<bool, DefaultsError> {
        match value.slot() {
            Slot::Record(record) => {
                self.walk_record(record, &field_path.to_string(), writable)?;
                Ok(true)
            }
            Slot::Optional(optional) if optional.inner_shape().is_record() => {
                if optional.is_none() {
                    if !writable {
                        self.unwritable(field, field_path)?;
                        return Ok(true);
                    }
                    tracing::trace!(path = %field_path, "allocating nested record");
                }
                if let Slot::Record(record) = optional.get_or_insert_default().slot() {
                    self.walk_record(record, &field_path.to_string(), writable)?;
                }
                Ok(true)
            }
            Slot::Array(array) if array.element().is_record() => {
                for index in 0..array.len() {
                    let Some(item) = array.get_mut(index) else {
                        continue;
                    };
                    if let Slot::Record(record) = item.slot() {
                        self.walk_record(record, &format!("{field_path}[{index}]"), writable)?;
                    }
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn unwritable(
        &self,
        field: &FieldDescriptor,
        field_path: FieldPath<'_>,
    ) -> Result<(), DefaultsError> {
        if self.registry.ignores_unsettable() {
            tracing::debug!(path = %field_path, "skipping field that cannot be set");
            return Ok(());
        }
        Err(DefaultsError::Field(FieldError::new(
            ErrorKind::CannotSetField,
            field_path.path,
            field,
            "cannot set field",
        )))
    }

    /// Runs converters in priority order until one asks to stop.
    ///
    /// Errors only surface when no converter in the chain set a value.
    fn run_chain(
        &self,
        chain: &[Prioritized],
        raw: &str,
        path: &str,
        field: &FieldDescriptor,
        value: &mut dyn Value,
    ) -> Result<(), DefaultsError> {
        let mut errors = Vec::new();
        let mut set = false;
        for entry in chain {
            let conversion = entry.converter.convert(raw, path, field, value);
            if let Some(error) = conversion.error {
                tracing::debug!(
                    converter = entry.converter.name(),
                    error = %error,
                    "converter rejected default"
                );
                errors.push(error);
            }
            set |= conversion.set;
            if !conversion.next {
                break;
            }
        }

        if set {
            return Ok(());
        }
        match errors.len() {
            0 => Ok(()),
            1 => Err(DefaultsError::Conversion(errors.remove(0))),
            _ => Err(DefaultsError::Aggregate(errors)),
        }
    }
}
