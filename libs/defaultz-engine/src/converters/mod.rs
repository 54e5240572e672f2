//! Built-in converters.

mod collection;
mod duration;
mod element;
mod primitive;

use defaultz_api::{populate, Conversion, Converter, FieldDescriptor, FieldError, Scalar, Value};

pub use collection::{MapConverter, SeqConverter};
pub use duration::{parse_duration, DurationConverter, DurationError};
pub use primitive::{BoolConverter, FloatConverter, IntConverter, StringConverter, UintConverter};

use crate::registry::{Registry, PRIORITY_PRIMITIVE, PRIORITY_SECONDARY};

pub(crate) fn install(registry: &mut Registry) {
    registry
        .register(PRIORITY_PRIMITIVE, BoolConverter)
        .register(PRIORITY_PRIMITIVE, IntConverter)
        .register(PRIORITY_PRIMITIVE, UintConverter)
        .register(PRIORITY_PRIMITIVE, FloatConverter)
        .register(PRIORITY_PRIMITIVE, SeqConverter)
        .register(PRIORITY_PRIMITIVE, MapConverter)
        .register(PRIORITY_PRIMITIVE, StringConverter)
        // Durations share the integer chain; plain integers go first.
        .register(PRIORITY_SECONDARY, DurationConverter);
}

/// Writes a single parsed scalar into `target`, allocating optional storage.
fn store(
    converter: &dyn Converter,
    path: &str,
    field: &FieldDescriptor,
    target: &mut dyn Value,
    value: Scalar,
) -> Conversion {
    populate(target, &mut |slot| {
        slot.store(value.clone())
            .map_err(|msg| FieldError::invalid_value(path, field, msg).raised_by(converter.name()))
    })
    .into()
}
