use defaultz_api::{Conversion, Converter, FieldDescriptor, FieldError, Kind, Scalar, Value};

use super::store;

/// Accepts exactly `true` or `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolConverter;

impl Converter for BoolConverter {
    fn name(&self) -> &str {
        "defaultz.BoolConverter"
    }

    fn kinds(&self) -> &[Kind] {
        &[Kind::Bool]
    }

    fn convert(&self, raw: &str, path: &str, field: &FieldDescriptor, target: &mut dyn Value) -> Conversion {
        let value = match raw {
            "true" => true,
            "false" => false,
            _ => {
                return Conversion::failed(
                    FieldError::invalid_value(path, field, "invalid boolean value (not 'true' nor 'false')")
                        .raised_by(self.name()),
                );
            }
        };
        store(self, path, field, target, Scalar::Bool(value))
    }
}

/// Decimal signed integers, range-checked against the field's width.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntConverter;

impl Converter for IntConverter {
    fn name(&self) -> &str {
        "defaultz.IntConverter"
    }

    fn kinds(&self) -> &[Kind] {
        &Kind::SIGNED
    }

    fn convert(&self, raw: &str, path: &str, field: &FieldDescriptor, target: &mut dyn Value) -> Conversion {
        match raw.parse::<i64>() {
            Ok(value) => store(self, path, field, target, Scalar::Int(value)),
            Err(e) => Conversion::failed(FieldError::invalid_value(path, field, e.to_string()).raised_by(self.name())),
        }
    }
}

/// Decimal unsigned integers, range-checked against the field's width.
#[derive(Debug, Clone, Copy, Default)]
pub struct UintConverter;

impl Converter for UintConverter {
    fn name(&self) -> &str {
        "defaultz.UintConverter"
    }

    fn kinds(&self) -> &[Kind] {
        &Kind::UNSIGNED
    }

    fn convert(&self, raw: &str, path: &str, field: &FieldDescriptor, target: &mut dyn Value) -> Conversion {
        match raw.parse::<u64>() {
            Ok(value) => store(self, path, field, target, Scalar::Uint(value)),
            Err(e) => Conversion::failed(FieldError::invalid_value(path, field, e.to_string()).raised_by(self.name())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FloatConverter;

impl Converter for FloatConverter {
    fn name(&self) -> &str {
        "defaultz.FloatConverter"
    }

    fn kinds(&self) -> &[Kind] {
        &Kind::FLOAT
    }

    fn convert(&self, raw: &str, path: &str, field: &FieldDescriptor, target: &mut dyn Value) -> Conversion {
        match raw.parse::<f64>() {
            Ok(value) => store(self, path, field, target, Scalar::Float(value)),
            Err(e) => Conversion::failed(FieldError::invalid_value(path, field, e.to_string()).raised_by(self.name())),
        }
    }
}

/// Takes the raw default verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringConverter;

impl Converter for StringConverter {
    fn name(&self) -> &str {
        "defaultz.StringConverter"
    }

    fn kinds(&self) -> &[Kind] {
        &[Kind::Str]
    }

    fn convert(&self, raw: &str, path: &str, field: &FieldDescriptor, target: &mut dyn Value) -> Conversion {
        store(self, path, field, target, Scalar::Str(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use defaultz_api::ErrorKind;
    use pretty_assertions::assert_eq;

    use super::*;

    fn field<T: Value>() -> FieldDescriptor {
        FieldDescriptor {
            name: "Field",
            type_name: std::any::type_name::<T>(),
            shape: T::describe,
            tags: &[],
            writable: true,
        }
    }

    fn convert<T: Value + Default>(converter: &dyn Converter, raw: &str) -> (Conversion, T) {
        let mut target = T::default();
        let conversion = converter.convert(raw, "<root>", &field::<T>(), &mut target);
        (conversion, target)
    }

    #[test]
    fn bool_is_strict() {
        let (conversion, value) = convert::<bool>(&BoolConverter, "true");
        assert_eq!(conversion, Conversion::applied());
        assert!(value);

        for raw in ["1", "True", "yes", "t"] {
            let (conversion, value) = convert::<bool>(&BoolConverter, raw);
            assert!(!conversion.set, "{raw}");
            assert!(conversion.next);
            let err = conversion.error.unwrap();
            assert_eq!(err.kind, ErrorKind::InvalidDefaultValue);
            assert_eq!(err.message, "invalid boolean value (not 'true' nor 'false')");
            assert_eq!(err.converter.as_deref(), Some("defaultz.BoolConverter"));
            assert!(!value);
        }
    }

    #[test]
    fn ints_respect_width() {
        assert_eq!(convert::<i8>(&IntConverter, "-128").1, -128);
        assert_eq!(convert::<i64>(&IntConverter, "9223372036854775807").1, i64::MAX);

        let (conversion, value) = convert::<i8>(&IntConverter, "128");
        assert_eq!(conversion.error.unwrap().message, "value 128 out of range for i8");
        assert_eq!(value, 0);

        let (conversion, _) = convert::<i32>(&IntConverter, "1s");
        assert_eq!(conversion.error.unwrap().kind, ErrorKind::InvalidDefaultValue);
    }

    #[test]
    fn uints_reject_negatives() {
        assert_eq!(convert::<u16>(&UintConverter, "65535").1, u16::MAX);
        let (conversion, value) = convert::<u32>(&UintConverter, "-1");
        assert!(conversion.error.is_some());
        assert_eq!(value, 0);
    }

    #[test]
    fn floats() {
        assert_eq!(convert::<f64>(&FloatConverter, "123.456").1, 123.456);
        assert_eq!(convert::<f32>(&FloatConverter, "2.5").1, 2.5);
        assert!(convert::<f32>(&FloatConverter, "1e39").0.error.is_some());
        assert!(convert::<f64>(&FloatConverter, "abc").0.error.is_some());
    }

    #[test]
    fn strings_are_verbatim() {
        assert_eq!(convert::<String>(&StringConverter, " a, b ").1, " a, b ");
    }

    #[test]
    fn optional_targets_are_allocated_on_success_only() {
        let (_, value) = convert::<Option<u8>>(&UintConverter, "7");
        assert_eq!(value, Some(7));

        let (conversion, value) = convert::<Option<u8>>(&UintConverter, "700");
        assert!(conversion.error.is_some());
        assert_eq!(value, None);
    }
}
