use defaultz_api::{populate, Conversion, Converter, ErrorKind, FieldDescriptor, FieldError, Kind, Slot, Value};

use super::element::parse_into;

/// Whitespace-separated elements: `"1 2 3"`.
///
/// Elements must be scalars. A default with no elements leaves the field alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeqConverter;

impl Converter for SeqConverter {
    fn name(&self) -> &str {
        "defaultz.SeqConverter"
    }

    fn kinds(&self) -> &[Kind] {
        &[Kind::Seq]
    }

    fn convert(&self, raw: &str, path: &str, field: &FieldDescriptor, target: &mut dyn Value) -> Conversion {
        let items: Vec<&str> = raw.split_whitespace().collect();
        if items.is_empty() {
            return Conversion::declined();
        }
        let name = self.name();
        populate(target, &mut |slot| {
            let storage = slot.name();
            let Slot::Seq(seq) = slot else {
                return Err(wrong_storage(path, field, storage).raised_by(name));
            };
            seq.rebuild(items.len(), &mut |index, item| {
                parse_into(items[index], item)
                    .map_err(|msg| FieldError::invalid_item(path, field, msg).raised_by(name))
            })
        })
        .into()
    }
}

/// Whitespace-separated `key:value` pairs: `"a:1 b:2"`.
///
/// Tokens without a colon are skipped; the value is everything after the
/// first colon. Later duplicates of a key win.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapConverter;

impl Converter for MapConverter {
    fn name(&self) -> &str {
        "defaultz.MapConverter"
    }

    fn kinds(&self) -> &[Kind] {
        &[Kind::Map]
    }

    fn convert(&self, raw: &str, path: &str, field: &FieldDescriptor, target: &mut dyn Value) -> Conversion {
        let pairs: Vec<(&str, &str)> = raw
            .split_whitespace()
            .filter_map(|token| token.split_once(':'))
            .collect();
        if pairs.is_empty() {
            return Conversion::declined();
        }
        let name = self.name();
        populate(target, &mut |slot| {
            let storage = slot.name();
            let Slot::Map(map) = slot else {
                return Err(wrong_storage(path, field, storage).raised_by(name));
            };
            map.rebuild(pairs.len(), &mut |index, key, value| {
                let (raw_key, raw_value) = pairs[index];
                parse_into(raw_key, key)
                    .map_err(|msg| FieldError::invalid_key(path, field, msg).raised_by(name))?;
                parse_into(raw_value, value)
                    .map_err(|msg| FieldError::invalid_item(path, field, msg).raised_by(name))
            })
        })
        .into()
    }
}

fn wrong_storage(path: &str, field: &FieldDescriptor, storage: &str) -> FieldError {
    FieldError::new(
        ErrorKind::NotSupported,
        path,
        field,
        format!("cannot write a collection into {storage} storage"),
    )
}
