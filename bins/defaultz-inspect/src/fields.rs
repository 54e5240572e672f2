//! Static listing of a record's fields and their default specs.

use defaultz_api::{Def, Kind, Shape};
use defaultz_engine::Extractor;
use serde::Serialize;

use crate::InspectError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldInfo {
    pub path: String,
    pub kind: Kind,
    #[serde(rename = "type")]
    pub type_name: &'static str,
    pub writable: bool,
    pub default: Option<String>,
}

/// Every field reachable from `root`, depth first in declaration order.
///
/// Nested records are listed through their own fields, the way defaults are
/// applied to them. `root` must not be a cyclic type.
pub fn list(root: &Shape, extractor: &dyn Extractor) -> Result<Vec<FieldInfo>, InspectError> {
    let mut out = Vec::new();
    collect(root, root.type_name, true, extractor, &mut out)?;
    Ok(out)
}

fn collect(
    shape: &Shape,
    path: &str,
    writable: bool,
    extractor: &dyn Extractor,
    out: &mut Vec<FieldInfo>,
) -> Result<(), InspectError> {
    for field in shape.fields() {
        let field_path = format!("{path}.{}", field.name);
        let writable = writable && field.writable;
        let field_shape = field.shape();
        let inner = field_shape.deref();

        if inner.is_record() {
            collect(&inner, &field_path, writable, extractor, out)?;
            continue;
        }
        if let Def::Array { element, len } = inner.def {
            let element = element();
            if element.is_record() {
                for index in 0..len {
                    collect(&element, &format!("{field_path}[{index}]"), writable, extractor, out)?;
                }
                continue;
            }
        }

        out.push(FieldInfo {
            path: field_path,
            kind: field_shape.effective_kind(),
            type_name: field.type_name,
            writable,
            default: extractor.extract_default(field)?,
        });
    }
    Ok(())
}
