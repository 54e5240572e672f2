//! Static cycle detection over record shapes.
//!
//! A record type that can reach itself through its fields (one optional
//! level at a time, or through fixed-size arrays of records) would make
//! auto-vivifying traversal endless, so such types are rejected before any
//! field is touched. Sequences, maps, dynamic values and arrays of anything
//! but records are not descended into: the traversal never recurses through
//! them either.

use std::any::TypeId;
use std::collections::HashSet;

use defaultz_api::{Def, Shape};

/// Whether the type graph reachable from `shape` contains a cycle.
pub fn has_cycle(shape: &Shape) -> bool {
    detect(shape, &mut HashSet::new())
}

fn detect(shape: &Shape, visiting: &mut HashSet<TypeId>) -> bool {
    let shape = shape.deref();
    if visiting.contains(&shape.type_id) {
        return true;
    }
    match shape.def {
        Def::Record(fields) => {
            visiting.insert(shape.type_id);
            let found = fields.iter().any(|field| detect(&field.shape(), visiting));
            visiting.remove(&shape.type_id);
            found
        }
        Def::Array { element, .. } => {
            let element = element();
            element.is_record() && detect(&element, visiting)
        }
        _ => false,
    }
}
