use crate::shape::FieldDescriptor;
use crate::value::Value;

/// A composite value with named fields, walked field by field.
///
/// Generated by `#[derive(Record)]`; the field table is a static built once
/// per type, so descriptors are never allocated during a walk.
pub trait Record: Value {
    /// Field descriptors in declaration order.
    fn fields(&self) -> &'static [FieldDescriptor];

    /// Mutable access to the field at `index` (declaration order).
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Value>;
}
