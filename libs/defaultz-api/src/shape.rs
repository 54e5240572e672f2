use std::any::TypeId;
use std::fmt;

use crate::kind::Kind;

/// Static description of a type, as seen by the engine.
///
/// Nested shapes are reached through `fn() -> Shape` so that a record may
/// refer to itself (through an `Option<Box<_>>`) without the description
/// itself being infinite.
#[derive(Clone, Copy)]
pub struct Shape {
    pub type_name: &'static str,
    pub type_id: TypeId,
    pub kind: Kind,
    pub def: Def,
}

/// Structural part of a [`Shape`].
#[derive(Clone, Copy)]
pub enum Def {
    Scalar,
    Optional(fn() -> Shape),
    Seq(fn() -> Shape),
    Array { element: fn() -> Shape, len: usize },
    Map { key: fn() -> Shape, value: fn() -> Shape },
    Record(&'static [FieldDescriptor]),
    Dynamic,
}

impl Shape {
    pub fn scalar<T: 'static>(kind: Kind) -> Self {
        Self::with_def::<T>(kind, Def::Scalar)
    }

    pub fn with_def<T: 'static>(kind: Kind, def: Def) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
            kind,
            def,
        }
    }

    pub fn record<T: 'static>(fields: &'static [FieldDescriptor]) -> Self {
        Self::with_def::<T>(Kind::Record, Def::Record(fields))
    }

    /// Inner shape of an optional wrapper.
    pub fn optional_inner(&self) -> Option<Shape> {
        match self.def {
            Def::Optional(inner) => Some(inner()),
            _ => None,
        }
    }

    /// Strips a single level of optional wrapping.
    pub fn deref(&self) -> Shape {
        self.optional_inner().unwrap_or(*self)
    }

    /// Kind after stripping one level of optional wrapping.
    pub fn effective_kind(&self) -> Kind {
        self.deref().kind
    }

    pub fn is_record(&self) -> bool {
        matches!(self.def, Def::Record(_))
    }

    /// `Option<Option<_>>`, possibly through `Box`.
    pub fn is_nested_optional(&self) -> bool {
        self.optional_inner()
            .is_some_and(|inner| inner.kind == Kind::Optional)
    }

    pub fn fields(&self) -> &'static [FieldDescriptor] {
        match self.def {
            Def::Record(fields) => fields,
            _ => &[],
        }
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("type_name", &self.type_name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// A field within its enclosing record: name, declared type and the raw
/// metadata attached to it via `#[tag(...)]`.
///
/// Generated by `#[derive(Record)]` into a static table, one entry per
/// field in declaration order.
#[derive(Clone, Copy)]
pub struct FieldDescriptor {
    pub name: &'static str,
    /// Declared type as written in the source, e.g. `Option<Vec<u16>>`.
    pub type_name: &'static str,
    pub shape: fn() -> Shape,
    /// `(tag name, raw value)` pairs in declaration order.
    pub tags: &'static [(&'static str, &'static str)],
    /// `false` for fields that are not `pub`.
    pub writable: bool,
}

impl FieldDescriptor {
    /// Raw value of the named tag; `None` if the field carries no such tag.
    pub fn tag(&self, name: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(tag, _)| *tag == name)
            .map(|(_, raw)| *raw)
    }

    pub fn shape(&self) -> Shape {
        (self.shape)()
    }

    /// Tags rendered the way a Go struct tag reads: `default:"1" json:"a"`.
    pub fn render_tags(&self) -> String {
        self.tags
            .iter()
            .map(|(tag, raw)| format!("{tag}:{raw:?}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("tags", &self.tags)
            .field("writable", &self.writable)
            .finish()
    }
}
