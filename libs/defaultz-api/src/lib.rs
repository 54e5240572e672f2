//! Type descriptions, storage access and the converter interface for
//! `defaultz`.
//!
//! Records opt in with `#[derive(Record)]`; converters implement
//! [`Converter`] and write through the [`Slot`] a field hands out.

extern crate self as defaultz_api;

pub mod converter;
pub mod error;
pub mod kind;
pub mod record;
pub mod shape;
pub mod value;

pub use defaultz_derive::Record;

pub use converter::{Conversion, Converter};
pub use error::{ErrorKind, FieldError};
pub use kind::Kind;
pub use record::Record;
pub use shape::{Def, FieldDescriptor, Shape};
pub use value::{ArrayValue, MapValue, OptionalValue, Scalar, SeqValue, Slot, Value, populate};
