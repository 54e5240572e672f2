use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::time::Duration;

use crate::error::FieldError;
use crate::kind::Kind;
use crate::record::Record;
use crate::shape::{Def, Shape};

/// A type whose storage the engine can inspect and write.
///
/// Implemented for the supported field types and generated for records by
/// `#[derive(Record)]`.
pub trait Value: 'static {
    /// Static shape of the implementing type.
    fn describe() -> Shape
    where
        Self: Sized;

    /// Same as [`Value::describe`], callable through `dyn Value`.
    fn shape(&self) -> Shape;

    /// Whether the value is its type's zero/empty value, i.e. still unset.
    fn is_zero(&self) -> bool;

    /// Typed mutable access to the storage.
    fn slot(&mut self) -> Slot<'_>;
}

/// Typed mutable reference to a value's storage.
pub enum Slot<'a> {
    Bool(&'a mut bool),
    I8(&'a mut i8),
    I16(&'a mut i16),
    I32(&'a mut i32),
    I64(&'a mut i64),
    Isize(&'a mut isize),
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    U64(&'a mut u64),
    Usize(&'a mut usize),
    F32(&'a mut f32),
    F64(&'a mut f64),
    Str(&'a mut String),
    Duration(&'a mut Duration),
    Optional(&'a mut dyn OptionalValue),
    Seq(&'a mut dyn SeqValue),
    Array(&'a mut dyn ArrayValue),
    Map(&'a mut dyn MapValue),
    Record(&'a mut dyn Record),
    Dynamic(&'a mut serde_json::Value),
}

/// A parsed scalar, ready to be stored into a [`Slot`].
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
    Duration(Duration),
}

impl Scalar {
    fn name(&self) -> &'static str {
        match self {
            Scalar::Bool(_) => "bool",
            Scalar::Int(_) => "signed integer",
            Scalar::Uint(_) => "unsigned integer",
            Scalar::Float(_) => "float",
            Scalar::Str(_) => "string",
            Scalar::Duration(_) => "duration",
        }
    }
}

impl Slot<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Slot::Bool(_) => "bool",
            Slot::I8(_) => "i8",
            Slot::I16(_) => "i16",
            Slot::I32(_) => "i32",
            Slot::I64(_) => "i64",
            Slot::Isize(_) => "isize",
            Slot::U8(_) => "u8",
            Slot::U16(_) => "u16",
            Slot::U32(_) => "u32",
            Slot::U64(_) => "u64",
            Slot::Usize(_) => "usize",
            Slot::F32(_) => "f32",
            Slot::F64(_) => "f64",
            Slot::Str(_) => "string",
            Slot::Duration(_) => "duration",
            Slot::Optional(_) => "optional",
            Slot::Seq(_) => "seq",
            Slot::Array(_) => "array",
            Slot::Map(_) => "map",
            Slot::Record(_) => "record",
            Slot::Dynamic(_) => "dynamic",
        }
    }

    /// Stores `value`, narrowing integers and floats to the slot's width.
    ///
    /// Fails without writing when the value does not fit or the slot holds
    /// a different kind of scalar.
    pub fn store(self, value: Scalar) -> Result<(), String> {
        match (self, value) {
            (Slot::Bool(slot), Scalar::Bool(v)) => *slot = v,
            (Slot::I8(slot), Scalar::Int(v)) => *slot = narrow(v)?,
            (Slot::I16(slot), Scalar::Int(v)) => *slot = narrow(v)?,
            (Slot::I32(slot), Scalar::Int(v)) => *slot = narrow(v)?,
            (Slot::I64(slot), Scalar::Int(v)) => *slot = v,
            (Slot::Isize(slot), Scalar::Int(v)) => *slot = narrow(v)?,
            (Slot::U8(slot), Scalar::Uint(v)) => *slot = narrow(v)?,
            (Slot::U16(slot), Scalar::Uint(v)) => *slot = narrow(v)?,
            (Slot::U32(slot), Scalar::Uint(v)) => *slot = narrow(v)?,
            (Slot::U64(slot), Scalar::Uint(v)) => *slot = v,
            (Slot::Usize(slot), Scalar::Uint(v)) => *slot = narrow(v)?,
            (Slot::F32(slot), Scalar::Float(v)) => {
                let narrowed = v as f32;
                if narrowed.is_infinite() && v.is_finite() {
                    return Err(format!("value {v} out of range for f32"));
                }
                *slot = narrowed;
            }
            (Slot::F64(slot), Scalar::Float(v)) => *slot = v,
            (Slot::Str(slot), Scalar::Str(v)) => *slot = v,
            (Slot::Duration(slot), Scalar::Duration(v)) => *slot = v,
            (Slot::Duration(slot), Scalar::Int(v)) => {
                let nanos = u64::try_from(v).map_err(|_| format!("negative duration {v}ns"))?;
                *slot = Duration::from_nanos(nanos);
            }
            (Slot::I64(slot), Scalar::Duration(v)) => {
                *slot = i64::try_from(v.as_nanos())
                    .map_err(|_| format!("duration {v:?} out of range for i64"))?;
            }
            (slot, value) => {
                return Err(format!(
                    "cannot store {} into {} storage",
                    value.name(),
                    slot.name()
                ));
            }
        }
        Ok(())
    }
}

fn narrow<S, T: TryFrom<S>>(v: S) -> Result<T, String>
where
    S: Copy + std::fmt::Display,
{
    T::try_from(v).map_err(|_| format!("value {v} out of range for {}", std::any::type_name::<T>()))
}

/// Runs `fill` against the storage behind `target`.
///
/// An unset optional target is allocated only if `fill` succeeds, so a
/// failed write leaves the target untouched.
pub fn populate(
    target: &mut dyn Value,
    fill: &mut dyn FnMut(Slot<'_>) -> Result<(), FieldError>,
) -> Result<(), FieldError> {
    match target.slot() {
        Slot::Optional(optional) => optional.populate(&mut |inner| fill(inner.slot())),
        slot => fill(slot),
    }
}

/// Storage of an optional value.
pub trait OptionalValue {
    fn inner_shape(&self) -> Shape;

    fn is_none(&self) -> bool;

    /// Allocates a zero value if empty and returns the inner storage.
    fn get_or_insert_default(&mut self) -> &mut dyn Value;

    /// Builds a fresh inner value, lets `fill` write it, and stores it on success.
    fn populate(
        &mut self,
        fill: &mut dyn FnMut(&mut dyn Value) -> Result<(), FieldError>,
    ) -> Result<(), FieldError>;
}

/// Storage of a variable-length sequence.
pub trait SeqValue {
    fn element(&self) -> Shape;

    /// Replaces the sequence with `len` elements written by `fill`.
    /// Nothing is stored if any element fails.
    fn rebuild(
        &mut self,
        len: usize,
        fill: &mut dyn FnMut(usize, &mut dyn Value) -> Result<(), FieldError>,
    ) -> Result<(), FieldError>;
}

/// Storage of a fixed-size array.
pub trait ArrayValue {
    fn element(&self) -> Shape;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Value>;
}

/// Storage of a key-to-value mapping.
pub trait MapValue {
    fn key(&self) -> Shape;

    fn value(&self) -> Shape;

    /// Replaces the mapping with `len` entries written by `fill`.
    /// Nothing is stored if any entry fails.
    fn rebuild(
        &mut self,
        len: usize,
        fill: &mut dyn FnMut(usize, &mut dyn Value, &mut dyn Value) -> Result<(), FieldError>,
    ) -> Result<(), FieldError>;
}

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

macro_rules! scalar_value {
    ($($ty:ty => $kind:ident, $slot:ident, |$v:ident| $zero:expr;)*) => {$(
        impl Value for $ty {
            fn describe() -> Shape {
                Shape::scalar::<$ty>(Kind::$kind)
            }

            fn shape(&self) -> Shape {
                Self::describe()
            }

            fn is_zero(&self) -> bool {
                let $v = self;
                $zero
            }

            fn slot(&mut self) -> Slot<'_> {
                Slot::$slot(self)
            }
        }
    )*};
}

scalar_value! {
    bool => Bool, Bool, |v| !*v;
    i8 => I8, I8, |v| *v == 0;
    i16 => I16, I16, |v| *v == 0;
    i32 => I32, I32, |v| *v == 0;
    i64 => I64, I64, |v| *v == 0;
    isize => Isize, Isize, |v| *v == 0;
    u8 => U8, U8, |v| *v == 0;
    u16 => U16, U16, |v| *v == 0;
    u32 => U32, U32, |v| *v == 0;
    u64 => U64, U64, |v| *v == 0;
    usize => Usize, Usize, |v| *v == 0;
    // -0.0 is a set value: only the all-zero bit pattern counts as unset.
    f32 => F32, F32, |v| v.to_bits() == 0;
    f64 => F64, F64, |v| v.to_bits() == 0;
    String => Str, Str, |v| v.is_empty();
    Duration => I64, Duration, |v| *v == Duration::ZERO;
}

impl Value for serde_json::Value {
    fn describe() -> Shape {
        Shape::with_def::<Self>(Kind::Dynamic, Def::Dynamic)
    }

    fn shape(&self) -> Shape {
        Self::describe()
    }

    fn is_zero(&self) -> bool {
        self.is_null()
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::Dynamic(self)
    }
}

// ---------------------------------------------------------------------------
// Wrappers
// ---------------------------------------------------------------------------

impl<T: Value + Default> Value for Option<T> {
    fn describe() -> Shape {
        Shape::with_def::<Self>(Kind::Optional, Def::Optional(T::describe))
    }

    fn shape(&self) -> Shape {
        Self::describe()
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::Optional(self)
    }
}

impl<T: Value + Default> OptionalValue for Option<T> {
    fn inner_shape(&self) -> Shape {
        T::describe()
    }

    fn is_none(&self) -> bool {
        Option::is_none(self)
    }

    fn get_or_insert_default(&mut self) -> &mut dyn Value {
        self.get_or_insert_with(T::default)
    }

    fn populate(
        &mut self,
        fill: &mut dyn FnMut(&mut dyn Value) -> Result<(), FieldError>,
    ) -> Result<(), FieldError> {
        let mut fresh = T::default();
        fill(&mut fresh)?;
        *self = Some(fresh);
        Ok(())
    }
}

/// `Box` is transparent: it has the shape of what it points to.
impl<T: Value> Value for Box<T> {
    fn describe() -> Shape {
        T::describe()
    }

    fn shape(&self) -> Shape {
        (**self).shape()
    }

    fn is_zero(&self) -> bool {
        (**self).is_zero()
    }

    fn slot(&mut self) -> Slot<'_> {
        (**self).slot()
    }
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

impl<T: Value + Default> Value for Vec<T> {
    fn describe() -> Shape {
        Shape::with_def::<Self>(Kind::Seq, Def::Seq(T::describe))
    }

    fn shape(&self) -> Shape {
        Self::describe()
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::Seq(self)
    }
}

impl<T: Value + Default> SeqValue for Vec<T> {
    fn element(&self) -> Shape {
        T::describe()
    }

    fn rebuild(
        &mut self,
        len: usize,
        fill: &mut dyn FnMut(usize, &mut dyn Value) -> Result<(), FieldError>,
    ) -> Result<(), FieldError> {
        let mut fresh = Vec::with_capacity(len);
        for index in 0..len {
            let mut item = T::default();
            fill(index, &mut item)?;
            fresh.push(item);
        }
        *self = fresh;
        Ok(())
    }
}

impl<T: Value, const N: usize> Value for [T; N] {
    fn describe() -> Shape {
        Shape::with_def::<Self>(
            Kind::Array,
            Def::Array {
                element: T::describe,
                len: N,
            },
        )
    }

    fn shape(&self) -> Shape {
        Self::describe()
    }

    fn is_zero(&self) -> bool {
        self.iter().all(Value::is_zero)
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::Array(self)
    }
}

impl<T: Value, const N: usize> ArrayValue for [T; N] {
    fn element(&self) -> Shape {
        T::describe()
    }

    fn len(&self) -> usize {
        N
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Value> {
        self.as_mut_slice()
            .get_mut(index)
            .map(|item| item as &mut dyn Value)
    }
}

impl<K, V, S> Value for HashMap<K, V, S>
where
    K: Value + Default + Eq + Hash,
    V: Value + Default,
    S: BuildHasher + Default + 'static,
{
    fn describe() -> Shape {
        Shape::with_def::<Self>(
            Kind::Map,
            Def::Map {
                key: K::describe,
                value: V::describe,
            },
        )
    }

    fn shape(&self) -> Shape {
        Self::describe()
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::Map(self)
    }
}

impl<K, V, S> MapValue for HashMap<K, V, S>
where
    K: Value + Default + Eq + Hash,
    V: Value + Default,
    S: BuildHasher + Default + 'static,
{
    fn key(&self) -> Shape {
        K::describe()
    }

    fn value(&self) -> Shape {
        V::describe()
    }

    fn rebuild(
        &mut self,
        len: usize,
        fill: &mut dyn FnMut(usize, &mut dyn Value, &mut dyn Value) -> Result<(), FieldError>,
    ) -> Result<(), FieldError> {
        let mut fresh = HashMap::with_capacity_and_hasher(len, S::default());
        for index in 0..len {
            let mut key = K::default();
            let mut value = V::default();
            fill(index, &mut key, &mut value)?;
            fresh.insert(key, value);
        }
        *self = fresh;
        Ok(())
    }
}

impl<K, V> Value for BTreeMap<K, V>
where
    K: Value + Default + Ord,
    V: Value + Default,
{
    fn describe() -> Shape {
        Shape::with_def::<Self>(
            Kind::Map,
            Def::Map {
                key: K::describe,
                value: V::describe,
            },
        )
    }

    fn shape(&self) -> Shape {
        Self::describe()
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::Map(self)
    }
}

impl<K, V> MapValue for BTreeMap<K, V>
where
    K: Value + Default + Ord,
    V: Value + Default,
{
    fn key(&self) -> Shape {
        K::describe()
    }

    fn value(&self) -> Shape {
        V::describe()
    }

    fn rebuild(
        &mut self,
        len: usize,
        fill: &mut dyn FnMut(usize, &mut dyn Value, &mut dyn Value) -> Result<(), FieldError>,
    ) -> Result<(), FieldError> {
        let mut fresh = BTreeMap::new();
        for index in 0..len {
            let mut key = K::default();
            let mut value = V::default();
            fill(index, &mut key, &mut value)?;
            fresh.insert(key, value);
        }
        *self = fresh;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::shape::FieldDescriptor;

    const FIELD: FieldDescriptor = FieldDescriptor {
        name: "items",
        type_name: "Vec<u8>",
        shape: <Vec<u8> as Value>::describe,
        tags: &[],
        writable: true,
    };

    #[test]
    fn zero_values() {
        assert!(false.is_zero());
        assert!(!true.is_zero());
        assert!(0u32.is_zero());
        assert!(0.0f64.is_zero());
        assert!(!(-0.0f64).is_zero());
        assert!(String::new().is_zero());
        assert!(Duration::ZERO.is_zero());
        assert!(Vec::<i32>::new().is_zero());
        assert!([0u8; 3].is_zero());
        assert!(![0u8, 1, 0].is_zero());
        assert!(None::<i32>.is_zero());
        assert!(!Some(0).is_zero());
        assert!(serde_json::Value::Null.is_zero());
    }

    #[test]
    fn store_narrows_integers() {
        let mut small = 0i8;
        small.slot().store(Scalar::Int(-12)).unwrap();
        assert_eq!(small, -12);

        let err = small.slot().store(Scalar::Int(300)).unwrap_err();
        assert_eq!(err, "value 300 out of range for i8");
        assert_eq!(small, -12);
    }

    #[test]
    fn store_rejects_f32_overflow() {
        let mut f = 0f32;
        assert!(f.slot().store(Scalar::Float(1e39)).is_err());
        f.slot().store(Scalar::Float(9.0)).unwrap();
        assert_eq!(f, 9.0);
    }

    #[test]
    fn store_integer_into_duration_as_nanos() {
        let mut d = Duration::ZERO;
        d.slot().store(Scalar::Int(1)).unwrap();
        assert_eq!(d, Duration::from_nanos(1));
        assert!(d.slot().store(Scalar::Int(-1)).is_err());
    }

    #[test]
    fn store_mismatch_is_an_error() {
        let mut s = String::new();
        let err = s.slot().store(Scalar::Bool(true)).unwrap_err();
        assert_eq!(err, "cannot store bool into string storage");
    }

    #[test]
    fn populate_allocates_optional_only_on_success() {
        let mut target: Option<u16> = None;
        let failed = populate(&mut target, &mut |_slot| {
            Err(FieldError::invalid_value("<root>", &FIELD, "nope"))
        });
        assert_eq!(failed.unwrap_err().kind, ErrorKind::InvalidDefaultValue);
        assert_eq!(target, None);

        populate(&mut target, &mut |slot| {
            slot.store(Scalar::Uint(7))
                .map_err(|msg| FieldError::invalid_value("<root>", &FIELD, msg))
        })
        .unwrap();
        assert_eq!(target, Some(7));
    }

    #[test]
    fn seq_rebuild_is_all_or_nothing() {
        let mut items = vec![9u8];
        let err = items.rebuild(3, &mut |index, item| {
            if index == 2 {
                return Err(FieldError::invalid_item("<root>", &FIELD, "bad"));
            }
            item.slot()
                .store(Scalar::Uint(index as u64))
                .map_err(|msg| FieldError::invalid_item("<root>", &FIELD, msg))
        });
        assert!(err.is_err());
        assert_eq!(items, vec![9]);

        items
            .rebuild(2, &mut |index, item| {
                item.slot()
                    .store(Scalar::Uint(index as u64 + 1))
                    .map_err(|msg| FieldError::invalid_item("<root>", &FIELD, msg))
            })
            .unwrap();
        assert_eq!(items, vec![1, 2]);
    }

    #[test]
    fn box_is_transparent() {
        let shape = <Box<u32> as Value>::describe();
        assert_eq!(shape.kind, Kind::U32);
        assert!(shape.is::<u32>());
    }

    #[test]
    fn duration_reports_integer_kind() {
        let shape = <Duration as Value>::describe();
        assert_eq!(shape.kind, Kind::I64);
        assert!(shape.is::<Duration>());
    }
}
