use std::fmt;

/// Coarse runtime category of a field's type, independent of its declared name.
///
/// Converters are registered per kind. A `std::time::Duration` field reports
/// `I64`, so integer and duration converters share one chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Str,
    /// Variable-length sequence (`Vec<T>`).
    Seq,
    /// Fixed-size array (`[T; N]`).
    Array,
    /// Key-to-value mapping.
    Map,
    /// Nested record (`#[derive(Record)]`).
    Record,
    /// Optional/nullable wrapper (`Option<T>`).
    Optional,
    /// Open, dynamically typed value (`serde_json::Value`).
    Dynamic,
}

impl Kind {
    pub const SIGNED: [Kind; 5] = [Kind::I8, Kind::I16, Kind::I32, Kind::I64, Kind::Isize];
    pub const UNSIGNED: [Kind; 5] = [Kind::U8, Kind::U16, Kind::U32, Kind::U64, Kind::Usize];
    pub const FLOAT: [Kind; 2] = [Kind::F32, Kind::F64];

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::I8 => "i8",
            Kind::I16 => "i16",
            Kind::I32 => "i32",
            Kind::I64 => "i64",
            Kind::Isize => "isize",
            Kind::U8 => "u8",
            Kind::U16 => "u16",
            Kind::U32 => "u32",
            Kind::U64 => "u64",
            Kind::Usize => "usize",
            Kind::F32 => "f32",
            Kind::F64 => "f64",
            Kind::Str => "string",
            Kind::Seq => "seq",
            Kind::Array => "array",
            Kind::Map => "map",
            Kind::Record => "record",
            Kind::Optional => "optional",
            Kind::Dynamic => "dynamic",
        }
    }

    /// Scalars are the kinds a collection element may have.
    pub fn is_scalar(self) -> bool {
        !matches!(
            self,
            Kind::Seq | Kind::Array | Kind::Map | Kind::Record | Kind::Optional | Kind::Dynamic
        )
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
