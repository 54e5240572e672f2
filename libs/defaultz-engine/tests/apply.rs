use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use defaultz_api::Record;
use defaultz_engine::{apply_defaults, Registry, TagExtractor};
use pretty_assertions::assert_eq;

#[derive(Record, Debug, Default, PartialEq)]
pub struct Primitives {
    #[tag(default = "true")]
    pub bool_field1: bool,
    #[tag(default = "false")]
    pub bool_field2: bool,
    #[tag(default = "0")]
    pub int_field1: isize,
    #[tag(default = "123")]
    pub int_field2: i8,
    #[tag(default = "123")]
    pub int_field3: i16,
    #[tag(default = "-123")]
    pub int_field4: i32,
    #[tag(default = "1000000000000000000")]
    pub int_field5: i64,
    #[tag(default = "0")]
    pub uint_field1: usize,
    #[tag(default = "123")]
    pub uint_field2: u8,
    #[tag(default = "123")]
    pub uint_field3: u16,
    #[tag(default = "123")]
    pub uint_field4: u32,
    #[tag(default = "1000000000000000000")]
    pub uint_field5: u64,
    #[tag(default = "0.0")]
    pub float_field1: f32,
    #[tag(default = "9")]
    pub float_field2: f32,
    #[tag(default = "-0")]
    pub float_field3: f64,
    #[tag(default = "123456789.123456789")]
    pub float_field4: f64,
    #[tag(default = "defaultValue")]
    pub string_field1: String,
    #[tag(default = "default Value")]
    pub string_field2: String,
    #[tag(default = "")]
    pub string_field3: String,
}

#[test]
fn primitives() {
    let mut value = Primitives::default();
    apply_defaults(&mut value).unwrap();
    assert_eq!(
        value,
        Primitives {
            bool_field1: true,
            bool_field2: false,
            int_field1: 0,
            int_field2: 123,
            int_field3: 123,
            int_field4: -123,
            int_field5: 1_000_000_000_000_000_000,
            uint_field1: 0,
            uint_field2: 123,
            uint_field3: 123,
            uint_field4: 123,
            uint_field5: 1_000_000_000_000_000_000,
            float_field1: 0.0,
            float_field2: 9.0,
            float_field3: -0.0,
            float_field4: 123_456_789.123_456_789,
            string_field1: "defaultValue".into(),
            string_field2: "default Value".into(),
            string_field3: String::new(),
        }
    );
    assert!(value.float_field3.is_sign_negative());
}

#[derive(Record, Debug, Default, PartialEq)]
pub struct Optionals {
    #[tag(default = "true")]
    pub flag: Option<bool>,
    #[tag(default = "-123")]
    pub int: Option<i32>,
    #[tag(default = "123")]
    pub uint: Option<u64>,
    #[tag(default = "9")]
    pub float: Option<f32>,
    #[tag(default = "default Value")]
    pub string: Option<String>,
    pub untagged: Option<i32>,
}

#[test]
fn optional_scalars_are_allocated() {
    let mut value = Optionals::default();
    apply_defaults(&mut value).unwrap();
    assert_eq!(
        value,
        Optionals {
            flag: Some(true),
            int: Some(-123),
            uint: Some(123),
            float: Some(9.0),
            string: Some("default Value".into()),
            untagged: None,
        }
    );
}

#[derive(Record, Debug, Default, PartialEq)]
pub struct Durations {
    #[tag(default = "1")]
    pub duration1: Duration,
    #[tag(default = "1s")]
    pub duration2: Duration,
    #[tag(default = "1h30m20s999ms")]
    pub duration3: Duration,
    #[tag(default = "1s")]
    pub optional: Option<Duration>,
    #[tag(default = "1m")]
    pub nanos: i64,
}

#[test]
fn durations() {
    let mut value = Durations::default();
    apply_defaults(&mut value).unwrap();
    assert_eq!(
        value,
        Durations {
            duration1: Duration::from_nanos(1),
            duration2: Duration::from_secs(1),
            duration3: Duration::from_millis(((3600 + 30 * 60 + 20) * 1000) + 999),
            optional: Some(Duration::from_secs(1)),
            nanos: 60_000_000_000,
        }
    );
}

#[derive(Record, Debug, Default, PartialEq)]
pub struct Collections {
    #[tag(default = "true false")]
    pub bools: Vec<bool>,
    #[tag(default = "0 1")]
    pub ints: Vec<i8>,
    #[tag(default = "1 2 3")]
    pub longs: Vec<i64>,
    #[tag(default = "0 1")]
    pub bytes: Vec<u8>,
    #[tag(default = "0.0 1.2345")]
    pub floats: Vec<f32>,
    #[tag(default = "defaultValue1 defaultValue2")]
    pub strings: Vec<String>,
    #[tag(default = "4 5")]
    pub optional: Option<Vec<u16>>,
    #[tag(default = "a:true b:false")]
    pub bool_map: HashMap<String, bool>,
    #[tag(default = "3:true 4:false")]
    pub keyed_by_int: HashMap<i32, bool>,
    #[tag(default = "a:1 b:2")]
    pub int_map: BTreeMap<String, i32>,
    #[tag(default = "a:0.0 b:1.2345")]
    pub float_map: BTreeMap<String, f32>,
    #[tag(default = "3:defaultValue1 4:defaultValue2")]
    pub string_map: BTreeMap<u32, String>,
}

#[test]
fn sequences_and_maps() {
    let mut value = Collections::default();
    apply_defaults(&mut value).unwrap();

    assert_eq!(value.bools, vec![true, false]);
    assert_eq!(value.ints, vec![0, 1]);
    assert_eq!(value.longs, vec![1, 2, 3]);
    assert_eq!(value.bytes, vec![0, 1]);
    assert_eq!(value.floats, vec![0.0, 1.2345]);
    assert_eq!(value.strings, vec!["defaultValue1", "defaultValue2"]);
    assert_eq!(value.optional, Some(vec![4, 5]));
    assert_eq!(
        value.bool_map,
        HashMap::from([("a".to_string(), true), ("b".to_string(), false)])
    );
    assert_eq!(value.keyed_by_int, HashMap::from([(3, true), (4, false)]));
    assert_eq!(
        value.int_map,
        BTreeMap::from([("a".to_string(), 1), ("b".to_string(), 2)])
    );
    assert_eq!(
        value.float_map,
        BTreeMap::from([("a".to_string(), 0.0), ("b".to_string(), 1.2345)])
    );
    assert_eq!(
        value.string_map,
        BTreeMap::from([(3, "defaultValue1".to_string()), (4, "defaultValue2".to_string())])
    );
}

#[derive(Record, Debug, Default, PartialEq)]
pub struct EmptyTags {
    #[tag(default = "")]
    pub flag: bool,
    #[tag(default = "")]
    pub int: i32,
    #[tag(default = "")]
    pub uint: u32,
    #[tag(default = "")]
    pub float: f32,
    #[tag(default = "")]
    pub string: String,
    #[tag(default = "")]
    pub seq: Vec<i32>,
    #[tag(default = "")]
    pub map: HashMap<String, i32>,
    #[tag(default = "")]
    pub optional: Option<i32>,
}

#[test]
fn empty_tags_leave_fields_untouched() {
    let mut value = EmptyTags::default();
    apply_defaults(&mut value).unwrap();
    assert_eq!(value, EmptyTags::default());
}

#[test]
fn empty_default_after_prefix_allocates_no_collection() {
    #[derive(Record, Debug, Default, PartialEq)]
    pub struct Prefixed {
        #[tag(default = "default=")]
        pub seq: Option<Vec<i32>>,
        #[tag(default = "default=")]
        pub map: Option<HashMap<String, i32>>,
        #[tag(default = "default=")]
        pub name: String,
    }

    let registry = Registry::new()
        .with_builtin_converters()
        .with_extractor(TagExtractor::new("default", "default=", ","));
    let mut value = Prefixed::default();
    registry.apply_defaults(&mut value).unwrap();
    assert_eq!(value, Prefixed::default());
}

#[derive(Record, Debug, Default, PartialEq)]
pub struct Inner {
    #[tag(default = "a:3.2 b:-214.11")]
    pub field4: BTreeMap<String, f32>,
    #[tag(default = "1 2 3")]
    pub field5: Vec<i64>,
}

#[derive(Record, Debug, Default, PartialEq)]
pub struct Middle {
    #[tag(default = "123")]
    pub field3: i32,
    pub inner: Option<Inner>,
}

#[derive(Record, Debug, Default, PartialEq)]
pub struct Outer {
    #[tag(default = "true")]
    pub field1: bool,
    #[tag(default = "val1 val2")]
    pub field2: Vec<String>,
    pub middle: Middle,
    pub optional: Option<Middle>,
    pub boxed: Box<Inner>,
}

fn filled_inner() -> Inner {
    Inner {
        field4: BTreeMap::from([("a".to_string(), 3.2), ("b".to_string(), -214.11)]),
        field5: vec![1, 2, 3],
    }
}

fn filled_middle() -> Middle {
    Middle {
        field3: 123,
        inner: Some(filled_inner()),
    }
}

#[test]
fn nested_records_are_walked_and_allocated() {
    let mut value = Outer::default();
    apply_defaults(&mut value).unwrap();
    assert_eq!(
        value,
        Outer {
            field1: true,
            field2: vec!["val1".into(), "val2".into()],
            middle: filled_middle(),
            optional: Some(filled_middle()),
            boxed: Box::new(filled_inner()),
        }
    );
}

#[test]
fn existing_values_are_kept() {
    let mut value = Outer {
        field1: false,
        field2: vec!["mine".into()],
        middle: Middle {
            field3: 7,
            inner: None,
        },
        optional: Some(Middle {
            field3: 0,
            inner: Some(Inner {
                field4: BTreeMap::from([("z".to_string(), 1.0)]),
                field5: Vec::new(),
            }),
        }),
        boxed: Box::default(),
    };
    apply_defaults(&mut value).unwrap();

    assert!(value.field1);
    assert_eq!(value.field2, vec!["mine"]);
    assert_eq!(value.middle.field3, 7);
    assert_eq!(value.middle.inner, Some(filled_inner()));

    let optional = value.optional.unwrap();
    assert_eq!(optional.field3, 123);
    let inner = optional.inner.unwrap();
    assert_eq!(inner.field4, BTreeMap::from([("z".to_string(), 1.0)]));
    assert_eq!(inner.field5, vec![1, 2, 3]);
}

#[derive(Record, Debug, Default, PartialEq)]
pub struct Siblings {
    pub left: Inner,
    pub right: Option<Inner>,
    pub both: [Inner; 2],
}

#[test]
fn repeated_record_types_are_not_cycles() {
    let mut value = Siblings::default();
    apply_defaults(&mut value).unwrap();
    assert_eq!(value.left, filled_inner());
    assert_eq!(value.right, Some(filled_inner()));
    assert_eq!(value.both, [filled_inner(), filled_inner()]);
}

#[derive(Record, Debug, Default, PartialEq)]
pub struct Tagged {
    #[tag(existing = "name=IntField1, default=123")]
    pub int_field: i32,
    #[tag(existing = "default=abc")]
    pub string_field: String,
    #[tag(existing = "name=Untouched")]
    pub untouched: u8,
    #[tag(default = "ignored")]
    pub other_tag: String,
}

#[test]
fn different_tag_and_prefix() {
    let registry = Registry::new()
        .with_builtin_converters()
        .with_extractor(TagExtractor::new("existing", "default=", ","));
    let mut value = Tagged::default();
    registry.apply_defaults(&mut value).unwrap();
    assert_eq!(
        value,
        Tagged {
            int_field: 123,
            string_field: "abc".into(),
            untouched: 0,
            other_tag: String::new(),
        }
    );
}

#[derive(Record, Debug, Default, PartialEq)]
pub struct Separated {
    #[tag(default = "true#foo=bar")]
    pub bool_field: bool,
    #[tag(default = "123#foo=bar#baz=qux")]
    pub int_field: i32,
    #[tag(default = "#foo=bar")]
    pub empty_first: String,
    #[tag(default = "   hasDefault#foo=bar   ")]
    pub trimmed: String,
}

#[test]
fn custom_separator_without_prefix() {
    let registry = Registry::new()
        .with_builtin_converters()
        .with_extractor(TagExtractor::new("default", "", "#"));
    let mut value = Separated::default();
    registry.apply_defaults(&mut value).unwrap();
    assert_eq!(
        value,
        Separated {
            bool_field: true,
            int_field: 123,
            empty_first: String::new(),
            trimmed: "hasDefault".into(),
        }
    );
}

#[test]
fn process_wide_registry_is_shared() {
    let a = defaultz_engine::default_registry();
    let b = defaultz_engine::default_registry();
    assert!(std::sync::Arc::ptr_eq(&a, &b));

    let mut value = Primitives::default();
    a.apply_defaults(&mut value).unwrap();
    assert_eq!(value.int_field2, 123);
}
