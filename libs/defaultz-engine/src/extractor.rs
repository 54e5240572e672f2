use defaultz_api::FieldDescriptor;
use serde::Deserialize;

/// Failure to read a field's metadata. Fatal to the traversal.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ExtractError(pub String);

/// Produces the raw default spec for a field.
pub trait Extractor: Send + Sync {
    /// `Ok(None)` means the field has no default configured.
    fn extract_default(&self, field: &FieldDescriptor) -> Result<Option<String>, ExtractError>;
}

/// Reads the default spec from one of the field's tags.
///
/// The tag's raw value is split by `separator`; the first token (trimmed)
/// that starts with `prefix` is the default, with the prefix stripped.
///
/// With tag `default`, prefix `value=` and separator `,`:
///
/// - `#[tag(default = "value=foo, name=bar")]` yields `foo`;
/// - `#[tag(default = "name=bar")]` yields nothing.
///
/// With an empty prefix the first token wins, so an existing tag such as
/// `#[tag(jsonschema = "title=port,default=8080")]` can be reused by setting
/// tag `jsonschema` and prefix `default=`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TagExtractor {
    /// Tag to read.
    pub tag: String,
    /// Prefix a token must carry to be taken as the default.
    pub prefix: String,
    /// Token separator within the tag value.
    ///
    /// Empty means the whole value is a single token, not one token per
    /// character. Configuration files reject an empty separator; only a
    /// programmatically built extractor can carry one.
    pub separator: String,
}

impl Default for TagExtractor {
    fn default() -> Self {
        Self::new("default", "", ",")
    }
}

impl TagExtractor {
    pub fn new(tag: impl Into<String>, prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            prefix: prefix.into(),
            separator: separator.into(),
        }
    }

    fn pick<'a>(&self, raw: &'a str) -> Option<&'a str> {
        let matching = |token: &'a str| token.trim().strip_prefix(self.prefix.as_str());
        if self.separator.is_empty() {
            return matching(raw);
        }
        raw.split(self.separator.as_str()).find_map(matching)
    }
}

impl Extractor for TagExtractor {
    fn extract_default(&self, field: &FieldDescriptor) -> Result<Option<String>, ExtractError> {
        let raw = match field.tag(&self.tag) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(None),
        };
        Ok(self.pick(raw).map(str::to_string))
    }
}
