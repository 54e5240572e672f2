use defaultz_api::{Kind, Scalar, Value};

/// Parses one collection element (or map key) into `target`, according to
/// the target's own kind.
pub(super) fn parse_into(raw: &str, target: &mut dyn Value) -> Result<(), String> {
    let shape = target.shape();
    let value = match shape.kind {
        Kind::Bool => Scalar::Bool(parse_bool(raw)?),
        Kind::Str => Scalar::Str(raw.to_string()),
        kind if Kind::SIGNED.contains(&kind) => Scalar::Int(raw.parse::<i64>().map_err(|e| format!("{e}: {raw:?}"))?),
        kind if Kind::UNSIGNED.contains(&kind) => Scalar::Uint(raw.parse::<u64>().map_err(|e| format!("{e}: {raw:?}"))?),
        kind if Kind::FLOAT.contains(&kind) => Scalar::Float(raw.parse::<f64>().map_err(|e| format!("{e}: {raw:?}"))?),
        _ => return Err(format!("unsupported type: {}", shape.type_name)),
    };
    target.slot().store(value)
}

/// Elements accept the usual spellings: `1`, `t`, `T`, `TRUE`, `true`,
/// `True` and their false counterparts.
fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(format!("invalid boolean {raw:?}")),
    }
}
