use crate::row::{Row, Value};
use encoding_rs::Encoding;

/// Quoting style for values interpolated into generated SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quoting {
    /// Standard SQL: single quotes are doubled
    Standard,
    /// Sybase/ADO style: backslash escapes for `\\`, `'`, `"` and NUL
    Sybase,
}

fn encoding_for(label: &str) -> Option<&'static Encoding> {
    if label.is_empty() || label.eq_ignore_ascii_case("utf-8") || label.eq_ignore_ascii_case("utf8")
    {
        return None;
    }
    Encoding::for_label(label.as_bytes())
}

/// Bytes from the external database to UTF-8 text. Unknown labels fall back
/// to lossy UTF-8, matching the original's permissive conversion.
pub fn decode_bytes(bytes: &[u8], encoding: &str) -> String {
    match encoding_for(encoding) {
        Some(enc) => enc.decode(bytes).0.into_owned(),
        None => String::from_utf8_lossy(bytes).into_owned(),
    }
}

pub fn decode_value(value: Value, encoding: &str) -> Value {
    match value {
        Value::Bytes(bytes) => Value::Text(decode_bytes(&bytes, encoding)),
        other => other,
    }
}

/// Applies the character-set conversion to every value of a row.
pub fn decode_row(row: Row, encoding: &str) -> Row {
    row.map_values(|value| decode_value(value, encoding))
}

/// UTF-8 text to the external encoding, for outbound query text. The encoded
/// bytes are widened one byte per char so single-byte charsets survive the
/// driver's text protocol unchanged.
pub fn encode(text: &str, encoding: &str) -> String {
    let Some(enc) = encoding_for(encoding) else {
        return text.to_string();
    };
    let (bytes, _, _) = enc.encode(text);
    bytes.iter().map(|&b| b as char).collect()
}

/// Minimal value escaping for the equality/LIKE contexts the statement
/// builder generates. Not an injection barrier beyond those.
pub fn escape(text: &str, quoting: Quoting) -> String {
    match quoting {
        Quoting::Sybase => text
            .replace('\\', "\\\\")
            .replace('\'', "\\'")
            .replace('"', "\\\"")
            .replace('\0', "\\0"),
        Quoting::Standard => text.replace('\'', "''"),
    }
}
