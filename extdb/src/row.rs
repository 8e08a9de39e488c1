/// A single field value from an external row.
///
/// Text and blob columns arrive as `Bytes` so the configured character set
/// can be applied before anything interprets them; `codec::decode_row` turns
/// them into `Text`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Bytes(Vec<u8>),
    Text(String),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Integer view, accepting numeric text. Start dates in the external
    /// schema are epoch seconds and some drivers hand them back as strings.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            Value::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}

/// One external row: column name to value, in select order, with names
/// lower-cased once at ingestion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, Value)>,
}

impl Row {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: AsRef<str>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(name, value)| (name.as_ref().to_lowercase(), value))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_text)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Value)> {
        self.fields.iter()
    }

    pub(crate) fn map_values<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Value,
    {
        Self {
            fields: self
                .fields
                .into_iter()
                .map(|(name, value)| (name, f(value)))
                .collect(),
        }
    }
}
