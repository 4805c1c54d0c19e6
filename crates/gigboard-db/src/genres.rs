//! Genre tag encoding.
//!
//! Genres are stored as a JSON array of strings in a `jsonb` column. Order is
//! preserved and tags are stored verbatim apart from trimming; blank entries
//! are dropped.

use serde_json::Value;

/// Encode a list of genre tags into the stored column value.
pub fn encode<I, S>(genres: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Value::Array(
        clean(genres)
            .into_iter()
            .map(Value::String)
            .collect(),
    )
}

/// Decode the stored column value back into a list of tags.
///
/// Rows written before the column became an array may still hold the old
/// comma-joined string; those are split on `,`.
pub fn decode(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => clean(items.iter().filter_map(Value::as_str)),
        Value::String(joined) => clean(joined.split(',')),
        _ => Vec::new(),
    }
}

fn clean<I, S>(genres: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    genres
        .into_iter()
        .map(|g| g.as_ref().trim().to_string())
        .filter(|g| !g.is_empty())
        .collect()
}
