//! Canonical fingerprint of a search's filterable dimensions.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::domain::SearchParams;

/// Opaque token compared for equality only.
///
/// The default key is the key of "no search yet"; no encoded parameters ever
/// produce it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QueryKey(String);

impl QueryKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encodes every search-affecting field of `params`.
///
/// Fields are serialized in sorted name order, so the result does not depend
/// on how `params` was built. `limit` and pagination are not part of the key.
/// An empty filter encodes the same as an absent one.
///
/// # Examples
///
/// ```
/// use shikimore::domain::{ContentType, SearchParams};
/// use shikimore::search::encode;
///
/// let mut a = SearchParams::new("naruto", ContentType::Anime, 20);
/// a.kind_filter = Some(String::new());
/// let b = SearchParams::new("naruto", ContentType::Anime, 50);
/// assert_eq!(encode(&a), encode(&b));
/// ```
#[must_use]
pub fn encode(params: &SearchParams) -> QueryKey {
    let optional = |value: &Option<String>| {
        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .map_or(Value::Null, Value::from)
    };

    let fields: BTreeMap<&'static str, Value> = BTreeMap::from([
        ("contentType", Value::from(params.content_type.as_str())),
        ("genreFilter", optional(&params.genre_filter)),
        ("kindFilter", optional(&params.kind_filter)),
        ("query", Value::from(params.query.as_str())),
        ("sortBy", Value::from(params.sort_by.as_str())),
        ("statusFilter", optional(&params.status_filter)),
        ("studioFilter", optional(&params.studio_filter)),
    ]);

    let object = fields
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect::<serde_json::Map<_, _>>();

    QueryKey(Value::Object(object).to_string())
}
