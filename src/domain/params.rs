//! Search parameters snapshot.

use serde::{Deserialize, Serialize};

use super::content::ContentType;
use super::error::ApiError;

/// Ordering of result pages.
///
/// Anything other than `Relevance` is also applied client-side to each
/// fetched page (see `search::sort`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOption {
    #[default]
    Relevance,
    Score,
    Title,
}

impl SortOption {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Score => "score",
            Self::Title => "title",
        }
    }

    /// Value forwarded as the backend's `order` argument. Relevance is the
    /// backend's own default and is not sent.
    #[must_use]
    pub const fn as_order(self) -> Option<Self> {
        match self {
            Self::Relevance => None,
            other => Some(other),
        }
    }
}

impl std::str::FromStr for SortOption {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relevance" | "" => Ok(Self::Relevance),
            "score" => Ok(Self::Score),
            "title" => Ok(Self::Title),
            other => Err(ApiError::validation(format!("Unknown sort option: {other}"))),
        }
    }
}

/// Everything one search invocation depends on.
///
/// Built fresh from UI state each time a search is issued and never mutated
/// afterwards. Filters are free-form strings as the backend expects them:
/// `genre_filter` is a comma-joined list of genre ids, `studio_filter` is a
/// studio/publisher id or name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub query: String,
    pub content_type: ContentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind_filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre_filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub studio_filter: Option<String>,
    #[serde(default)]
    pub sort_by: SortOption,
    pub limit: u32,
}

impl SearchParams {
    #[must_use]
    pub fn new(query: impl Into<String>, content_type: ContentType, limit: u32) -> Self {
        Self {
            query: query.into(),
            content_type,
            kind_filter: None,
            status_filter: None,
            genre_filter: None,
            studio_filter: None,
            sort_by: SortOption::default(),
            limit,
        }
    }

    #[must_use]
    pub fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }

    /// False when the backend must not be called at all (blank query for a
    /// type that needs one).
    #[must_use]
    pub fn should_fetch(&self) -> bool {
        self.has_query() || self.content_type.allows_empty_query()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_only_fetches_characters() {
        let anime = SearchParams::new("   ", ContentType::Anime, 20);
        assert!(!anime.should_fetch());

        let characters = SearchParams::new("", ContentType::Characters, 20);
        assert!(characters.should_fetch());
    }

    #[test]
    fn sort_parses_and_maps_to_backend_order() {
        let sort: SortOption = "Score".parse().unwrap();
        assert_eq!(sort, SortOption::Score);
        assert_eq!(sort.as_order(), Some(SortOption::Score));
        assert_eq!(SortOption::Relevance.as_order(), None);
    }
}
