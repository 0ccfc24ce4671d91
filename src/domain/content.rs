//! Catalog entities returned by list searches.
//!
//! The backend returns one typed page per content type. Each record is tagged
//! into a [`ContentItem`] once, at ingestion, so nothing downstream has to
//! guess an item's type from the fields it happens to carry. Raw untyped
//! records (fixture dumps) go through [`classify`], the only place that still
//! looks at field presence.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{ApiError, ApiResult};

/// Entity category being searched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Anime,
    Manga,
    Characters,
    People,
}

impl ContentType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anime => "anime",
            Self::Manga => "manga",
            Self::Characters => "characters",
            Self::People => "people",
        }
    }

    /// Only characters can be listed without a query.
    #[must_use]
    pub const fn allows_empty_query(self) -> bool {
        matches!(self, Self::Characters)
    }

    /// People come back as one unpaged batch.
    #[must_use]
    pub const fn is_paginated(self) -> bool {
        !matches!(self, Self::People)
    }

    /// Genre and studio/publisher filters only exist for titles.
    #[must_use]
    pub const fn supports_title_filters(self) -> bool {
        matches!(self, Self::Anime | Self::Manga)
    }

    /// Whether a full detail record can be fetched for this type.
    #[must_use]
    pub const fn has_detail(self) -> bool {
        !matches!(self, Self::People)
    }

    /// Next tab in display order, wrapping around.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Anime => Self::Manga,
            Self::Manga => Self::Characters,
            Self::Characters => Self::People,
            Self::People => Self::Anime,
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anime" => Ok(Self::Anime),
            "manga" => Ok(Self::Manga),
            "characters" | "character" => Ok(Self::Characters),
            "people" | "person" => Ok(Self::People),
            other => Err(ApiError::validation(format!("Unknown content type: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anime {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub russian: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub episodes: Option<u32>,
    #[serde(default)]
    pub episodes_aired: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manga {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub russian: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub volumes: Option<u32>,
    #[serde(default)]
    pub chapters: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub russian: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_anime: Option<bool>,
    #[serde(default)]
    pub is_manga: Option<bool>,
    #[serde(default)]
    pub is_ranobe: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub russian: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub is_seyu: Option<bool>,
    #[serde(default)]
    pub is_mangaka: Option<bool>,
    #[serde(default)]
    pub is_producer: Option<bool>,
    #[serde(default)]
    pub website: Option<String>,
}

/// Identity of an item across content types.
///
/// Ids are only unique within a type, so anything keyed per item (accent
/// colors, keyboard focus) uses the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey {
    pub content_type: ContentType,
    pub id: u64,
}

impl ItemKey {
    #[must_use]
    pub const fn new(content_type: ContentType, id: u64) -> Self {
        Self { content_type, id }
    }
}

/// A single search result, tagged with its variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    Anime(Anime),
    Manga(Manga),
    Character(Character),
    Person(Person),
}

impl ContentItem {
    #[must_use]
    pub const fn id(&self) -> u64 {
        match self {
            Self::Anime(a) => a.id,
            Self::Manga(m) => m.id,
            Self::Character(c) => c.id,
            Self::Person(p) => p.id,
        }
    }

    #[must_use]
    pub const fn content_type(&self) -> ContentType {
        match self {
            Self::Anime(_) => ContentType::Anime,
            Self::Manga(_) => ContentType::Manga,
            Self::Character(_) => ContentType::Characters,
            Self::Person(_) => ContentType::People,
        }
    }

    #[must_use]
    pub const fn key(&self) -> ItemKey {
        ItemKey::new(self.content_type(), self.id())
    }

    /// `title` for titles, `name` for characters and people.
    #[must_use]
    pub fn display_title(&self) -> &str {
        match self {
            Self::Anime(a) => &a.title,
            Self::Manga(m) => &m.title,
            Self::Character(c) => &c.name,
            Self::Person(p) => &p.name,
        }
    }

    #[must_use]
    pub fn russian(&self) -> Option<&str> {
        match self {
            Self::Anime(a) => a.russian.as_deref(),
            Self::Manga(m) => m.russian.as_deref(),
            Self::Character(c) => c.russian.as_deref(),
            Self::Person(p) => p.russian.as_deref(),
        }
    }

    #[must_use]
    pub const fn score(&self) -> Option<f64> {
        match self {
            Self::Anime(a) => a.score,
            Self::Manga(m) => m.score,
            Self::Character(_) | Self::Person(_) => None,
        }
    }

    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        match self {
            Self::Anime(a) => a.kind.as_deref(),
            Self::Manga(m) => m.kind.as_deref(),
            Self::Character(_) | Self::Person(_) => None,
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<&str> {
        match self {
            Self::Anime(a) => a.status.as_deref(),
            Self::Manga(m) => m.status.as_deref(),
            Self::Character(_) | Self::Person(_) => None,
        }
    }

    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Anime(a) => a.url.as_deref(),
            Self::Manga(m) => m.url.as_deref(),
            Self::Character(c) => c.url.as_deref(),
            Self::Person(p) => p.url.as_deref(),
        }
    }

    #[must_use]
    pub fn poster_url(&self) -> Option<&str> {
        match self {
            Self::Anime(a) => a.poster_url.as_deref(),
            Self::Manga(m) => m.poster_url.as_deref(),
            Self::Character(c) => c.poster_url.as_deref(),
            Self::Person(p) => p.poster_url.as_deref(),
        }
    }
}

impl From<Anime> for ContentItem {
    fn from(value: Anime) -> Self {
        Self::Anime(value)
    }
}

impl From<Manga> for ContentItem {
    fn from(value: Manga) -> Self {
        Self::Manga(value)
    }
}

impl From<Character> for ContentItem {
    fn from(value: Character) -> Self {
        Self::Character(value)
    }
}

impl From<Person> for ContentItem {
    fn from(value: Person) -> Self {
        Self::Person(value)
    }
}

/// Tags an untyped record by the fields it carries.
///
/// `episodes` means anime, `volumes` or `chapters` means manga, any of the
/// person role markers means person, anything else is a character.
///
/// # Errors
///
/// Returns a `serialization` error when the record does not decode as the
/// variant its fields point to.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use shikimore::domain::{classify, ContentType};
///
/// let item = classify(json!({"id": 1, "title": "Naruto", "episodes": 220})).unwrap();
/// assert_eq!(item.content_type(), ContentType::Anime);
///
/// let item = classify(json!({"id": 7, "name": "Kakashi"})).unwrap();
/// assert_eq!(item.content_type(), ContentType::Characters);
/// ```
pub fn classify(record: Value) -> ApiResult<ContentItem> {
    let has = |field: &str| record.get(field).is_some();

    let decoded = if has("episodes") {
        serde_json::from_value::<Anime>(record).map(ContentItem::Anime)
    } else if has("volumes") || has("chapters") {
        serde_json::from_value::<Manga>(record).map(ContentItem::Manga)
    } else if has("is_seyu") || has("is_mangaka") || has("is_producer") {
        serde_json::from_value::<Person>(record).map(ContentItem::Person)
    } else {
        serde_json::from_value::<Character>(record).map(ContentItem::Character)
    };

    decoded.map_err(|e| {
        ApiError::new(
            super::error::ApiErrorKind::Serialization,
            format!("Malformed catalog record: {e}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn manga_is_recognized_by_chapters_alone() {
        let item = classify(json!({"id": 2, "title": "Berserk", "chapters": 364})).unwrap();
        assert_eq!(item.content_type(), ContentType::Manga);
        assert_eq!(item.display_title(), "Berserk");
    }

    #[test]
    fn episodes_win_over_volumes() {
        let item = classify(json!({"id": 3, "title": "X", "episodes": 1, "volumes": 2})).unwrap();
        assert!(matches!(item, ContentItem::Anime(_)));
    }

    #[test]
    fn person_markers_select_person() {
        let item = classify(json!({"id": 4, "name": "Kana Hanazawa", "is_seyu": true})).unwrap();
        assert_eq!(item.key(), ItemKey::new(ContentType::People, 4));
    }

    #[test]
    fn malformed_record_is_a_serialization_error() {
        let err = classify(json!({"episodes": 12})).unwrap_err();
        assert_eq!(err.kind, crate::domain::ApiErrorKind::Serialization);
    }

    #[test]
    fn tagged_items_round_trip_with_discriminant() {
        let item = ContentItem::from(Character {
            id: 9,
            name: "Levi".to_string(),
            russian: None,
            url: None,
            poster_url: None,
            description: None,
            is_anime: Some(true),
            is_manga: None,
            is_ranobe: None,
        });
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "character");
        let back: ContentItem = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn content_type_parses_singular_aliases() {
        assert_eq!("Person".parse::<ContentType>().unwrap(), ContentType::People);
        assert!("movies".parse::<ContentType>().is_err());
        assert_eq!(ContentType::People.next(), ContentType::Anime);
    }
}
