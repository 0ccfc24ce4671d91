//! Full entity records shown in the detail pane, plus the small catalogs
//! (genres, studios, publishers) the filter bar is built from.

use serde::{Deserialize, Serialize};

use super::content::{Anime, Character, ContentType, ItemKey, Manga, Person};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShikiDate {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default)]
    pub day: Option<u32>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub russian: Option<String>,
    /// `"genre"`, `"theme"`, `"demographic"`, or a content type for
    /// type-specific genres.
    #[serde(default)]
    pub kind: Option<String>,
}

impl Genre {
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.russian
            .as_deref()
            .filter(|r| !r.is_empty())
            .unwrap_or(&self.name)
    }

    /// Whether the genre may be offered as a filter for `content_type`.
    #[must_use]
    pub fn applies_to(&self, content_type: ContentType) -> bool {
        match self.kind.as_deref() {
            None | Some("genre") => true,
            Some(kind) => kind == content_type.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Studio {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publisher {
    pub id: u64,
    pub name: String,
}

/// A studio or publisher offered while typing in the studio filter box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: u64,
    pub name: String,
}

impl From<Studio> for Suggestion {
    fn from(value: Studio) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

impl From<Publisher> for Suggestion {
    fn from(value: Publisher) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalLink {
    pub kind: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRole {
    #[serde(default)]
    pub roles_en: Vec<String>,
    pub person: Person,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterRole {
    #[serde(default)]
    pub roles_en: Vec<String>,
    pub character: Character,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedTitle {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub russian: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Related {
    #[serde(default)]
    pub anime: Option<RelatedTitle>,
    #[serde(default)]
    pub manga: Option<RelatedTitle>,
    pub relation_kind: String,
    #[serde(default)]
    pub relation_text: Option<String>,
}

impl Related {
    #[must_use]
    pub fn target(&self) -> Option<ItemKey> {
        self.anime
            .as_ref()
            .map(|a| ItemKey::new(ContentType::Anime, a.id))
            .or_else(|| {
                self.manga
                    .as_ref()
                    .map(|m| ItemKey::new(ContentType::Manga, m.id))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimeDetail {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub russian: Option<String>,
    #[serde(default)]
    pub english: Option<String>,
    #[serde(default)]
    pub japanese: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub episodes: Option<u32>,
    #[serde(default)]
    pub episodes_aired: Option<u32>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub aired_on: Option<ShikiDate>,
    #[serde(default)]
    pub released_on: Option<ShikiDate>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub studios: Vec<Studio>,
    #[serde(default)]
    pub external_links: Vec<ExternalLink>,
    #[serde(default)]
    pub person_roles: Vec<PersonRole>,
    #[serde(default)]
    pub character_roles: Vec<CharacterRole>,
    #[serde(default)]
    pub related: Vec<Related>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MangaDetail {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub russian: Option<String>,
    #[serde(default)]
    pub english: Option<String>,
    #[serde(default)]
    pub japanese: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
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
    #[serde(default)]
    pub aired_on: Option<ShikiDate>,
    #[serde(default)]
    pub released_on: Option<ShikiDate>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub publishers: Vec<Publisher>,
    #[serde(default)]
    pub external_links: Vec<ExternalLink>,
    #[serde(default)]
    pub person_roles: Vec<PersonRole>,
    #[serde(default)]
    pub character_roles: Vec<CharacterRole>,
    #[serde(default)]
    pub related: Vec<Related>,
}

/// A title a character appears in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterAppearance {
    #[serde(default)]
    pub roles_en: Vec<String>,
    #[serde(default)]
    pub anime: Option<Anime>,
    #[serde(default)]
    pub manga: Option<Manga>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterDetail {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub russian: Option<String>,
    #[serde(default)]
    pub japanese: Option<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub character_roles: Vec<CharacterAppearance>,
    #[serde(default)]
    pub seyus: Vec<Person>,
}

/// Result of a `get-entity-by-id` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EntityDetail {
    Anime(AnimeDetail),
    Manga(MangaDetail),
    Character(CharacterDetail),
}

impl EntityDetail {
    #[must_use]
    pub const fn key(&self) -> ItemKey {
        match self {
            Self::Anime(a) => ItemKey::new(ContentType::Anime, a.id),
            Self::Manga(m) => ItemKey::new(ContentType::Manga, m.id),
            Self::Character(c) => ItemKey::new(ContentType::Characters, c.id),
        }
    }

    #[must_use]
    pub fn display_title(&self) -> &str {
        match self {
            Self::Anime(a) => &a.title,
            Self::Manga(m) => &m.title,
            Self::Character(c) => &c.name,
        }
    }

    #[must_use]
    pub fn poster_url(&self) -> Option<&str> {
        match self {
            Self::Anime(a) => a.poster_url.as_deref(),
            Self::Manga(m) => m.poster_url.as_deref(),
            Self::Character(c) => c.poster_url.as_deref(),
        }
    }

    #[must_use]
    pub fn genres(&self) -> &[Genre] {
        match self {
            Self::Anime(a) => &a.genres,
            Self::Manga(m) => &m.genres,
            Self::Character(_) => &[],
        }
    }

    /// Studios of an anime or publishers of a manga, as filter targets.
    #[must_use]
    pub fn producers(&self) -> Vec<Suggestion> {
        match self {
            Self::Anime(a) => a.studios.iter().cloned().map(Suggestion::from).collect(),
            Self::Manga(m) => m.publishers.iter().cloned().map(Suggestion::from).collect(),
            Self::Character(_) => Vec::new(),
        }
    }

    /// Entities reachable from this record, in display order: related
    /// titles, then characters (for titles) or appearances (for characters).
    #[must_use]
    pub fn links(&self) -> Vec<ItemKey> {
        let character_keys = |roles: &[CharacterRole]| {
            roles
                .iter()
                .map(|r| ItemKey::new(ContentType::Characters, r.character.id))
                .collect::<Vec<_>>()
        };

        match self {
            Self::Anime(a) => {
                let mut links: Vec<_> = a.related.iter().filter_map(Related::target).collect();
                links.extend(character_keys(&a.character_roles));
                links
            }
            Self::Manga(m) => {
                let mut links: Vec<_> = m.related.iter().filter_map(Related::target).collect();
                links.extend(character_keys(&m.character_roles));
                links
            }
            Self::Character(c) => c
                .character_roles
                .iter()
                .filter_map(|role| {
                    role.anime
                        .as_ref()
                        .map(|a| ItemKey::new(ContentType::Anime, a.id))
                        .or_else(|| {
                            role.manga
                                .as_ref()
                                .map(|m| ItemKey::new(ContentType::Manga, m.id))
                        })
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn genre_applicability_follows_kind() {
        let plain: Genre = serde_json::from_value(json!({"id": 1, "name": "Action", "kind": "genre"})).unwrap();
        let anime_only: Genre =
            serde_json::from_value(json!({"id": 2, "name": "Shounen", "kind": "anime"})).unwrap();

        assert!(plain.applies_to(ContentType::Manga));
        assert!(anime_only.applies_to(ContentType::Anime));
        assert!(!anime_only.applies_to(ContentType::Manga));
    }

    #[test]
    fn genre_display_prefers_localized_name() {
        let genre = Genre {
            id: 1,
            name: "Comedy".to_string(),
            russian: Some("Комедия".to_string()),
            kind: None,
        };
        assert_eq!(genre.display_name(), "Комедия");
    }

    #[test]
    fn anime_links_list_related_then_characters() {
        let detail: EntityDetail = serde_json::from_value(json!({
            "type": "anime",
            "id": 20,
            "title": "Naruto",
            "related": [
                {"relation_kind": "sequel", "anime": {"id": 1735}},
                {"relation_kind": "adaptation", "manga": {"id": 11}}
            ],
            "character_roles": [
                {"character": {"id": 17, "name": "Naruto Uzumaki"}}
            ]
        }))
        .unwrap();

        assert_eq!(
            detail.links(),
            vec![
                ItemKey::new(ContentType::Anime, 1735),
                ItemKey::new(ContentType::Manga, 11),
                ItemKey::new(ContentType::Characters, 17),
            ]
        );
    }
}
