//! Offline catalog backend.
//!
//! Serves the whole backend contract from a JSON catalog loaded into memory.
//! Text queries are matched token by token with the skim fuzzy matcher:
//! every whitespace token must match, and the summed score ranks results for
//! relevance ordering.
//!
//! An optional artificial latency makes the fixture behave like a remote
//! service, which is what the host binary uses to exercise debouncing and
//! stale-response handling by hand.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    validate_paging, AnimeQuery, CatalogBackend, CharacterQuery, MangaQuery, PeopleQuery,
    SearchPage,
};
use crate::domain::{
    classify, Anime, AnimeDetail, ApiError, ApiResult, Character, CharacterDetail, ContentItem,
    ContentType, EntityDetail, Genre, Manga, MangaDetail, Person, Publisher, Result,
    ShikimoreError, SortOption, Studio,
};

/// Maximum number of studio/publisher suggestions returned per query.
const SUGGESTION_LIMIT: usize = 10;

/// Catalog file contents.
///
/// `records` holds untyped list-level entries (for instance a dump of search
/// results); each one is classified by its fields and merged into the typed
/// lists when the backend is built.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureCatalog {
    #[serde(default)]
    pub anime: Vec<AnimeDetail>,
    #[serde(default)]
    pub manga: Vec<MangaDetail>,
    #[serde(default)]
    pub characters: Vec<CharacterDetail>,
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub studios: Vec<Studio>,
    #[serde(default)]
    pub publishers: Vec<Publisher>,
    /// Poster URL to dominant color.
    #[serde(default)]
    pub accent_colors: BTreeMap<String, String>,
    #[serde(default)]
    pub records: Vec<Value>,
}

impl FixtureCatalog {
    /// Parses a catalog document.
    ///
    /// # Errors
    ///
    /// Returns [`ShikimoreError::Config`] if the document is not a valid
    /// catalog.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ShikimoreError::Config(format!("invalid fixture catalog: {e}")))
    }

    /// Reads and parses a catalog file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or
    /// [`ShikimoreError::Config`] if it cannot be parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}

/// In-memory implementation of [`CatalogBackend`].
#[derive(Debug, Clone)]
pub struct FixtureBackend {
    catalog: FixtureCatalog,
    latency: Duration,
}

impl FixtureBackend {
    /// Builds the backend, classifying any untyped `records`.
    ///
    /// # Errors
    ///
    /// Returns a `serialization` error if a record cannot be decoded as the
    /// type its fields indicate.
    pub fn new(mut catalog: FixtureCatalog) -> ApiResult<Self> {
        for record in std::mem::take(&mut catalog.records) {
            match classify(record)? {
                ContentItem::Anime(a) => catalog.anime.push(anime_detail(a)),
                ContentItem::Manga(m) => catalog.manga.push(manga_detail(m)),
                ContentItem::Character(c) => catalog.characters.push(character_detail(c)),
                ContentItem::Person(p) => catalog.people.push(p),
            }
        }

        tracing::debug!(
            anime = catalog.anime.len(),
            manga = catalog.manga.len(),
            characters = catalog.characters.len(),
            people = catalog.people.len(),
            genres = catalog.genres.len(),
            "fixture catalog loaded"
        );

        Ok(Self {
            catalog,
            latency: Duration::ZERO,
        })
    }

    /// Loads a catalog file and builds the backend from it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or classified.
    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(Self::new(FixtureCatalog::from_file(path)?)?)
    }

    /// Delays every response by `latency`.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    #[must_use]
    pub const fn catalog(&self) -> &FixtureCatalog {
        &self.catalog
    }

    async fn respond<T>(&self, result: ApiResult<T>) -> ApiResult<T> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        result
    }

    fn anime_page(&self, query: &AnimeQuery) -> ApiResult<SearchPage<Anime>> {
        validate_paging(query.page, query.limit)?;

        let candidates = self.catalog.anime.iter().filter(|a| {
            matches_list(query.kind.as_deref(), a.kind.as_deref())
                && matches_list(query.status.as_deref(), a.status.as_deref())
                && has_genres(query.genre.as_deref(), &a.genres)
                && query.studio.as_deref().map_or(true, |studio| {
                    a.studios.iter().any(|s| same_entity(studio, s.id, &s.name))
                })
        });

        let ranked = rank(candidates, &query.query, |a| {
            vec![Some(a.title.as_str()), a.russian.as_deref(), a.english.as_deref()]
        });
        let ordered = order(ranked, query.order, |a| (a.score, a.title.as_str()));

        Ok(SearchPage {
            items: paginate(ordered, query.page, query.limit)
                .map(list_anime)
                .collect(),
            page: query.page,
            limit: query.limit,
        })
    }

    fn manga_page(&self, query: &MangaQuery) -> ApiResult<SearchPage<Manga>> {
        validate_paging(query.page, query.limit)?;

        let candidates = self.catalog.manga.iter().filter(|m| {
            matches_list(query.kind.as_deref(), m.kind.as_deref())
                && matches_list(query.status.as_deref(), m.status.as_deref())
                && has_genres(query.genre.as_deref(), &m.genres)
                && query.publisher.as_deref().map_or(true, |publisher| {
                    m.publishers
                        .iter()
                        .any(|p| same_entity(publisher, p.id, &p.name))
                })
        });

        let ranked = rank(candidates, &query.query, |m| {
            vec![Some(m.title.as_str()), m.russian.as_deref(), m.english.as_deref()]
        });
        let ordered = order(ranked, query.order, |m| (m.score, m.title.as_str()));

        Ok(SearchPage {
            items: paginate(ordered, query.page, query.limit)
                .map(list_manga)
                .collect(),
            page: query.page,
            limit: query.limit,
        })
    }

    fn character_page(&self, query: &CharacterQuery) -> ApiResult<SearchPage<Character>> {
        validate_paging(query.page, query.limit)?;

        let ranked = rank(self.catalog.characters.iter(), &query.query, |c| {
            vec![Some(c.name.as_str()), c.russian.as_deref(), c.japanese.as_deref()]
        });

        Ok(SearchPage {
            items: paginate(ranked, query.page, query.limit)
                .map(list_character)
                .collect(),
            page: query.page,
            limit: query.limit,
        })
    }

    fn people_page(&self, query: &PeopleQuery) -> ApiResult<SearchPage<Person>> {
        validate_paging(1, query.limit)?;

        let ranked = rank(self.catalog.people.iter(), &query.query, |p| {
            vec![Some(p.name.as_str()), p.russian.as_deref()]
        });

        Ok(SearchPage {
            items: paginate(ranked, 1, query.limit).cloned().collect(),
            page: 1,
            limit: query.limit,
        })
    }

    fn entity(&self, content_type: ContentType, id: u64) -> ApiResult<EntityDetail> {
        let found = match content_type {
            ContentType::Anime => self
                .catalog
                .anime
                .iter()
                .find(|a| a.id == id)
                .cloned()
                .map(EntityDetail::Anime),
            ContentType::Manga => self
                .catalog
                .manga
                .iter()
                .find(|m| m.id == id)
                .cloned()
                .map(EntityDetail::Manga),
            ContentType::Characters => self
                .catalog
                .characters
                .iter()
                .find(|c| c.id == id)
                .cloned()
                .map(EntityDetail::Character),
            ContentType::People => {
                return Err(ApiError::validation("People have no detail record"));
            }
        };

        found.ok_or_else(|| ApiError::not_found(format!("No {content_type} with id {id}")))
    }
}

impl CatalogBackend for FixtureBackend {
    fn search_anime(&self, query: AnimeQuery) -> BoxFuture<'_, ApiResult<SearchPage<Anime>>> {
        Box::pin(async move { self.respond(self.anime_page(&query)).await })
    }

    fn search_manga(&self, query: MangaQuery) -> BoxFuture<'_, ApiResult<SearchPage<Manga>>> {
        Box::pin(async move { self.respond(self.manga_page(&query)).await })
    }

    fn search_characters(
        &self,
        query: CharacterQuery,
    ) -> BoxFuture<'_, ApiResult<SearchPage<Character>>> {
        Box::pin(async move { self.respond(self.character_page(&query)).await })
    }

    fn search_people(&self, query: PeopleQuery) -> BoxFuture<'_, ApiResult<SearchPage<Person>>> {
        Box::pin(async move { self.respond(self.people_page(&query)).await })
    }

    fn get_entity(
        &self,
        content_type: ContentType,
        id: u64,
    ) -> BoxFuture<'_, ApiResult<EntityDetail>> {
        Box::pin(async move { self.respond(self.entity(content_type, id)).await })
    }

    fn list_genres(&self) -> BoxFuture<'_, ApiResult<Vec<Genre>>> {
        Box::pin(async move { self.respond(Ok(self.catalog.genres.clone())).await })
    }

    fn search_studios(&self, query: String) -> BoxFuture<'_, ApiResult<Vec<Studio>>> {
        Box::pin(async move {
            let studios: Vec<Studio> = rank(self.catalog.studios.iter(), &query, |s| vec![Some(s.name.as_str())])
                .into_iter()
                .take(SUGGESTION_LIMIT)
                .cloned()
                .collect();
            self.respond(Ok(studios)).await
        })
    }

    fn search_publishers(&self, query: String) -> BoxFuture<'_, ApiResult<Vec<Publisher>>> {
        Box::pin(async move {
            let publishers: Vec<Publisher> = rank(self.catalog.publishers.iter(), &query, |p| {
                vec![Some(p.name.as_str())]
            })
            .into_iter()
            .take(SUGGESTION_LIMIT)
            .cloned()
            .collect();
            self.respond(Ok(publishers)).await
        })
    }

    fn accent_color(&self, image_url: String) -> BoxFuture<'_, ApiResult<String>> {
        Box::pin(async move {
            let color = self
                .catalog
                .accent_colors
                .get(&image_url)
                .cloned()
                .ok_or_else(|| ApiError::not_found(format!("No accent color for {image_url}")));
            self.respond(color).await
        })
    }
}

/// Keeps records whose names match every token of `query`, best match first.
///
/// A blank query keeps everything in catalog order.
fn rank<'a, T, I, F>(records: I, query: &str, names: F) -> Vec<&'a T>
where
    I: Iterator<Item = &'a T>,
    F: Fn(&T) -> Vec<Option<&str>>,
{
    let tokens: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    if tokens.is_empty() {
        return records.collect();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, &T)> = records
        .filter_map(|record| {
            names(record)
                .into_iter()
                .flatten()
                .filter_map(|name| {
                    let name = name.to_lowercase();
                    tokens
                        .iter()
                        .map(|token| matcher.fuzzy_match(&name, token))
                        .sum::<Option<i64>>()
                })
                .max()
                .map(|score| (score, record))
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, record)| record).collect()
}

fn order<'a, T, F>(mut records: Vec<&'a T>, sort: Option<SortOption>, key: F) -> Vec<&'a T>
where
    F: Fn(&T) -> (Option<f64>, &str),
{
    match sort {
        Some(SortOption::Score) => records.sort_by(|a, b| {
            let (a, b) = (key(a).0.unwrap_or(0.0), key(b).0.unwrap_or(0.0));
            b.total_cmp(&a)
        }),
        Some(SortOption::Title) => records.sort_by(|a, b| {
            let (a, b) = (key(a).1, key(b).1);
            a.to_lowercase().cmp(&b.to_lowercase())
        }),
        Some(SortOption::Relevance) | None => {}
    }
    records
}

fn paginate<T>(records: Vec<T>, page: u32, limit: u32) -> impl Iterator<Item = T> {
    let limit = limit as usize;
    let skip = (page.saturating_sub(1) as usize).saturating_mul(limit);
    records.into_iter().skip(skip).take(limit)
}

/// `filter` is a comma-separated list of accepted values.
fn matches_list(filter: Option<&str>, value: Option<&str>) -> bool {
    let Some(filter) = filter.filter(|f| !f.is_empty()) else {
        return true;
    };
    value.is_some_and(|value| filter.split(',').map(str::trim).any(|f| f == value))
}

/// `filter` is a comma-separated list of genre ids, all of which must be present.
fn has_genres(filter: Option<&str>, genres: &[Genre]) -> bool {
    filter.map_or(true, |filter| {
        filter
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .all(|id| genres.iter().any(|g| g.id.to_string() == id))
    })
}

/// Matches a studio/publisher filter given as an id or a name.
fn same_entity(filter: &str, id: u64, name: &str) -> bool {
    filter.parse::<u64>().map_or_else(
        |_| filter.eq_ignore_ascii_case(name),
        |filter_id| filter_id == id,
    )
}

fn list_anime(a: &AnimeDetail) -> Anime {
    Anime {
        id: a.id,
        title: a.title.clone(),
        russian: a.russian.clone(),
        url: a.url.clone(),
        poster_url: a.poster_url.clone(),
        score: a.score,
        kind: a.kind.clone(),
        status: a.status.clone(),
        episodes: a.episodes,
        episodes_aired: a.episodes_aired,
    }
}

fn list_manga(m: &MangaDetail) -> Manga {
    Manga {
        id: m.id,
        title: m.title.clone(),
        russian: m.russian.clone(),
        url: m.url.clone(),
        poster_url: m.poster_url.clone(),
        score: m.score,
        kind: m.kind.clone(),
        status: m.status.clone(),
        volumes: m.volumes,
        chapters: m.chapters,
    }
}

fn list_character(c: &CharacterDetail) -> Character {
    Character {
        id: c.id,
        name: c.name.clone(),
        russian: c.russian.clone(),
        url: c.url.clone(),
        poster_url: c.poster_url.clone(),
        description: c.description.clone(),
        is_anime: None,
        is_manga: None,
        is_ranobe: None,
    }
}

fn anime_detail(a: Anime) -> AnimeDetail {
    AnimeDetail {
        id: a.id,
        title: a.title,
        russian: a.russian,
        english: None,
        japanese: None,
        url: a.url,
        poster_url: a.poster_url,
        description: None,
        score: a.score,
        kind: a.kind,
        rating: None,
        status: a.status,
        episodes: a.episodes,
        episodes_aired: a.episodes_aired,
        duration: None,
        aired_on: None,
        released_on: None,
        genres: Vec::new(),
        studios: Vec::new(),
        external_links: Vec::new(),
        person_roles: Vec::new(),
        character_roles: Vec::new(),
        related: Vec::new(),
    }
}

fn manga_detail(m: Manga) -> MangaDetail {
    MangaDetail {
        id: m.id,
        title: m.title,
        russian: m.russian,
        english: None,
        japanese: None,
        url: m.url,
        poster_url: m.poster_url,
        description: None,
        score: m.score,
        kind: m.kind,
        status: m.status,
        volumes: m.volumes,
        chapters: m.chapters,
        aired_on: None,
        released_on: None,
        genres: Vec::new(),
        publishers: Vec::new(),
        external_links: Vec::new(),
        person_roles: Vec::new(),
        character_roles: Vec::new(),
        related: Vec::new(),
    }
}

fn character_detail(c: Character) -> CharacterDetail {
    CharacterDetail {
        id: c.id,
        name: c.name,
        russian: c.russian,
        japanese: None,
        synonyms: Vec::new(),
        url: c.url,
        poster_url: c.poster_url,
        description: c.description,
        character_roles: Vec::new(),
        seyus: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn backend() -> FixtureBackend {
        let catalog: FixtureCatalog = serde_json::from_value(json!({
            "anime": [
                {"id": 1, "title": "Naruto", "kind": "tv", "status": "released", "score": 8.0,
                 "genres": [{"id": 1, "name": "Action", "kind": "genre"}],
                 "studios": [{"id": 1, "name": "Pierrot"}]},
                {"id": 2, "title": "Naruto Shippuden", "kind": "tv", "status": "released", "score": 8.3,
                 "studios": [{"id": 1, "name": "Pierrot"}]},
                {"id": 3, "title": "Bleach", "kind": "tv", "status": "ongoing", "score": 7.9},
                {"id": 4, "title": "Akira", "kind": "movie", "status": "released", "score": 8.1}
            ],
            "characters": [
                {"id": 10, "name": "Naruto Uzumaki"},
                {"id": 11, "name": "Ichigo Kurosaki"}
            ],
            "studios": [{"id": 1, "name": "Pierrot"}, {"id": 2, "name": "Madhouse"}],
            "accent_colors": {"a.jpg": "#ff8800"},
            "records": [
                {"id": 50, "name": "Masashi Kishimoto", "is_mangaka": true},
                {"id": 60, "title": "Berserk", "volumes": 41}
            ]
        }))
        .unwrap();
        FixtureBackend::new(catalog).unwrap()
    }

    fn anime_query(query: &str) -> AnimeQuery {
        AnimeQuery {
            query: query.to_string(),
            page: 1,
            limit: 20,
            kind: None,
            status: None,
            genre: None,
            studio: None,
            order: None,
        }
    }

    fn ids<T>(items: &[T], id: impl Fn(&T) -> u64) -> Vec<u64> {
        items.iter().map(id).collect()
    }

    #[test]
    fn records_are_classified_into_lists() {
        let backend = backend();
        assert_eq!(backend.catalog().people.len(), 1);
        assert_eq!(backend.catalog().manga[0].title, "Berserk");
    }

    #[tokio::test]
    async fn fuzzy_query_requires_every_token() {
        let backend = backend();
        let page = backend.search_anime(anime_query("naruto ship")).await.unwrap();
        assert_eq!(ids(&page.items, |a| a.id), vec![2]);

        let page = backend.search_anime(anime_query("")).await.unwrap();
        assert_eq!(page.items.len(), 4);
    }

    #[tokio::test]
    async fn filters_and_paging_apply() {
        let backend = backend();

        let mut query = anime_query("");
        query.kind = Some("tv".to_string());
        query.status = Some("released".to_string());
        query.studio = Some("pierrot".to_string());
        query.order = Some(SortOption::Score);
        let page = backend.search_anime(query).await.unwrap();
        assert_eq!(ids(&page.items, |a| a.id), vec![2, 1]);

        let mut query = anime_query("");
        query.genre = Some("1".to_string());
        let page = backend.search_anime(query).await.unwrap();
        assert_eq!(ids(&page.items, |a| a.id), vec![1]);

        let mut query = anime_query("");
        query.limit = 3;
        query.page = 2;
        let page = backend.search_anime(query).await.unwrap();
        assert_eq!(ids(&page.items, |a| a.id), vec![4]);
    }

    #[tokio::test]
    async fn invalid_paging_is_rejected() {
        let backend = backend();
        let mut query = anime_query("x");
        query.limit = 0;
        let err = backend.search_anime(query).await.unwrap_err();
        assert_eq!(err.kind, crate::domain::ApiErrorKind::Validation);
    }

    #[tokio::test]
    async fn detail_lookup_and_errors() {
        let backend = backend();
        let detail = backend.get_entity(ContentType::Anime, 3).await.unwrap();
        assert_eq!(detail.display_title(), "Bleach");

        let missing = backend.get_entity(ContentType::Manga, 999).await.unwrap_err();
        assert_eq!(missing.kind, crate::domain::ApiErrorKind::NotFound);

        let people = backend.get_entity(ContentType::People, 50).await.unwrap_err();
        assert_eq!(people.kind, crate::domain::ApiErrorKind::Validation);
    }

    #[tokio::test]
    async fn studios_and_accent_colors() {
        let backend = backend();
        let studios = backend.search_studios("mad".to_string()).await.unwrap();
        assert_eq!(studios.len(), 1);
        assert_eq!(studios[0].name, "Madhouse");

        assert_eq!(backend.accent_color("a.jpg".to_string()).await.unwrap(), "#ff8800");
        assert!(backend.accent_color("b.jpg".to_string()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn latency_delays_responses() {
        let backend = backend().with_latency(Duration::from_millis(300));
        let started = tokio::time::Instant::now();
        backend.list_genres().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(300));
    }
}
