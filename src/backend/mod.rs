//! The catalog backend contract consumed by the engine.
//!
//! [`CatalogBackend`] mirrors the remote API's operations one to one. Search
//! methods return typed pages; [`fetch_page`] picks the right operation for a
//! [`SearchRequest`] and tags the result into [`ContentItem`]s, which is the
//! only form the orchestrator ever sees.
//!
//! Implementations must be `Send + Sync + 'static` because the runtime shares
//! one instance across every spawned request.

pub mod fixture;

pub use fixture::{FixtureBackend, FixtureCatalog};

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Anime, ApiError, ApiResult, Character, ContentItem, ContentType, EntityDetail, Genre, Manga,
    Person, Publisher, SearchParams, SortOption, Studio, Suggestion,
};
use crate::search::SearchRequest;

/// Maximum page size the API accepts.
pub const MAX_LIMIT: u32 = 50;

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimeQuery {
    pub query: String,
    pub page: u32,
    pub limit: u32,
    pub kind: Option<String>,
    pub status: Option<String>,
    pub genre: Option<String>,
    pub studio: Option<String>,
    pub order: Option<SortOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MangaQuery {
    pub query: String,
    pub page: u32,
    pub limit: u32,
    pub kind: Option<String>,
    pub status: Option<String>,
    pub genre: Option<String>,
    pub publisher: Option<String>,
    pub order: Option<SortOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterQuery {
    pub query: String,
    pub page: u32,
    pub limit: u32,
}

/// People are never paginated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeopleQuery {
    pub query: String,
    pub limit: u32,
}

/// Asynchronous catalog operations.
///
/// Every operation may fail with a structured [`ApiError`].
pub trait CatalogBackend: Send + Sync + 'static {
    fn search_anime(&self, query: AnimeQuery) -> BoxFuture<'_, ApiResult<SearchPage<Anime>>>;

    fn search_manga(&self, query: MangaQuery) -> BoxFuture<'_, ApiResult<SearchPage<Manga>>>;

    fn search_characters(
        &self,
        query: CharacterQuery,
    ) -> BoxFuture<'_, ApiResult<SearchPage<Character>>>;

    fn search_people(&self, query: PeopleQuery) -> BoxFuture<'_, ApiResult<SearchPage<Person>>>;

    /// Full record for one entity. People have no detail record.
    fn get_entity(&self, content_type: ContentType, id: u64)
        -> BoxFuture<'_, ApiResult<EntityDetail>>;

    fn list_genres(&self) -> BoxFuture<'_, ApiResult<Vec<Genre>>>;

    fn search_studios(&self, query: String) -> BoxFuture<'_, ApiResult<Vec<Studio>>>;

    fn search_publishers(&self, query: String) -> BoxFuture<'_, ApiResult<Vec<Publisher>>>;

    /// Dominant color of an image, as a CSS color string.
    fn accent_color(&self, image_url: String) -> BoxFuture<'_, ApiResult<String>>;
}

/// Checks the paging arguments the API accepts.
///
/// # Errors
///
/// Returns a `validation` error unless `page >= 1` and `1 <= limit <= 50`.
pub fn validate_paging(page: u32, limit: u32) -> ApiResult<()> {
    if page < 1 {
        return Err(ApiError::validation("Page must be at least 1"));
    }
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Limit must be between 1 and {MAX_LIMIT}"
        )));
    }
    Ok(())
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

impl AnimeQuery {
    #[must_use]
    pub fn from_params(params: &SearchParams, page: u32) -> Self {
        Self {
            query: params.query.clone(),
            page,
            limit: params.limit,
            kind: non_empty(params.kind_filter.as_ref()),
            status: non_empty(params.status_filter.as_ref()),
            genre: non_empty(params.genre_filter.as_ref()),
            studio: non_empty(params.studio_filter.as_ref()),
            order: params.sort_by.as_order(),
        }
    }
}

impl MangaQuery {
    #[must_use]
    pub fn from_params(params: &SearchParams, page: u32) -> Self {
        Self {
            query: params.query.clone(),
            page,
            limit: params.limit,
            kind: non_empty(params.kind_filter.as_ref()),
            status: non_empty(params.status_filter.as_ref()),
            genre: non_empty(params.genre_filter.as_ref()),
            publisher: non_empty(params.studio_filter.as_ref()),
            order: params.sort_by.as_order(),
        }
    }
}

/// Runs the query shape matching `request`'s content type.
///
/// # Errors
///
/// Propagates the backend's error unchanged.
pub async fn fetch_page<B>(backend: &B, request: &SearchRequest) -> ApiResult<Vec<ContentItem>>
where
    B: CatalogBackend + ?Sized,
{
    let params = &request.params;
    let items = match params.content_type {
        ContentType::Anime => tag(
            backend
                .search_anime(AnimeQuery::from_params(params, request.page))
                .await?,
        ),
        ContentType::Manga => tag(
            backend
                .search_manga(MangaQuery::from_params(params, request.page))
                .await?,
        ),
        ContentType::Characters => tag(
            backend
                .search_characters(CharacterQuery {
                    query: params.query.clone(),
                    page: request.page,
                    limit: params.limit,
                })
                .await?,
        ),
        ContentType::People => tag(
            backend
                .search_people(PeopleQuery {
                    query: params.query.clone(),
                    limit: params.limit,
                })
                .await?,
        ),
    };
    Ok(items)
}

/// Studio suggestions for anime, publisher suggestions for manga, nothing for
/// the other types.
///
/// # Errors
///
/// Propagates the backend's error unchanged.
pub async fn fetch_suggestions<B>(
    backend: &B,
    content_type: ContentType,
    query: String,
) -> ApiResult<Vec<Suggestion>>
where
    B: CatalogBackend + ?Sized,
{
    match content_type {
        ContentType::Anime => Ok(backend
            .search_studios(query)
            .await?
            .into_iter()
            .map(Suggestion::from)
            .collect()),
        ContentType::Manga => Ok(backend
            .search_publishers(query)
            .await?
            .into_iter()
            .map(Suggestion::from)
            .collect()),
        ContentType::Characters | ContentType::People => Ok(Vec::new()),
    }
}

fn tag<T: Into<ContentItem>>(page: SearchPage<T>) -> Vec<ContentItem> {
    page.items.into_iter().map(Into::into).collect()
}
