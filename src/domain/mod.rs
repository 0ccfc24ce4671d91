//! Domain layer: catalog entities, search parameters and errors.
//!
//! Nothing in here performs I/O or knows about the event loop; these are the
//! values the search engine, the backend contract and the host pass around.
//!
//! # Organization
//!
//! - [`content`]: list-level entities and the tagged [`ContentItem`]
//! - [`detail`]: full entity records, genres, studios, publishers
//! - [`params`]: the [`SearchParams`] snapshot and sort options
//! - [`error`]: backend and host error types
//!
//! # Examples
//!
//! ```
//! use shikimore::domain::{ContentType, SearchParams};
//!
//! let params = SearchParams::new("", ContentType::Characters, 20);
//! assert!(params.should_fetch());
//! ```

pub mod content;
pub mod detail;
pub mod error;
pub mod params;

pub use content::{classify, Anime, Character, ContentItem, ContentType, ItemKey, Manga, Person};
pub use detail::{
    AnimeDetail, CharacterDetail, EntityDetail, Genre, MangaDetail, Publisher, Related, Studio,
    Suggestion,
};
pub use error::{ApiError, ApiErrorKind, ApiResult, Result, ShikimoreError};
pub use params::{SearchParams, SortOption};
