//! Filter bar state and the genre catalog behind it.

use std::collections::BTreeMap;

use crate::domain::{ContentType, Genre, SortOption, Suggestion};

/// Current filter selections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub kind: Option<String>,
    pub status: Option<String>,
    /// Selected genre ids, in selection order.
    pub genres: Vec<u64>,
    /// Studio (anime) or publisher (manga) id or name.
    pub studio: Option<String>,
    pub sort: SortOption,
}

impl Filters {
    /// Comma-joined genre ids as the backend expects them.
    #[must_use]
    pub fn genre_filter(&self) -> Option<String> {
        if self.genres.is_empty() {
            return None;
        }
        Some(
            self.genres
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(","),
        )
    }

    /// Adds or removes `id`. Returns whether it is now selected.
    pub fn toggle_genre(&mut self, id: u64) -> bool {
        if let Some(position) = self.genres.iter().position(|g| *g == id) {
            self.genres.remove(position);
            false
        } else {
            self.genres.push(id);
            true
        }
    }

    /// Clears everything tied to a content type. Sort survives.
    pub fn reset_type_specific(&mut self) {
        self.kind = None;
        self.status = None;
        self.genres.clear();
        self.studio = None;
    }
}

/// Typing state of the studio/publisher box.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudioInput {
    pub text: String,
    /// Input the current suggestions were requested for.
    pub requested: Option<String>,
    pub suggestions: Vec<Suggestion>,
}

impl StudioInput {
    /// Minimum input length before suggestions are requested.
    pub const MIN_CHARS: usize = 2;

    pub fn clear(&mut self) {
        self.text.clear();
        self.requested = None;
        self.suggestions.clear();
    }
}

/// All genres known to the backend, fetched once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreCatalog {
    genres: Vec<Genre>,
    loaded: bool,
}

impl GenreCatalog {
    pub fn load(&mut self, genres: Vec<Genre>) {
        self.genres = genres;
        self.loaded = true;
    }

    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Genres applicable to `content_type`, grouped by the upper-cased first
    /// letter of their display name and sorted within each group.
    ///
    /// # Examples
    ///
    /// ```
    /// use shikimore::app::GenreCatalog;
    /// use shikimore::domain::{ContentType, Genre};
    ///
    /// let genre = |id, name: &str, kind: &str| Genre {
    ///     id,
    ///     name: name.to_string(),
    ///     russian: None,
    ///     kind: Some(kind.to_string()),
    /// };
    /// let mut catalog = GenreCatalog::default();
    /// catalog.load(vec![
    ///     genre(1, "drama", "genre"),
    ///     genre(2, "Action", "genre"),
    ///     genre(3, "Josei", "manga"),
    /// ]);
    ///
    /// let groups = catalog.grouped(ContentType::Anime);
    /// let letters: Vec<_> = groups.keys().cloned().collect();
    /// assert_eq!(letters, ["A", "D"]);
    /// ```
    #[must_use]
    pub fn grouped(&self, content_type: ContentType) -> BTreeMap<String, Vec<&Genre>> {
        let mut groups: BTreeMap<String, Vec<&Genre>> = BTreeMap::new();
        for genre in self.genres.iter().filter(|g| g.applies_to(content_type)) {
            let letter = genre
                .display_name()
                .chars()
                .next()
                .map(|c| c.to_uppercase().collect::<String>())
                .unwrap_or_default();
            groups.entry(letter).or_default().push(genre);
        }
        for group in groups.values_mut() {
            group.sort_by(|a, b| a.display_name().cmp(b.display_name()));
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genre_filter_joins_in_selection_order() {
        let mut filters = Filters::default();
        assert_eq!(filters.genre_filter(), None);

        filters.toggle_genre(7);
        filters.toggle_genre(3);
        assert_eq!(filters.genre_filter().as_deref(), Some("7,3"));

        assert!(!filters.toggle_genre(7));
        assert_eq!(filters.genre_filter().as_deref(), Some("3"));
    }

    #[test]
    fn type_reset_keeps_sort() {
        let mut filters = Filters {
            kind: Some("tv".to_string()),
            status: Some("ongoing".to_string()),
            genres: vec![1],
            studio: Some("Madhouse".to_string()),
            sort: SortOption::Score,
        };
        filters.reset_type_specific();
        assert_eq!(filters.sort, SortOption::Score);
        assert_eq!(filters.genre_filter(), None);
        assert!(filters.kind.is_none() && filters.studio.is_none());
    }

    #[test]
    fn groups_use_localized_names() {
        let mut catalog = GenreCatalog::default();
        catalog.load(vec![
            Genre {
                id: 1,
                name: "Comedy".to_string(),
                russian: Some("комедия".to_string()),
                kind: Some("genre".to_string()),
            },
            Genre {
                id: 2,
                name: "Cars".to_string(),
                russian: Some("Машины".to_string()),
                kind: None,
            },
        ]);

        let groups = catalog.grouped(ContentType::Manga);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["К"][0].id, 1);
        assert_eq!(groups["М"][0].id, 2);
        assert!(catalog.is_loaded());
    }
}
