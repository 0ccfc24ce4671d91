//! Client-side ordering of a freshly fetched page.
//!
//! Only the page being merged is sorted; items already in the list never
//! move when more pages arrive.

use std::cmp::Ordering;

use crate::domain::{ContentItem, SortOption};

/// Sorts `page` in place. Both sorts are stable.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use shikimore::domain::{classify, SortOption};
/// use shikimore::search::sort_page;
///
/// let mut page: Vec<_> = [7.5, 9.5]
///     .iter()
///     .enumerate()
///     .map(|(i, s)| classify(json!({"id": i, "title": "t", "episodes": 1, "score": s})).unwrap())
///     .collect();
/// sort_page(&mut page, SortOption::Score);
/// assert_eq!(page[0].score(), Some(9.5));
/// ```
pub fn sort_page(page: &mut [ContentItem], sort: SortOption) {
    match sort {
        SortOption::Relevance => {}
        SortOption::Score => page.sort_by(by_score_desc),
        SortOption::Title => page.sort_by(by_title),
    }
}

fn by_score_desc(a: &ContentItem, b: &ContentItem) -> Ordering {
    let score = |item: &ContentItem| item.score().unwrap_or(0.0);
    score(b).total_cmp(&score(a))
}

/// Case-insensitive, then raw. Titles are compared by code point after
/// lower-casing, not collated: accented letters sort after plain Latin and
/// Cyrillic after both.
fn by_title(a: &ContentItem, b: &ContentItem) -> Ordering {
    let (a, b) = (a.display_title(), b.display_title());
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Anime;

    fn anime(id: u64, title: &str, score: Option<f64>) -> ContentItem {
        ContentItem::Anime(Anime {
            id,
            title: title.to_string(),
            russian: None,
            url: None,
            poster_url: None,
            score,
            kind: None,
            status: None,
            episodes: None,
            episodes_aired: None,
        })
    }

    fn ids(page: &[ContentItem]) -> Vec<u64> {
        page.iter().map(ContentItem::id).collect()
    }

    #[test]
    fn score_sort_treats_missing_as_zero() {
        let mut page = vec![anime(1, "a", Some(7.5)), anime(2, "b", Some(9.5)), anime(3, "c", None)];
        sort_page(&mut page, SortOption::Score);
        assert_eq!(ids(&page), vec![2, 1, 3]);
    }

    #[test]
    fn score_sort_is_stable_for_ties() {
        let mut page = vec![
            anime(1, "a", None),
            anime(2, "b", Some(8.0)),
            anime(3, "c", Some(0.0)),
            anime(4, "d", Some(8.0)),
        ];
        sort_page(&mut page, SortOption::Score);
        assert_eq!(ids(&page), vec![2, 4, 1, 3]);
    }

    #[test]
    fn title_sort_ignores_case() {
        let mut page = vec![anime(1, "bleach", None), anime(2, "Akira", None), anime(3, "Berserk", None)];
        sort_page(&mut page, SortOption::Title);
        assert_eq!(ids(&page), vec![2, 3, 1]);
    }

    #[test]
    fn title_sort_folds_case_but_orders_by_code_point() {
        let mut page = vec![
            anime(1, "бета", None),
            anime(2, "Émile", None),
            anime(3, "Альфа", None),
            anime(4, "zeta", None),
            anime(5, "Zeta", None),
        ];
        sort_page(&mut page, SortOption::Title);
        assert_eq!(ids(&page), vec![5, 4, 2, 3, 1]);
    }

    #[test]
    fn relevance_keeps_backend_order() {
        let mut page = vec![anime(3, "z", Some(1.0)), anime(1, "a", Some(9.0))];
        sort_page(&mut page, SortOption::Relevance);
        assert_eq!(ids(&page), vec![3, 1]);
    }
}
