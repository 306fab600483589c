use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A catalogue entry. Only the fields the client itself looks at are typed;
/// the rest of the backend record is carried along untouched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Paginated list envelope used by search and the best-seller listing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub total_pages: Option<u64>,
    pub results: Vec<T>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BookmarkToggle {
    pub is_bookmarked: bool,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RatingResult {
    pub message: String,
    pub average_rating: f64,
    pub rating_count: u64,
}

/// Autocomplete hit: just enough to fill a suggestion list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BookSuggestion {
    pub id: i64,
    pub title: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Title,
    Author,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Title => "title",
            SearchType::Author => "author",
        }
    }
}

/// Filters for `GET /books/search/`. Unset filters are left out of the query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParams {
    pub search: Option<String>,
    pub search_type: Option<SearchType>,
    pub categories: Vec<i64>,
    pub adult: Option<bool>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl SearchParams {
    pub fn text(search: impl Into<String>) -> Self {
        SearchParams {
            search: Some(search.into()),
            ..Default::default()
        }
    }

    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(search) = &self.search {
            query.push(("search".to_string(), search.clone()));
        }
        if let Some(search_type) = self.search_type {
            query.push(("searchType".to_string(), search_type.as_str().to_string()));
        }
        for category in &self.categories {
            query.push(("categories[]".to_string(), category.to_string()));
        }
        if let Some(adult) = self.adult {
            query.push(("adult".to_string(), adult.to_string()));
        }
        query.extend(PageParams::new(self.page, self.size).to_query());
        query
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl PageParams {
    pub fn new(page: Option<u32>, size: Option<u32>) -> Self {
        PageParams { page, size }
    }

    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        if let Some(size) = self.size {
            query.push(("size".to_string(), size.to_string()));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_keeps_unknown_fields() {
        let book: Book = serde_json::from_str(
            r#"{"id": 3, "title": "Dune", "author": "Frank Herbert", "price_standard": 12000}"#,
        )
        .expect("book should decode");

        assert_eq!(book.title, "Dune");
        assert_eq!(book.cover, None);
        assert_eq!(book.extra.get("price_standard"), Some(&Value::from(12000)));
    }

    #[test]
    fn test_search_query_skips_unset_filters() {
        let params = SearchParams {
            search: Some("tolkien".to_string()),
            search_type: Some(SearchType::Author),
            categories: vec![1, 5],
            page: Some(2),
            ..Default::default()
        };

        assert_eq!(
            params.to_query(),
            vec![
                ("search".to_string(), "tolkien".to_string()),
                ("searchType".to_string(), "author".to_string()),
                ("categories[]".to_string(), "1".to_string()),
                ("categories[]".to_string(), "5".to_string()),
                ("page".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_page_params() {
        assert!(PageParams::default().to_query().is_empty());
    }
}
