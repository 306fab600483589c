//! Catalogue endpoints. Plain request/response calls through the client.

use serde_json::json;

use crate::client::{ApiClient, ApiError, PendingRequest};
use crate::models::{
    Book, BookSuggestion, BookmarkToggle, Page, PageParams, RatingResult, SearchParams,
};

pub const BOOKS_PATH: &str = "/books/";
pub const SEARCH_PATH: &str = "/books/search/";
pub const BESTSELLER_PATH: &str = "/books/bestseller/";
pub const BOOKMARKED_PATH: &str = "/books/bookmarked/";
pub const AUTOCOMPLETE_PATH: &str = "/books/autocomplete/";

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 5.0;

fn book_path(id: i64, suffix: &str) -> String {
    format!("{}{}/{}", BOOKS_PATH, id, suffix)
}

/// Top best sellers for the landing page.
pub async fn best_seller_list(client: &ApiClient) -> Result<Vec<Book>, ApiError> {
    client.send_json(PendingRequest::get(BOOKS_PATH)).await
}

pub async fn book_detail(client: &ApiClient, id: i64) -> Result<Book, ApiError> {
    client.send_json(PendingRequest::get(book_path(id, ""))).await
}

/// Adds or removes the bookmark, whichever applies.
pub async fn toggle_bookmark(client: &ApiClient, id: i64) -> Result<BookmarkToggle, ApiError> {
    client
        .send_json(PendingRequest::post(book_path(id, "bookmarks/")))
        .await
}

/// Creates or replaces the reader's rating. Scores outside 0.0..=5.0 are
/// rejected before anything is sent.
pub async fn rate_book(client: &ApiClient, id: i64, score: f64) -> Result<RatingResult, ApiError> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(ApiError::InvalidRequest(format!(
            "score {} is outside {}..={}",
            score, MIN_SCORE, MAX_SCORE
        )));
    }
    let request = PendingRequest::post(book_path(id, "rating/")).with_json(&json!({ "score": score }))?;
    client.send_json(request).await
}

pub async fn search_books(client: &ApiClient, params: &SearchParams) -> Result<Page<Book>, ApiError> {
    let request = PendingRequest::get(SEARCH_PATH).with_query_pairs(params.to_query());
    client.send_json(request).await
}

pub async fn best_sellers(client: &ApiClient, params: PageParams) -> Result<Page<Book>, ApiError> {
    let request = PendingRequest::get(BESTSELLER_PATH).with_query_pairs(params.to_query());
    client.send_json(request).await
}

pub async fn bookmarked_books(client: &ApiClient) -> Result<Vec<Book>, ApiError> {
    client.send_json(PendingRequest::get(BOOKMARKED_PATH)).await
}

/// Title suggestions while typing (the backend returns at most ten).
pub async fn autocomplete(client: &ApiClient, query: &str) -> Result<Vec<BookSuggestion>, ApiError> {
    let request = PendingRequest::get(AUTOCOMPLETE_PATH).with_query("q", query);
    client.send_json(request).await
}
