//! Shared response envelope types for API handlers.

use jobbit_core::pagination::PageWindow;
use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: transaction }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Page-number pagination envelope.
///
/// `next` and `previous` are page numbers, `null` at either end.
#[derive(Debug, Serialize)]
pub struct Paginated<T: Serialize> {
    pub count: i64,
    pub next: Option<i64>,
    pub previous: Option<i64>,
    pub results: Vec<T>,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(window: &PageWindow, count: i64, results: Vec<T>) -> Self {
        Self {
            count,
            next: window.next(count),
            previous: window.previous(),
            results,
        }
    }
}

/// `{ "count": n }` body for counters.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_links_neighbouring_pages() {
        let window = PageWindow::new(Some(2), 10);
        let page = Paginated::new(&window, 25, vec![1, 2, 3]);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["count"], 25);
        assert_eq!(json["next"], 3);
        assert_eq!(json["previous"], 1);
        assert_eq!(json["results"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn single_page_has_no_links() {
        let window = PageWindow::new(None, 35);
        let page: Paginated<i32> = Paginated::new(&window, 0, vec![]);
        let json = serde_json::to_value(&page).unwrap();
        assert!(json["next"].is_null());
        assert!(json["previous"].is_null());
    }
}
