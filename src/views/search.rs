use std::sync::Arc;
use tracing::debug;

use crate::api::{error_message, ShowSearchResult, TrackerApi};

pub struct SearchView {
    api: Arc<dyn TrackerApi>,
    results: Vec<ShowSearchResult>,
    is_loading: bool,
    error: Option<String>,
    page: u32,
    total_pages: u32,
}

impl SearchView {
    pub fn new(api: Arc<dyn TrackerApi>) -> Self {
        Self {
            api,
            results: Vec::new(),
            is_loading: false,
            error: None,
            page: 1,
            total_pages: 0,
        }
    }

    pub fn results(&self) -> &[ShowSearchResult] {
        &self.results
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// A blank query only clears the current results.
    pub async fn search(&mut self, query: &str, page: u32) {
        if query.trim().is_empty() {
            self.results.clear();
            return;
        }

        self.is_loading = true;
        self.error = None;
        match self.api.search_shows(query, page).await {
            Ok(data) => {
                debug!(
                    "Search '{}' page {}/{}: {} results",
                    query,
                    data.page,
                    data.total_pages,
                    data.results.len()
                );
                self.results = data.results;
                self.page = data.page;
                self.total_pages = data.total_pages;
            }
            Err(e) => {
                self.error = Some(error_message(&e, "Search failed"));
                self.results.clear();
            }
        }
        self.is_loading = false;
    }

    pub fn clear_results(&mut self) {
        self.results.clear();
        self.page = 1;
        self.total_pages = 0;
    }
}
