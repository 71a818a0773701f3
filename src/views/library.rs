//! The signed-in user's tracked shows.
use std::sync::Arc;
use tracing::info;

use crate::api::{error_message, ShowId, ShowStatus, TrackerApi, UserShow};

pub struct LibraryView {
    api: Arc<dyn TrackerApi>,
    shows: Vec<UserShow>,
    is_loading: bool,
    error: Option<String>,
}

impl LibraryView {
    pub fn new(api: Arc<dyn TrackerApi>) -> Self {
        Self {
            api,
            shows: Vec::new(),
            is_loading: false,
            error: None,
        }
    }

    pub fn shows(&self) -> &[UserShow] {
        &self.shows
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn contains(&self, show_id: ShowId) -> bool {
        self.shows.iter().any(|s| s.show_id == show_id)
    }

    pub async fn fetch_shows(&mut self) {
        self.is_loading = true;
        self.error = None;
        match self.api.user_shows().await {
            Ok(list) => self.shows = list.shows,
            Err(e) => self.error = Some(error_message(&e, "Failed to load shows")),
        }
        self.is_loading = false;
    }

    /// Adds with the default status and refreshes the whole list.
    pub async fn add_show(&mut self, show_id: ShowId) -> bool {
        match self.api.add_show(show_id, ShowStatus::default(), false).await {
            Ok(_) => {
                info!("Added show {} to list", show_id);
                self.fetch_shows().await;
                true
            }
            Err(e) => {
                self.error = Some(error_message(&e, "Failed to add show"));
                false
            }
        }
    }

    pub async fn remove_show(&mut self, show_id: ShowId) -> bool {
        match self.api.remove_show(show_id).await {
            Ok(_) => {
                self.shows.retain(|s| s.show_id != show_id);
                true
            }
            Err(e) => {
                self.error = Some(error_message(&e, "Failed to remove show"));
                false
            }
        }
    }

    pub async fn update_status(&mut self, show_id: ShowId, status: ShowStatus) -> bool {
        match self.api.update_show_status(show_id, status).await {
            Ok(_) => {
                for show in self.shows.iter_mut().filter(|s| s.show_id == show_id) {
                    show.status = status;
                }
                true
            }
            Err(e) => {
                self.error = Some(error_message(&e, "Failed to update status"));
                false
            }
        }
    }
}
