//! Per-page state holders. Each view owns its data and collapses every
//! failure into a single user-facing error message.
pub mod dashboard;
pub mod detail;
pub mod library;
pub mod search;
pub mod session;

pub use dashboard::{DashboardEntry, DashboardStats, DashboardView, StatusFilter};
pub use detail::ShowDetailView;
pub use library::LibraryView;
pub use search::SearchView;
pub use session::Session;
