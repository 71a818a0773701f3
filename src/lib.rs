pub mod api;
pub mod callback;
pub mod config;
pub mod progress;
pub mod render;
pub mod token;
pub mod views;
