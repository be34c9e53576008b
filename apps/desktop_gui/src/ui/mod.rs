//! UI layer for the desktop tutor: the answer form window.

pub mod app;

pub use app::TutorApp;
