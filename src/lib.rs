pub mod config;
pub mod egui_integration;
pub mod error;
pub mod logo;
pub mod progress;
pub mod snow;
pub mod ui;

pub use error::OverlayError;
pub use ui::loading::LoadingOverlay;
