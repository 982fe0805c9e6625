pub mod api;
pub mod api_config;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod format;
pub mod index;
pub mod records;
pub mod select;
pub mod store;
pub mod views;

pub use dashboard::{Dashboard, RenderSettings};
pub use error::{DashError, Result};
