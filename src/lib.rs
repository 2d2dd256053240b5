//! swexport: CLI exporter for ScraperWiki scrapers. Downloads each project's SQLite data and source code.

pub mod cli;
pub mod config;
pub mod export;
pub mod model;

// Re-exports for CLI and consumers.
pub use export::{
    get_code, get_db, get_info, CodeOutcome, DatabaseOutcome, Endpoints, ExportClient,
    ExportClientBuilder, ExportError,
};
pub use model::{Language, ProfileInfo, ProjectInfo};
