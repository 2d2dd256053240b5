//! Optional swexport settings: where exports land, how the HTTP client behaves, and which
//! ScraperWiki hosts to talk to. A project-local `swexport.toml` wins over the per-user file.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings read from TOML. Absent keys fall back to CLI flags or built-in defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct Config {
    /// Default output directory when -o is not set. Paths are relative to CWD.
    pub output_dir: Option<PathBuf>,
    /// HTTP User-Agent header.
    pub user_agent: Option<String>,
    /// Delay in seconds between requests.
    pub request_delay_secs: Option<u64>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Metadata API base, e.g. "https://api.scraperwiki.com/api/1.0".
    pub api_base_url: Option<String>,
    /// Export site base, e.g. "https://scraperwiki.com".
    pub site_base_url: Option<String>,
}

/// First existing file of `swexport.toml` in the working directory or `swexport/config.toml`
/// under the user config dir. Ok(None) when neither exists; Err names the file that failed.
pub fn load_config() -> Result<Option<Config>, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Cannot determine current directory: {}", e))?;
    match config_candidates(&cwd, dirs::config_dir())
        .into_iter()
        .find(|p| p.is_file())
    {
        Some(path) => load_config_from(&path).map(Some),
        None => Ok(None),
    }
}

/// Candidate files in priority order.
fn config_candidates(cwd: &Path, user_config_dir: Option<PathBuf>) -> Vec<PathBuf> {
    std::iter::once(cwd.join("swexport.toml"))
        .chain(user_config_dir.map(|d| d.join("swexport").join("config.toml")))
        .collect()
}

/// Read and parse one config file.
pub fn load_config_from(path: &Path) -> Result<Config, String> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
    toml::from_str(&s).map_err(|e| format!("Invalid config {}: {}", path.display(), e))
}
