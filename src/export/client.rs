//! Blocking HTTP client with configurable endpoints, timeout, and an optional delay between requests.

use reqwest::Url;
use std::time::{Duration, Instant};

const DEFAULT_USER_AGENT: &str = "swexport/0.1 (+https://github.com/swexport)";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DELAY_SECS: u64 = 0;
const MAX_REDIRECTS: usize = 10;

/// Base of the metadata API (`getuserinfo`, `getinfo`).
pub const DEFAULT_API_BASE: &str = "https://api.scraperwiki.com/api/1.0";
/// Base of the site that serves SQLite exports.
pub const DEFAULT_SITE_BASE: &str = "https://scraperwiki.com";

/// Fields suppressed in `getinfo` responses; only `code` and `language` are needed.
pub const QUIET_FIELDS: &str =
    "attachable_here|attachables|tags|last_run|history|datasummary|userroles|runevents|last_run";

/// Where the metadata API and the export downloads live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub api_base: String,
    pub site_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            site_base: DEFAULT_SITE_BASE.to_string(),
        }
    }
}

impl Endpoints {
    /// `{api_base}/scraper/getuserinfo?format=jsondict&username={username}`
    pub fn user_info_url(&self, username: &str) -> Result<Url, url::ParseError> {
        let base = format!("{}/scraper/getuserinfo", self.api_base.trim_end_matches('/'));
        Url::parse_with_params(&base, &[("format", "jsondict"), ("username", username)])
    }

    /// `{api_base}/scraper/getinfo?format=jsondict&name={name}&version=-1&quietfields=...`
    pub fn project_info_url(&self, name: &str) -> Result<Url, url::ParseError> {
        let base = format!("{}/scraper/getinfo", self.api_base.trim_end_matches('/'));
        Url::parse_with_params(
            &base,
            &[
                ("format", "jsondict"),
                ("name", name),
                ("version", "-1"),
                ("quietfields", QUIET_FIELDS),
            ],
        )
    }

    /// `{site_base}/scrapers/export_sqlite/{name}/`
    pub fn export_url(&self, name: &str) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.site_base)?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(["scrapers", "export_sqlite", name, ""]);
        Ok(url)
    }
}

/// Blocking HTTP client shared by the three export operations.
#[derive(Debug)]
pub struct ExportClient {
    inner: reqwest::blocking::Client,
    endpoints: Endpoints,
    delay: Duration,
    last_request: Option<Instant>,
}

impl ExportClient {
    pub fn builder() -> ExportClientBuilder {
        ExportClientBuilder::default()
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Perform a GET request. Sleeps until the configured delay has passed since the last request.
    pub fn get(&mut self, url: Url) -> Result<reqwest::blocking::Response, reqwest::Error> {
        self.wait_delay();
        let response = self.inner.get(url).send();
        self.last_request = Some(Instant::now());
        response
    }

    /// Perform a HEAD request. Same politeness rules as [`ExportClient::get`].
    pub fn head(&mut self, url: Url) -> Result<reqwest::blocking::Response, reqwest::Error> {
        self.wait_delay();
        let response = self.inner.head(url).send();
        self.last_request = Some(Instant::now());
        response
    }

    fn wait_delay(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.delay {
                std::thread::sleep(self.delay - elapsed);
            }
        }
    }
}

/// Builder for ExportClient with optional User-Agent, delay, timeout, and endpoint overrides.
#[derive(Debug)]
pub struct ExportClientBuilder {
    user_agent: Option<String>,
    delay_secs: u64,
    timeout_secs: u64,
    endpoints: Endpoints,
}

impl Default for ExportClientBuilder {
    fn default() -> Self {
        Self {
            user_agent: None,
            delay_secs: DEFAULT_DELAY_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            endpoints: Endpoints::default(),
        }
    }
}

impl ExportClientBuilder {
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set delay between requests in seconds. Default 0.
    pub fn delay_secs(mut self, secs: u64) -> Self {
        self.delay_secs = secs;
        self
    }

    /// Set request timeout in seconds. Default 30.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Override the metadata API base, e.g. `http://127.0.0.1:8080/api/1.0`.
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.endpoints.api_base = base.into();
        self
    }

    /// Override the export site base, e.g. `http://127.0.0.1:8080`.
    pub fn site_base(mut self, base: impl Into<String>) -> Self {
        self.endpoints.site_base = base.into();
        self
    }

    pub fn build(self) -> Result<ExportClient, reqwest::Error> {
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let inner = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(self.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(ExportClient {
            inner,
            endpoints: self.endpoints,
            delay: Duration::from_secs(self.delay_secs),
            last_request: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_info_url_matches_api_shape() -> Result<(), url::ParseError> {
        let url = Endpoints::default().user_info_url("exampleuser")?;
        assert_eq!(
            url.as_str(),
            "https://api.scraperwiki.com/api/1.0/scraper/getuserinfo?format=jsondict&username=exampleuser"
        );
        Ok(())
    }

    #[test]
    fn user_info_url_encodes_username() -> Result<(), url::ParseError> {
        let url = Endpoints::default().user_info_url("a b&c")?;
        let username = url
            .query_pairs()
            .find(|(k, _)| k == "username")
            .map(|(_, v)| v.into_owned());
        assert_eq!(username.as_deref(), Some("a b&c"));
        Ok(())
    }

    #[test]
    fn project_info_url_suppresses_verbose_fields() -> Result<(), url::ParseError> {
        let url = Endpoints::default().project_info_url("proj1")?;
        assert!(url
            .as_str()
            .starts_with("https://api.scraperwiki.com/api/1.0/scraper/getinfo?"));
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("format".into(), "jsondict".into())));
        assert!(pairs.contains(&("name".into(), "proj1".into())));
        assert!(pairs.contains(&("version".into(), "-1".into())));
        assert!(pairs.contains(&("quietfields".into(), QUIET_FIELDS.into())));
        Ok(())
    }

    #[test]
    fn export_url_has_trailing_slash() -> Result<(), url::ParseError> {
        let url = Endpoints::default().export_url("proj1")?;
        assert_eq!(
            url.as_str(),
            "https://scraperwiki.com/scrapers/export_sqlite/proj1/"
        );
        Ok(())
    }

    #[test]
    fn export_url_with_base_path_and_trailing_slash() -> Result<(), url::ParseError> {
        let endpoints = Endpoints {
            api_base: DEFAULT_API_BASE.to_string(),
            site_base: "http://127.0.0.1:9000/mirror/".to_string(),
        };
        let url = endpoints.export_url("p")?;
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9000/mirror/scrapers/export_sqlite/p/"
        );
        Ok(())
    }

    #[test]
    fn builder_overrides_endpoints() -> Result<(), reqwest::Error> {
        let client = ExportClient::builder()
            .api_base("http://localhost:1/api")
            .site_base("http://localhost:1")
            .build()?;
        assert_eq!(client.endpoints().api_base, "http://localhost:1/api");
        assert_eq!(client.endpoints().site_base, "http://localhost:1");
        Ok(())
    }
}
