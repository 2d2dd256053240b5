//! Data model for the ScraperWiki metadata API.
//!
//! `getuserinfo` returns an array of [ProfileInfo]; `getinfo` returns an array of
//! [ProjectInfo]. Only the first element of each array is used.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Role names listed first, in this order, by [ProfileInfo::project_names].
const PRIMARY_ROLES: [&str; 2] = ["owner", "editor"];

/// Profile metadata for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProfileInfo {
    #[serde(alias = "Username")]
    pub username: String,
    /// Display name.
    #[serde(rename = "profilename", alias = "ProfileName")]
    pub profile_name: String,
    /// Role name (e.g. "owner", "editor") to project names in API order.
    #[serde(rename = "coderoles", alias = "CodeRoles")]
    pub code_roles: BTreeMap<String, Vec<String>>,
    #[serde(rename = "datejoined", alias = "DateJoined")]
    pub date_joined: String,
}

impl ProfileInfo {
    /// All project names across roles: owner first, then editor, then any other roles
    /// by name. A project listed under several roles appears once, at its first position.
    pub fn project_names(&self) -> Vec<String> {
        let primary = PRIMARY_ROLES
            .iter()
            .filter_map(|role| self.code_roles.get(*role));
        let others = self
            .code_roles
            .iter()
            .filter(|(role, _)| !PRIMARY_ROLES.contains(&role.as_str()))
            .map(|(_, names)| names);
        let mut out: Vec<String> = Vec::new();
        for name in primary.chain(others).flatten() {
            if !out.contains(name) {
                out.push(name.clone());
            }
        }
        out
    }
}

/// The subset of a `getinfo` record the code export needs. Other keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectInfo {
    pub code: Option<String>,
    pub language: Option<String>,
}

impl ProjectInfo {
    /// Code to write, or None when the project has none (absent, null, or empty).
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref().filter(|c| !c.is_empty())
    }

    pub fn language(&self) -> Language {
        Language::from_tag(self.language.as_deref())
    }
}

/// Scraper language as reported by the API. Unknown tags are `Other`, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Python,
    Ruby,
    Php,
    Html,
    Other,
}

impl Language {
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("python") => Language::Python,
            Some("ruby") => Language::Ruby,
            Some("php") => Language::Php,
            Some("html") => Language::Html,
            _ => Language::Other,
        }
    }

    /// File suffix including the dot; empty for `Other`.
    pub fn extension(self) -> &'static str {
        match self {
            Language::Python => ".py",
            Language::Ruby => ".rb",
            Language::Php => ".php",
            Language::Html => ".html",
            Language::Other => "",
        }
    }
}
