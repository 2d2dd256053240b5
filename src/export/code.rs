//! Source code download via `getinfo`, saved with an extension chosen from the reported language.

use crate::export::{fetch_json_array, invalid_url, ExportClient, ExportError};
use crate::model::{Language, ProjectInfo};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// What `get_code` did. Both variants are success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeOutcome {
    /// The project has no code; nothing written.
    NoCode,
    Written { path: PathBuf, bytes: usize },
}

/// Target path for a project's code: `output_dir/{project}{ext}`, no extension for `Other`.
pub fn code_path(project: &str, language: Language, output_dir: &Path) -> PathBuf {
    output_dir.join(format!("{}{}", project, language.extension()))
}

/// Download the code of `project` and write it verbatim into `output_dir`.
pub fn get_code(
    client: &mut ExportClient,
    project: &str,
    output_dir: &Path,
) -> Result<CodeOutcome, ExportError> {
    let url = client
        .endpoints()
        .project_info_url(project)
        .map_err(|e| invalid_url(&client.endpoints().api_base, e))?;
    let items: Vec<ProjectInfo> = fetch_json_array(client, url)?;
    let info = items
        .into_iter()
        .next()
        .ok_or_else(|| ExportError::ProjectNotFound {
            name: project.to_string(),
        })?;

    let Some(code) = info.code() else {
        return Ok(CodeOutcome::NoCode);
    };

    let path = code_path(project, info.language(), output_dir);
    let mut file = File::create(&path).map_err(|e| ExportError::CreateFile {
        path: path.clone(),
        source: e,
    })?;
    file.write_all(code.as_bytes())
        .map_err(|e| ExportError::WriteCode {
            path: path.clone(),
            source: e,
        })?;

    Ok(CodeOutcome::Written {
        path,
        bytes: code.len(),
    })
}
