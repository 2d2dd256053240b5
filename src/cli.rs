//! CLI parsing and orchestration. Resolves each username, then exports every project's
//! SQLite data and code into the output directory. Maps errors to exit codes.

use crate::config;
use crate::export::database::sqlite_path;
use crate::export::{
    get_code, get_db, get_info, CodeOutcome, DatabaseOutcome, ExportClient, ExportError,
};
use crate::model::ProfileInfo;
use clap::Parser;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    /// User lookup failed, or a project failed under --fail-fast.
    #[error("{0}")]
    Export(#[source] ExportError),

    /// An output file could not be created or written; the run stopped.
    #[error("Stopping: {0}")]
    Fatal(#[source] ExportError),

    #[error("{failed} export operation(s) failed; see messages above.")]
    Incomplete { failed: usize },
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::InvalidInput(_) => 1,
            CliRunError::Export(_) | CliRunError::Incomplete { .. } => 2,
            CliRunError::Fatal(_) => 3,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "swexport")]
#[command(about = "Export ScraperWiki scrapers (SQLite data and source code) for one or more users")]
#[command(
    after_help = "Config file keys (output_dir, user_agent, request_delay_secs, timeout_secs, api_base_url, site_base_url) are read from ./swexport.toml or the user config dir. CLI flags override config."
)]
pub struct Args {
    /// ScraperWiki usernames whose projects to export.
    #[arg(required = true)]
    pub usernames: Vec<String>,

    /// Output directory (must exist). Default: config output_dir, else current directory.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Do not download SQLite exports.
    #[arg(long)]
    pub skip_db: bool,

    /// Do not download source code.
    #[arg(long)]
    pub skip_code: bool,

    /// Stop at the first failed export instead of continuing with the next project.
    #[arg(long)]
    pub fail_fast: bool,

    /// Suppress progress output (errors only).
    #[arg(short, long)]
    pub quiet: bool,

    /// Print verbose error chain.
    #[arg(long)]
    pub verbose: bool,

    /// HTTP User-Agent (overrides config).
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Delay between requests in seconds (overrides config; default 0).
    #[arg(long)]
    pub delay: Option<u64>,

    /// Request timeout in seconds (overrides config; default 30).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Metadata API base URL (overrides config).
    #[arg(long)]
    pub api_base: Option<String>,

    /// Export site base URL (overrides config).
    #[arg(long)]
    pub site_base: Option<String>,

    /// Look up users and list their projects without downloading anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Output directory must already exist; nothing here creates it.
fn validate_output_dir(path: &Path) -> Result<(), CliRunError> {
    if !path.is_dir() {
        return Err(CliRunError::InvalidInput(format!(
            "Cannot write output: {}: directory does not exist.",
            path.display()
        )));
    }
    Ok(())
}

/// Decide what to do with one failed operation: abort (fatal or --fail-fast) or record it.
fn triage(err: ExportError, fail_fast: bool, failed: &mut usize) -> Result<(), CliRunError> {
    if err.is_fatal() {
        return Err(CliRunError::Fatal(err));
    }
    if fail_fast {
        return Err(CliRunError::Export(err));
    }
    eprintln!("    Error: {}", err);
    *failed += 1;
    Ok(())
}

fn describe_profile(profile: &ProfileInfo, projects: &[String]) -> String {
    let mut line = format!("User {}", profile.username);
    if !profile.profile_name.is_empty() {
        line.push_str(&format!(" ({})", profile.profile_name));
    }
    if !profile.date_joined.is_empty() {
        line.push_str(&format!(", joined {}", profile.date_joined));
    }
    line.push_str(&format!(": {} project(s)", projects.len()));
    line
}

/// Project name and the SQLite path a real run would write.
fn dry_run_line(project: &str, output_dir: &Path) -> String {
    format!(
        "  {} -> {}",
        project,
        sqlite_path(project, output_dir).display()
    )
}

fn export_database(
    client: &mut ExportClient,
    project: &str,
    output_dir: &Path,
    quiet: bool,
) -> Result<DatabaseOutcome, ExportError> {
    let bar_state: RefCell<Option<indicatif::ProgressBar>> = RefCell::new(None);
    let progress_cb = |n: u64, total: u64| {
        let mut state = bar_state.borrow_mut();
        let pb = state.get_or_insert_with(|| {
            let bar = indicatif::ProgressBar::new(total);
            if let Ok(style) = indicatif::ProgressStyle::default_bar()
                .template("      {spinner} [{bar:40}] {bytes}/{total_bytes} ({elapsed})")
            {
                bar.set_style(
                    style
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                        .progress_chars("█▉▊▋▌▍▎▏ "),
                );
            }
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });
        pb.set_position(n);
    };
    let progress: Option<&dyn Fn(u64, u64)> = if quiet { None } else { Some(&progress_cb) };

    let result = get_db(client, project, output_dir, progress);

    if let Some(pb) = bar_state.borrow_mut().take() {
        pb.disable_steady_tick();
        pb.finish_and_clear();
    }
    result
}

fn report_database(outcome: &DatabaseOutcome) {
    match outcome {
        DatabaseOutcome::NoData { .. } => {
            eprintln!("    File is reportedly 0 bytes");
            eprintln!("    Skipping download, no data");
        }
        DatabaseOutcome::AlreadyComplete { advertised, .. } => {
            eprintln!("    File is reportedly {} bytes", advertised);
            eprintln!("      Skipping download, already have data");
        }
        DatabaseOutcome::Downloaded {
            path,
            advertised,
            written,
        } => {
            eprintln!("    File is reportedly {} bytes", advertised);
            eprintln!("      Wrote {} bytes to {}", written, path.display());
        }
    }
}

fn report_code(outcome: &CodeOutcome) {
    match outcome {
        CodeOutcome::NoCode => eprintln!("      Skipping writing code as there is none"),
        CodeOutcome::Written { path, bytes } => {
            eprintln!("      Wrote {} bytes of code to {}", bytes, path.display())
        }
    }
}

/// Entry point for the CLI. Returns Ok(()) on success; Err with exit code and message on failure.
pub fn run(args: &Args) -> Result<(), CliRunError> {
    if let Some(empty) = args.usernames.iter().find(|u| u.trim().is_empty()) {
        return Err(CliRunError::InvalidInput(format!(
            "Invalid username: {:?}. Usernames must not be empty.",
            empty
        )));
    }

    let config = config::load_config().map_err(CliRunError::InvalidInput)?;

    let output_dir: PathBuf = args
        .output
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.output_dir.clone()))
        .unwrap_or_else(|| PathBuf::from("."));
    validate_output_dir(&output_dir)?;

    let mut builder = ExportClient::builder();
    if let Some(secs) = args
        .delay
        .or_else(|| config.as_ref().and_then(|c| c.request_delay_secs))
    {
        builder = builder.delay_secs(secs);
    }
    if let Some(secs) = args
        .timeout
        .or_else(|| config.as_ref().and_then(|c| c.timeout_secs))
    {
        builder = builder.timeout_secs(secs);
    }
    if let Some(ua) = args
        .user_agent
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.user_agent.clone()))
    {
        builder = builder.user_agent(ua);
    }
    if let Some(base) = args
        .api_base
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.api_base_url.clone()))
    {
        builder = builder.api_base(base);
    }
    if let Some(base) = args
        .site_base
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.site_base_url.clone()))
    {
        builder = builder.site_base(base);
    }
    let mut client = builder
        .build()
        .map_err(|e| CliRunError::InvalidInput(format!("Failed to create HTTP client: {}", e)))?;

    let mut failed = 0usize;
    for username in &args.usernames {
        let profile = get_info(&mut client, username).map_err(CliRunError::Export)?;
        let projects = profile.project_names();
        if !args.quiet || args.dry_run {
            eprintln!("{}", describe_profile(&profile, &projects));
        }

        for project in &projects {
            if args.dry_run {
                eprintln!("{}", dry_run_line(project, &output_dir));
                continue;
            }
            if !args.quiet {
                eprintln!("  {}", project);
            }

            if !args.skip_db {
                match export_database(&mut client, project, &output_dir, args.quiet) {
                    Ok(outcome) if !args.quiet => report_database(&outcome),
                    Ok(_) => {}
                    Err(e) => triage(e, args.fail_fast, &mut failed)?,
                }
            }
            if !args.skip_code {
                match get_code(&mut client, project, &output_dir) {
                    Ok(outcome) if !args.quiet => report_code(&outcome),
                    Ok(_) => {}
                    Err(e) => triage(e, args.fail_fast, &mut failed)?,
                }
            }
        }
    }

    if failed > 0 {
        return Err(CliRunError::Incomplete { failed });
    }
    Ok(())
}
