//! CLI entry point for the vaultfetch tool.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use dialoguer::{Confirm, Input, Password, Select};
use tracing::{debug, error, info, warn};

use vaultfetch_core::{
    AuthError, CatalogClient, CredentialPrompt, Credentials, DownloadOutcome, DownloadRequest,
    Downloader, ExpectedPayload, HeadVerifier, ListingRow, PageWalker, RandomizedDelay,
    RedirectOrHtmlPolicy, Session, find_latest_csvs, response_expired,
};

mod cli;

use cli::{Args, MenuChoice};

/// Collects credentials from the terminal.
struct TerminalPrompt;

impl CredentialPrompt for TerminalPrompt {
    fn credentials(&self) -> Result<Credentials, AuthError> {
        let email: String = Input::new()
            .with_prompt("Email")
            .interact_text()
            .map_err(|e| AuthError::prompt(e.to_string()))?;
        let password = Password::new()
            .with_prompt("Password")
            .interact()
            .map_err(|e| AuthError::prompt(e.to_string()))?;
        Ok(Credentials { email, password })
    }

    fn retry_after_rejection(&self) -> bool {
        Confirm::new()
            .with_prompt("Login rejected. Try again?")
            .default(true)
            .interact()
            .unwrap_or(false)
    }
}

/// Aborts a download when the response looks like an expired session.
struct ExpiryVerifier {
    policy: RedirectOrHtmlPolicy,
}

impl HeadVerifier for ExpiryVerifier {
    fn verify(&self, response: &reqwest::Response) -> bool {
        !response_expired(&self.policy, response, ExpectedPayload::Binary)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(base_url = %args.base_url, "CLI arguments parsed");
    info!("vaultfetch starting");

    report_latest_exports(args.output_dir.as_deref().unwrap_or(Path::new(".")));

    let delay = RandomizedDelay::new(
        Duration::from_millis(args.delay_min),
        Duration::from_millis(args.delay_max),
    );
    let mut session = Session::new(args.base_url.clone());
    let catalog = CatalogClient::new(PageWalker::new(Box::new(delay)));
    let downloader = Downloader::new();

    loop {
        let labels: Vec<&str> = MenuChoice::ALL.iter().map(|c| c.label()).collect();
        let picked = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;
        let choice = MenuChoice::ALL[picked];

        if choice == MenuChoice::Exit {
            break;
        }

        // Keep the menu alive across per-action failures.
        if let Err(e) = run_choice(choice, &mut session, &catalog, &downloader, &args).await {
            error!(error = %e, "action failed, returning to menu");
        }
    }

    info!("goodbye");
    Ok(())
}

/// Logs the newest saved CSV export per catalog kind, when present.
fn report_latest_exports(dir: &Path) {
    match find_latest_csvs(dir) {
        Ok(latest) => {
            if let Some(path) = latest.movies {
                info!(file = %path.display(), "latest movies export");
            }
            if let Some(path) = latest.shows {
                info!(file = %path.display(), "latest shows export");
            }
        }
        Err(e) => debug!(error = %e, dir = %dir.display(), "could not scan for exports"),
    }
}

/// Runs one menu action end to end: list, pick, download.
async fn run_choice(
    choice: MenuChoice,
    session: &mut Session,
    catalog: &CatalogClient,
    downloader: &Downloader,
    args: &Args,
) -> Result<()> {
    let Some(kind) = choice.kind() else {
        return Ok(());
    };

    let rows: Vec<ListingRow> = if choice.is_search() {
        let query: String = Input::new().with_prompt("Search for").interact_text()?;
        let outcome = catalog.search(session, &query, kind).await?;
        if !outcome.failed_pages.is_empty() {
            warn!(
                pages = ?outcome.failed_pages,
                "some result pages could not be fetched; results are partial"
            );
        }
        if outcome.is_empty() {
            info!(kind = %kind, query = %query, "no results");
            return Ok(());
        }
        outcome.rows
    } else {
        catalog.recents(session, kind).await?
    };

    // Only rows with a usable download link are offered.
    let rows: Vec<ListingRow> = rows
        .into_iter()
        .filter(|row| row.download_link.is_some())
        .collect();
    if rows.is_empty() {
        info!(kind = %kind, "nothing downloadable found");
        return Ok(());
    }

    let mut labels: Vec<String> = rows
        .iter()
        .map(|row| format!("[{}] {}", row.id, row.name))
        .collect();
    labels.push("Back".to_string());

    let picked = Select::new()
        .with_prompt(format!("{} result(s); pick one to download", rows.len()))
        .items(&labels)
        .default(0)
        .interact()?;
    if picked == rows.len() {
        return Ok(());
    }

    download_with_reauth(session, downloader, &rows[picked], args).await
}

/// Downloads the row's file, re-authenticating and retrying once when the
/// pre-flight check detects an expired session.
async fn download_with_reauth(
    session: &mut Session,
    downloader: &Downloader,
    row: &ListingRow,
    args: &Args,
) -> Result<()> {
    let Some(link) = &row.download_link else {
        return Ok(());
    };
    let prompt = TerminalPrompt;

    for attempt in 1..=2 {
        if !session.ensure_authenticated(&prompt).await? {
            info!("no login, skipping download");
            return Ok(());
        }

        let mut request = DownloadRequest::new(link.as_str());
        request.destination = args.output_dir.as_deref();
        request.show_progress_bar = !args.quiet;
        let verifier = ExpiryVerifier {
            policy: RedirectOrHtmlPolicy,
        };
        request.head_verifier = Some(&verifier);

        match downloader.download(session, request).await? {
            DownloadOutcome::Completed { path, bytes } => {
                info!(path = %path.display(), bytes, name = %row.name, "saved");
                return Ok(());
            }
            DownloadOutcome::Aborted if attempt == 1 => {
                warn!("session expired mid-flight, logging in again");
                session.mark_expired();
            }
            DownloadOutcome::Aborted => {
                warn!(name = %row.name, "download still rejected after re-login, giving up");
                return Ok(());
            }
        }
    }
    Ok(())
}
