//! Issue a SELF-mode access token and store it in the configuration file.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use tracing::{error, info};

use naver_smartstore::config::{persist_access_token, DEFAULT_LOG_FILE};
use naver_smartstore::providers::naver::auth::{self, TokenRequest};
use naver_smartstore::{LogSession, NaverCommerceClient, Settings, StoreError};

/// Characters of the signature echoed to the terminal
const SIGN_PREVIEW_LEN: usize = 20;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let mut session = LogSession::start();

    let config_path = Settings::default_path();
    let loaded = Settings::load(&config_path);
    let log_path = loaded
        .as_ref()
        .map(|s| s.log_file.clone())
        .unwrap_or_else(|_| DEFAULT_LOG_FILE.into());

    if let Err(e) = session.attach(&log_path) {
        eprintln!("Cannot open log file {}: {}", log_path.display(), e);
        return ExitCode::FAILURE;
    }

    let result = loaded
        .map_err(anyhow::Error::from)
        .and_then(|settings| issue(&config_path, &settings));

    let code = match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    };

    if let Err(e) = session.close() {
        eprintln!("Cannot flush log file: {e}");
    }
    code
}

fn issue(config_path: &Path, settings: &Settings) -> anyhow::Result<()> {
    settings.validate_client()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("cannot start runtime")?;
    let client = NaverCommerceClient::new(settings)?;

    let request = TokenRequest::sign(&settings.client_id, &settings.client_secret)?;
    println!("client_id:          {}", request.client_id);
    println!("timestamp:          {}", request.timestamp);
    println!(
        "client_secret_sign: {}...",
        preview(&request.client_secret_sign, SIGN_PREVIEW_LEN)
    );

    let token = runtime.block_on(auth::issue_token(client.session(), &request))?;
    println!("access_token:       {}", token.access_token);
    if let Some(expires_in) = token.expires_in {
        println!("expires_in:         {expires_in}s");
    }

    persist_access_token(config_path, &token.access_token)?;
    info!(path = %config_path.display(), "Access token issued and saved");
    println!("Saved to {}", config_path.display());
    Ok(())
}

fn report(err: &anyhow::Error) {
    match err.downcast_ref::<StoreError>() {
        Some(StoreError::Api { status, body }) => {
            error!(status, "Token request rejected");
            eprintln!("Token request failed with status {status}");
            eprintln!("{body}");
        }
        _ => {
            error!(error = %err, "Token issuance failed");
            eprintln!("{err:#}");
        }
    }
}

fn preview(text: &str, len: usize) -> &str {
    match text.char_indices().nth(len) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
