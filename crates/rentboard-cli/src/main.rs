// SPDX-License-Identifier: AGPL-3.0
// Rentboard CLI - Terminal listing browser

use rentboard_cli::shell::{stdin_lines, HELP};
use rentboard_cli::{render, ApiClient, Command, Flow, Shell, TerminalPlatform};
use rentboard_core::{
    Browser, FileSessionStorage, MemoryStorage, RestoreOutcome, SessionStorage, SettingsStore,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Overrides the configured API base URL
const API_URL_ENV: &str = "RENTBOARD_API_URL";

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rentboard_cli=info,rentboard_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Rentboard v{}", env!("CARGO_PKG_VERSION"));

    let store = match SettingsStore::new() {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            tracing::warn!("Settings unavailable, using defaults: {}", e);
            None
        }
    };
    let mut settings = store.as_ref().map(|s| s.get()).unwrap_or_default();
    if let Ok(url) = std::env::var(API_URL_ENV) {
        tracing::info!("Using API from {}: {}", API_URL_ENV, url);
        settings.api_base_url = url;
    }

    let storage: Arc<dyn SessionStorage> = match FileSessionStorage::new() {
        Ok(storage) => Arc::new(storage),
        Err(e) => {
            tracing::warn!("Session will not survive restarts: {}", e);
            Arc::new(MemoryStorage::new())
        }
    };

    let client = match ApiClient::new(&settings) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let browser = Arc::new(
        Browser::new(settings, client.clone(), storage, client)
            .with_platform(Arc::new(TerminalPlatform::detect())),
    );

    match browser.restore().await {
        RestoreOutcome::Restored { criteria, .. } => {
            println!("Restored search {:?}", criteria);
            println!("{}", render::render_view(&browser.active_view()));
        }
        _ => println!("{}", HELP),
    }

    let mut shell = Shell::new(browser);
    if let Some(store) = store {
        shell = shell.with_settings(store);
    }
    let lines = stdin_lines();

    while let Ok(line) = lines.recv().await {
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<Command>() {
            Ok(command) => match shell.execute(command).await {
                Flow::Continue(output) => println!("{}", output),
                Flow::Quit => break,
            },
            Err(e) => println!("{}", e),
        }
    }

    tracing::info!("Goodbye");
    ExitCode::SUCCESS
}
