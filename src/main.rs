//! Headless shell and entry point.
//!
//! Drives the client core from a terminal: each input line is parsed into an
//! [`Event`], dispatched, and the resulting document is printed as HTML.
//!
//! # Lifecycle
//!
//! 1. **Load**: Read `~/.config/pawfeed/config.toml` plus `PAWFEED_*` overrides
//! 2. **Trace**: Initialize file logging under the data directory
//! 3. **Wire**: Build the platform adapters and the [`App`]
//! 4. **Start**: Restore the session and resolve the initial route
//! 5. **Loop**: Read commands until `quit` or end of input
//!
//! # Commands
//!
//! ```text
//! go /dog/nelli-1      click <id|/href> back | forward
//! open new-post        close             search <query>
//! login <email> <pw>   logout            follow | unfollow <dog-id>
//! send <conv-id> <msg> onboarded         invite
//! ```
//!
//! Errors from a single command are logged and reported, then the loop
//! continues; the shell only exits on setup failures.

use pawfeed::api::ReqwestTransport;
use pawfeed::features::UnconfiguredIdentityProvider;
use pawfeed::infrastructure::{data_dir, default_config_file, storage_file};
use pawfeed::navigation::{History, MemoryHistory};
use pawfeed::observability::init_tracing;
use pawfeed::storage::JsonFileStore;
use pawfeed::{handle_event, App, Config, Event, Platform, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

fn print_document(app: &App) {
    println!("{}", app.document().to_html());
    for toast in app.toasts().drain() {
        println!("[{:?}] {}", toast.level, toast.message);
    }
}

async fn run() -> Result<()> {
    let config = Config::load(default_config_file().as_deref())?;
    let data_dir = data_dir(config.data_dir.as_deref())?;
    init_tracing(&config, &data_dir);
    tracing::info!(api = %config.api_base_url, data_dir = %data_dir.display(), "pawfeed shell starting");

    let history: Arc<dyn History> = Arc::new(MemoryHistory::new("/"));
    let platform = Platform {
        history: history.clone(),
        store: Arc::new(JsonFileStore::new(storage_file(&data_dir))?),
        transport: Arc::new(ReqwestTransport::new(config.request_timeout())?),
        identity: Arc::new(UnconfiguredIdentityProvider),
    };
    let mut app = App::new(&config, platform)?;

    match app.api().health().await {
        Ok(health) => tracing::info!(status = %health.status, version = ?health.version, "API reachable"),
        Err(e) => {
            tracing::warn!(error = %e, "API health check failed");
            app.toasts().error(e.user_message());
        }
    }

    if let Err(e) = handle_event(&mut app, &Event::Start).await {
        tracing::error!(error = %e, "initial route failed");
    }
    print_document(&app);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }

        let event = match line.parse::<Event>() {
            Ok(event) => event,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        match handle_event(&mut app, &event).await {
            Ok(true) => print_document(&app),
            Ok(false) => tracing::debug!(?event, "event changed nothing"),
            Err(e) if e.is_expected() => {
                tracing::info!(error = %e, ?event, "event failed");
                print_document(&app);
            }
            Err(e) => {
                tracing::error!(error = %e, ?event, "event failed");
                eprintln!("error: {e}");
            }
        }
        println!("location: {}", history.location());
    }

    app.poller().stop();
    tracing::info!("pawfeed shell exiting");
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("pawfeed: {e}");
        std::process::exit(1);
    }
}
