use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::AsyncBufReadExt;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use clipview_manager::bridge::{InputEvent, StdioSurface};
use clipview_manager::config::{load_settings_from, settings_path};
use clipview_manager::focus::{FocusChannel, NativeBridge, NoFocus, NO_PROCESS};
use clipview_manager::remote::RemoteStore;
use clipview_manager::view::{Manager, ManagerConfig};

#[derive(Debug, Parser)]
#[command(name = "clipview", about = "Clipboard history view manager", version)]
struct Cli {
    /// Address of the record store.
    #[arg(long, default_value = "127.0.0.1:7878")]
    store_addr: String,

    /// Address of the native monitor companion, for focus handoff.
    #[arg(long)]
    monitor_addr: Option<String>,

    /// Process to hand focus back to on exit.
    #[arg(long, default_value_t = NO_PROCESS)]
    pid: i32,

    /// Settings file (defaults to the platform config directory).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings_from(&cli.config.unwrap_or_else(settings_path))?;
    let prefs = settings.prefs();

    let store = RemoteStore::connect(&cli.store_addr)
        .await
        .with_context(|| format!("cannot reach record store at {}", cli.store_addr))?;
    info!(addr = %cli.store_addr, "connected to record store");

    let focus: Arc<dyn FocusChannel> = match &cli.monitor_addr {
        Some(addr) => {
            let stream = tokio::net::TcpStream::connect(addr)
                .await
                .with_context(|| format!("cannot reach monitor at {addr}"))?;
            Arc::new(NativeBridge::new(stream))
        }
        None => Arc::new(NoFocus),
    };

    let surface = Arc::new(StdioSurface::stdout());
    let closed = surface.closed();
    let manager = Arc::new(Manager::new(ManagerConfig {
        store: Arc::new(store),
        surface: surface.clone(),
        clipboard: Arc::new(clipview_core::clipboard::ArboardClipboard::new()),
        focus,
        prefs,
        target_pid: cli.pid,
    }));

    manager.initialize().await?;

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = closed.notified() => break,
            line = lines.next_line() => {
                let Some(line) = line.context("stdin closed unexpectedly")? else {
                    manager.escape().await;
                    continue;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let event: InputEvent = match serde_json::from_str(&line) {
                    Ok(event) => event,
                    Err(e) => {
                        warn!("unparseable input event: {e}");
                        continue;
                    }
                };
                debug!(?event, "input");
                if let InputEvent::Confirm { accept } = event {
                    surface.resolve_confirm(accept);
                    continue;
                }
                let manager = manager.clone();
                tokio::spawn(async move {
                    if let Err(e) = dispatch(&manager, event).await {
                        warn!("event handling failed: {e}");
                    }
                });
            }
        }
    }
    Ok(())
}

async fn dispatch(manager: &Manager, event: InputEvent) -> Result<()> {
    match event {
        InputEvent::Copy { guid } => manager.copy(&guid).await,
        InputEvent::LastRow { index } => manager.reached_last_row(index).await,
        InputEvent::TogglePin { guid } => manager.toggle_pinned(&guid).await,
        InputEvent::Trash { guid } => manager.remove(&guid).await,
        InputEvent::Search { text } => manager.set_search_query(&text).await,
        InputEvent::Blur => {
            manager.blur().await;
            Ok(())
        }
        InputEvent::Escape => {
            manager.escape().await;
            Ok(())
        }
        InputEvent::Confirm { .. } => Ok(()),
    }
}
