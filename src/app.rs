//! Command implementations and the interactive browse loop

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use std::future::Future;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::debounce::Debouncer;
use crate::loader::{LoadOutcome, Loader};
use crate::persistence::{FileStorage, MemoryStorage, Storage};
use crate::player::{Playback, Player};
use crate::source::{resolve_url, HttpSource, ManifestSource};
use crate::store::{ManifestStore, RenderSignal};
use crate::view::{render_empty, GalleryView, SortKey};

/// `memory` as storage path means nothing is persisted
fn open_storage(path: Option<&Path>) -> Box<dyn Storage> {
    match path {
        Some(path) if path == Path::new("memory") => {
            info!("Using in-memory fingerprint storage");
            Box::new(MemoryStorage::new())
        }
        Some(path) => Box::new(FileStorage::open(path)),
        None => Box::new(FileStorage::open(FileStorage::default_path())),
    }
}

/// Build the store + HTTP loader described by `config`
pub fn build_loader(config: &AppConfig) -> Result<Arc<Loader<HttpSource>>> {
    let url = resolve_url(config.base_url.as_deref(), &config.manifest_url)?;
    info!(url = %url, "Manifest source");
    let source = HttpSource::new(url, config.request_timeout())?;
    let store = Arc::new(ManifestStore::new(open_storage(config.storage_path.as_deref())));
    Ok(Arc::new(Loader::new(source, store)))
}

pub fn describe_outcome(outcome: &LoadOutcome) -> String {
    match outcome {
        LoadOutcome::Adopted { fingerprint, count } => {
            format!("Loaded {count} video(s), manifest {}", fingerprint.short())
        }
        LoadOutcome::Restored { count } => format!("Loaded {count} video(s), manifest unchanged"),
        LoadOutcome::Unchanged => "Manifest unchanged".to_string(),
        LoadOutcome::Failed(e) => format!("Could not load manifest: {e}"),
    }
}

/// One load, then print the grid
pub async fn sync<S, W>(loader: &Loader<S>, force: bool, view: &GalleryView, out: &mut W) -> Result<LoadOutcome>
where
    S: ManifestSource,
    W: Write,
{
    let outcome = loader.load(force).await;
    writeln!(out, "{}", describe_outcome(&outcome))?;
    view.render(out, &loader.store().current_entries())?;
    Ok(outcome)
}

/// Resolve playback for the manifest entry at `index`
pub async fn play<S, W>(loader: &Loader<S>, index: usize, out: &mut W) -> Result<Playback>
where
    S: ManifestSource,
    W: Write,
{
    if let LoadOutcome::Failed(e) = loader.load(false).await {
        bail!("Could not load manifest: {e}");
    }
    let entries = loader.store().current_entries();
    let entry = entries
        .get(index)
        .with_context(|| format!("No video at index {index} ({} in manifest)", entries.len()))?;
    let Some(playback) = Playback::resolve(entry) else {
        bail!("'{}' has no file or embed to play", entry.display_title());
    };
    write!(out, "{playback}")?;
    Ok(playback)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum BrowseCommand {
    Search(String),
    Sort(SortKey),
    Refresh,
    Play(usize),
    Close,
    Status,
    Help,
    Quit,
}

impl BrowseCommand {
    fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        if let Some(query) = line.strip_prefix('/') {
            return Ok(Self::Search(query.to_string()));
        }

        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or("");
        let arg = words.next();
        match (command, arg) {
            ("sort", Some(key)) => SortKey::from_str(key, true)
                .map(Self::Sort)
                .map_err(|_| format!("Unknown sort key '{key}' (document, title)")),
            ("refresh", None) => Ok(Self::Refresh),
            ("play", Some(index)) => index
                .parse()
                .map(Self::Play)
                .map_err(|_| format!("Not an index: '{index}'")),
            ("close", None) => Ok(Self::Close),
            ("status", None) => Ok(Self::Status),
            ("help", None) | ("", None) => Ok(Self::Help),
            ("quit", None) | ("exit", None) => Ok(Self::Quit),
            _ => Err(format!("Unknown command '{line}', type 'help'")),
        }
    }
}

const BROWSE_HELP: &str = "\
Commands:
  /<text>        search titles and descriptions (empty clears)
  sort <key>     document | title
  refresh        reload the manifest, ignoring the cached fingerprint
  play <index>   open a video
  close          close the player
  status         show what is playing
  quit";

async fn next_tick(poll: &mut Option<Interval>) {
    match poll {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn spawn_load<S: ManifestSource + 'static>(loader: &Arc<Loader<S>>, force: bool) {
    let loader = loader.clone();
    tokio::spawn(async move {
        let outcome = loader.load(force).await;
        debug!(force, rendered = outcome.rendered(), "Background load finished");
    });
}

/// Interactive gallery
///
/// Reads commands from `input`, redraws on store notifications, polls the
/// manifest in the background and stops at end of input, `quit` or `shutdown`.
pub async fn browse<S, R, W>(
    loader: Arc<Loader<S>>,
    config: &AppConfig,
    input: R,
    out: &mut W,
    shutdown: impl Future<Output = ()>,
) -> Result<()>
where
    S: ManifestSource + 'static,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let store = loader.store().clone();
    let mut render_rx = store.subscribe();
    let mut view = GalleryView::default();
    let mut player = Player::new();
    let mut debouncer = Debouncer::new(config.search_debounce());
    let (query_tx, mut query_rx) = mpsc::unbounded_channel::<String>();
    let mut lines = input.lines();

    let mut poll = config.poll_interval().map(|period| {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });

    let outcome = loader.load(false).await;
    writeln!(out, "{}", describe_outcome(&outcome))?;

    let mut shutdown = std::pin::pin!(shutdown);
    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }

            changed = render_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let signal = *render_rx.borrow_and_update();
                match signal {
                    RenderSignal::Entries { generation } => {
                        debug!(generation, "Rendering gallery");
                        view.render(out, &store.current_entries())?;
                    }
                    RenderSignal::Empty { generation } => {
                        debug!(generation, "Rendering empty state");
                        render_empty(out)?;
                    }
                    RenderSignal::Idle => {}
                }
            }

            Some(query) = query_rx.recv() => {
                debug!(query = %query, "Applying search");
                view.set_query(query);
                view.render(out, &store.current_entries())?;
            }

            _ = next_tick(&mut poll) => {
                debug!("Polling manifest");
                spawn_load(&loader, false);
            }

            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                match BrowseCommand::parse(&line) {
                    Ok(BrowseCommand::Search(query)) => {
                        let tx = query_tx.clone();
                        debouncer.schedule(async move {
                            let _ = tx.send(query);
                        });
                    }
                    Ok(BrowseCommand::Sort(key)) => {
                        view.set_sort(key);
                        view.render(out, &store.current_entries())?;
                    }
                    Ok(BrowseCommand::Refresh) => {
                        writeln!(out, "Refreshing...")?;
                        spawn_load(&loader, true);
                    }
                    Ok(BrowseCommand::Play(index)) => {
                        let entries = store.current_entries();
                        match entries.get(index) {
                            None => writeln!(out, "No video at index {index}")?,
                            Some(entry) => match player.open(entry) {
                                Some(playback) => write!(out, "{playback}")?,
                                None => writeln!(out, "'{}' has nothing to play", entry.display_title())?,
                            },
                        }
                    }
                    Ok(BrowseCommand::Close) => {
                        if player.close().is_some() {
                            writeln!(out, "Player closed")?;
                        }
                    }
                    Ok(BrowseCommand::Status) => match player.current() {
                        Some(playback) => write!(out, "{playback}")?,
                        None => writeln!(out, "Nothing playing, {} video(s) loaded", store.current_entries().len())?,
                    },
                    Ok(BrowseCommand::Help) => writeln!(out, "{BROWSE_HELP}")?,
                    Ok(BrowseCommand::Quit) => break,
                    Err(message) => {
                        warn!(input = %line, "Rejected browse command");
                        writeln!(out, "{message}")?;
                    }
                }
            }
        }
    }

    if debouncer.is_pending() {
        debug!("Dropping pending search");
    }
    debouncer.cancel();
    player.close();
    Ok(())
}
