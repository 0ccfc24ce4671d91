//! Line-oriented console host.
//!
//! Drives a [`Session`] from stdin so the engine can be exercised by hand
//! against the offline fixture catalog. Each input line maps to one
//! [`Event`]; whenever the handler asks for a re-render a text summary of the
//! state is printed.
//!
//! # Configuration
//!
//! `SHIKIMORE_CONFIG` may point at a TOML config file. Without it defaults
//! apply and the catalog is read from `fixtures/catalog.json`.
//!
//! # Commands
//!
//! - `type <text>`: edit the query (debounced)
//! - `enter`: search now
//! - `esc`: clear query and results
//! - `tab [anime|manga|characters|people]`: switch content type
//! - `kind [value]`, `status [value]`: set or clear a filter
//! - `sort relevance|score|title`
//! - `genre <id>`: toggle a genre, or search by it from a detail record
//! - `genre clear`
//! - `studio <text>`: type in the studio/publisher box
//! - `studio pick <n>` / `studio ok`: take a suggestion / the typed text
//! - `studio <n>`: search by the n-th studio/publisher of a detail record
//! - `reset`: reset all filters
//! - `scroll [top]`: scroll to the bottom (or top) of the list
//! - `more`, `retry`
//! - `up`, `down`: move focus
//! - `open [n]`: open the n-th or focused item
//! - `related <n>`: open the n-th linked entity of the detail record
//! - `back`
//! - `history [n]`: list history, or search the n-th entry
//! - `clear-history`
//! - `quit`

#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};

use shikimore::app::{AppState, DetailPane, Event};
use shikimore::backend::FixtureBackend;
use shikimore::domain::{ContentType, SortOption};
use shikimore::infrastructure::store_path;
use shikimore::observability::init_tracing;
use shikimore::runtime::Session;
use shikimore::search::ScrollMetrics;
use shikimore::storage::JsonStore;
use shikimore::{Config, Result};

const DEFAULT_FIXTURES: &str = "fixtures/catalog.json";
const FIXTURE_LATENCY: Duration = Duration::from_millis(150);
const VIEWPORT_ROWS: f64 = 10.0;
const SHOWN_ITEMS: usize = 15;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = match std::env::var_os("SHIKIMORE_CONFIG") {
        Some(path) => Config::from_file(PathBuf::from(path))?,
        None => Config::default(),
    };
    init_tracing(&config);
    tracing::debug!(?config, "starting console host");

    std::fs::create_dir_all(&config.data_dir)?;
    let store = JsonStore::new(store_path(&config.data_dir))?;

    let fixtures = config
        .fixtures
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_FIXTURES));
    let backend = FixtureBackend::from_file(&fixtures)?.with_latency(FIXTURE_LATENCY);

    let mut session = Session::new(&config, Arc::new(backend), store);
    let mut host = Host::default();

    if session.dispatch(Event::Mounted)? {
        host.render(session.state());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while !session.is_finished() {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    session.dispatch(Event::Quit)?;
                    break;
                };
                match host.parse(line.trim(), session.state()) {
                    Ok(Some(event)) => {
                        if session.dispatch(event)? {
                            host.render(session.state());
                        }
                    }
                    Ok(None) => {}
                    Err(message) => println!("! {message}"),
                }
            }
            Some(event) = session.next_event() => {
                if session.dispatch(event)? {
                    host.render(session.state());
                }
            }
        }
    }

    session.unmount()?;
    Ok(())
}

/// Host-side view state: how far the simulated list is scrolled.
#[derive(Debug, Default)]
struct Host {
    at_bottom: bool,
}

impl Host {
    /// Maps a command line to an event. `Ok(None)` means the command was
    /// handled locally.
    fn parse(&mut self, line: &str, state: &AppState) -> std::result::Result<Option<Event>, String> {
        let (command, arg) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(c, a)| (c, a.trim()));
        let optional = || (!arg.is_empty()).then(|| arg.to_string());

        let event = match command {
            "" => return Ok(None),
            "type" => Event::QueryChanged(arg.to_string()),
            "enter" => Event::CommitQuery,
            "esc" => Event::ClearQuery,
            "tab" => {
                let target = if arg.is_empty() {
                    state.content_type.next()
                } else {
                    arg.parse::<ContentType>().map_err(|e| e.to_string())?
                };
                Event::ContentTypeSelected(target)
            }
            "kind" => Event::KindFilterChanged(optional()),
            "status" => Event::StatusFilterChanged(optional()),
            "sort" => Event::SortChanged(arg.parse::<SortOption>().map_err(|e| e.to_string())?),
            "genre" if arg == "clear" => Event::GenresCleared,
            "genre" => {
                let id = arg.parse::<u64>().map_err(|_| "genre needs a numeric id".to_string())?;
                if matches!(state.detail, DetailPane::Loaded(_)) {
                    Event::SearchByGenre(id)
                } else {
                    Event::GenreToggled(id)
                }
            }
            "studio" => return Self::parse_studio(arg, state).map(Some),
            "reset" => Event::FiltersReset,
            "scroll" => {
                self.at_bottom = arg != "top";
                Event::Scrolled(self.metrics(state))
            }
            "more" => Event::LoadMoreRequested,
            "retry" => Event::Retry,
            "up" => Event::FocusPrevious,
            "down" => Event::FocusNext,
            "open" => {
                let key = if arg.is_empty() {
                    state.focused.ok_or("nothing focused")?
                } else {
                    state.items().get(index(arg)?).ok_or("no such item")?.key()
                };
                Event::OpenDetail(key)
            }
            "related" => {
                let DetailPane::Loaded(detail) = &state.detail else {
                    return Err("no detail record shown".to_string());
                };
                let key = *detail.links().get(index(arg)?).ok_or("no such link")?;
                Event::OpenDetail(key)
            }
            "back" => Event::Back,
            "history" if arg.is_empty() => {
                for (i, entry) in state.history.entries().iter().enumerate() {
                    println!("  {i}. {entry}");
                }
                return Ok(None);
            }
            "history" => {
                let entry = state.history.get(index(arg)?).ok_or("no such entry")?;
                Event::HistorySelected(entry.to_string())
            }
            "clear-history" => Event::ClearHistory,
            "quit" | "q" => Event::Quit,
            other => return Err(format!("unknown command `{other}`")),
        };
        Ok(Some(event))
    }

    fn parse_studio(arg: &str, state: &AppState) -> std::result::Result<Event, String> {
        if let DetailPane::Loaded(detail) = &state.detail {
            let producer = detail
                .producers()
                .into_iter()
                .nth(index(arg)?)
                .ok_or("no such studio or publisher")?;
            return Ok(Event::SearchByStudio(producer));
        }

        match arg.split_once(' ') {
            Some(("pick", n)) => {
                let suggestion = state
                    .studio_input
                    .suggestions
                    .get(index(n)?)
                    .ok_or("no such suggestion")?;
                Ok(Event::StudioSelected(suggestion.clone()))
            }
            _ if arg == "ok" => Ok(Event::StudioCommitted),
            _ => Ok(Event::StudioInputChanged(arg.to_string())),
        }
    }

    /// One row per item; the viewport shows `VIEWPORT_ROWS` of them.
    fn metrics(&self, state: &AppState) -> ScrollMetrics {
        #[allow(clippy::cast_precision_loss)]
        let content = state.items().len() as f64;
        let offset = if self.at_bottom {
            (content - VIEWPORT_ROWS).max(0.0)
        } else {
            0.0
        };
        ScrollMetrics {
            offset,
            viewport: VIEWPORT_ROWS,
            content,
            last_item: state.items().last().map(|item| item.key()),
        }
    }

    fn render(&self, state: &AppState) {
        let search = state.search.state();
        println!(
            "[{}] query={:?} sort={} kind={} status={} genres={} studio={}",
            state.content_type,
            state.query,
            state.filters.sort.as_str(),
            state.filters.kind.as_deref().unwrap_or("-"),
            state.filters.status.as_deref().unwrap_or("-"),
            state.filters.genre_filter().as_deref().unwrap_or("-"),
            state.filters.studio.as_deref().unwrap_or("-"),
        );

        if search.loading {
            println!("  loading...");
        }
        if let Some(error) = &search.error {
            println!("  error: {error} (retry)");
        }

        for (i, item) in search.items.iter().take(SHOWN_ITEMS).enumerate() {
            let marker = if state.focused == Some(item.key()) { '>' } else { ' ' };
            let score = item.score().map_or_else(String::new, |s| format!(" ★{s:.2}"));
            let accent = state
                .accent_color(item.key())
                .map_or_else(String::new, |c| format!(" {c}"));
            println!("{marker} {i:>3}. {}{score}{accent}", item.display_title());
        }
        if search.items.len() > SHOWN_ITEMS {
            println!("      ... {} more", search.items.len() - SHOWN_ITEMS);
        }
        println!(
            "  {} items, page {}{}{}",
            search.items.len(),
            search.page,
            if search.has_more { ", more available" } else { "" },
            if search.loading_more { ", loading more" } else { "" },
        );

        if !state.studio_input.suggestions.is_empty() {
            let names: Vec<_> = state
                .studio_input
                .suggestions
                .iter()
                .map(|s| s.name.as_str())
                .collect();
            println!("  suggestions: {}", names.join(", "));
        }

        match &state.detail {
            DetailPane::Closed => {}
            DetailPane::Loading(key) => println!("  detail: loading {} #{}", key.content_type, key.id),
            DetailPane::Failed { message, .. } => println!("  detail: {message}"),
            DetailPane::Loaded(detail) => {
                println!("  detail: {}", detail.display_title());
                let genres: Vec<_> = detail
                    .genres()
                    .iter()
                    .map(|g| format!("{}#{}", g.display_name(), g.id))
                    .collect();
                if !genres.is_empty() {
                    println!("    genres: {}", genres.join(", "));
                }
                let producers: Vec<_> = detail.producers().into_iter().map(|p| p.name).collect();
                if !producers.is_empty() {
                    println!("    studios: {}", producers.join(", "));
                }
                println!(
                    "    {} linked entities, depth {}",
                    detail.links().len(),
                    state.navigator.depth()
                );
            }
        }
    }
}

fn index(arg: &str) -> std::result::Result<usize, String> {
    arg.trim()
        .parse::<usize>()
        .map_err(|_| format!("expected an index, got `{arg}`"))
}
