//! Spawned work that completes by posting an [`Event`].
//!
//! Every function here spawns exactly one task that sends exactly one event,
//! unless the task is aborted or the session has gone away.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::app::Event;
use crate::backend::{fetch_page, fetch_suggestions, CatalogBackend};
use crate::domain::{ContentType, ItemKey};
use crate::search::{SearchRequest, TimerToken};

fn post(events: &UnboundedSender<Event>, event: Event) {
    if events.send(event).is_err() {
        tracing::trace!("session closed, dropping completion");
    }
}

pub(super) fn timer(
    events: UnboundedSender<Event>,
    token: TimerToken,
    delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        post(&events, Event::DebounceElapsed(token));
    })
}

pub(super) fn search<B: CatalogBackend>(
    backend: Arc<B>,
    events: UnboundedSender<Event>,
    request: SearchRequest,
) {
    let span = tracing::debug_span!(
        "fetch_page",
        content_type = %request.params.content_type,
        page = request.page,
        generation = request.generation
    );
    tokio::spawn(
        async move {
            let outcome = fetch_page(backend.as_ref(), &request).await;
            post(&events, Event::SearchCompleted { request, outcome });
        }
        .instrument(span),
    );
}

pub(super) fn detail<B: CatalogBackend>(
    backend: Arc<B>,
    events: UnboundedSender<Event>,
    key: ItemKey,
) {
    let span = tracing::debug_span!("get_entity", content_type = %key.content_type, id = key.id);
    tokio::spawn(
        async move {
            let outcome = backend.get_entity(key.content_type, key.id).await;
            post(&events, Event::DetailLoaded { key, outcome });
        }
        .instrument(span),
    );
}

pub(super) fn genres<B: CatalogBackend>(backend: Arc<B>, events: UnboundedSender<Event>) {
    tokio::spawn(
        async move {
            let outcome = backend.list_genres().await;
            post(&events, Event::GenresLoaded(outcome));
        }
        .instrument(tracing::debug_span!("list_genres")),
    );
}

pub(super) fn suggestions<B: CatalogBackend>(
    backend: Arc<B>,
    events: UnboundedSender<Event>,
    content_type: ContentType,
    input: String,
) {
    let span = tracing::debug_span!("fetch_suggestions", content_type = %content_type, input = %input);
    tokio::spawn(
        async move {
            let outcome = fetch_suggestions(backend.as_ref(), content_type, input.clone()).await;
            post(&events, Event::SuggestionsLoaded { input, outcome });
        }
        .instrument(span),
    );
}

pub(super) fn accent_color<B: CatalogBackend>(
    backend: Arc<B>,
    events: UnboundedSender<Event>,
    key: ItemKey,
    url: String,
) {
    tokio::spawn(
        async move {
            let outcome = backend.accent_color(url).await;
            post(&events, Event::AccentColorResolved { key, outcome });
        }
        .instrument(tracing::trace_span!("accent_color", id = key.id)),
    );
}
