//! HTTP surface for the tweet stream.
//!
//! Thin protocol glue over the core: JSON body parsing, status mapping, and
//! Server-Sent-Events framing. All state lives in [`AppState`] and is handed
//! to the handlers by axum; there are no ambient globals.

use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};

use crate::broadcast::{Broadcaster, Subscription};
use crate::fingerprint::fingerprint;
use crate::store::{StoreError, TweetStore};
use crate::types::{PublishedTweet, ServerOptions, Tweet};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TweetStore>,
    pub broadcaster: Arc<Broadcaster>,
    pub options: ServerOptions,
}

impl AppState {
    pub fn new(options: ServerOptions) -> Self {
        let store = match options.max_tweets {
            Some(limit) => TweetStore::bounded(limit),
            None => TweetStore::new(),
        };
        Self {
            store,
            broadcaster: Broadcaster::new(),
            options,
        }
    }
}

/// Inbound create body: `{"tweet": {"message": ..., "avatar": ...}}`.
#[derive(Debug, Deserialize)]
struct CreateTweetRequest {
    tweet: Tweet,
}

/// Outbound list body: `{"tweets": [...]}`.
#[derive(Debug, Serialize)]
struct TweetList {
    tweets: Vec<PublishedTweet>,
}

/// Create the router with all tweet endpoints.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers(Any);

    Router::new()
        .route("/tweets", post(handle_create).get(handle_tweets))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

async fn handle_health() -> &'static str {
    "OK"
}

/// POST /tweets - create a tweet and publish it to every live subscriber.
async fn handle_create(State(state): State<AppState>, body: Bytes) -> Response {
    let request: CreateTweetRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            debug!(error = %e, "rejected malformed tweet body");
            return (StatusCode::BAD_REQUEST, format!("Invalid tweet body: {e}")).into_response();
        }
    };

    let tweet = request.tweet;
    let id = match state.store.insert(tweet.clone()) {
        Ok(id) => id,
        // Nothing was committed, so nothing is published.
        Err(e @ StoreError::Exhausted(_)) => {
            warn!(error = %e, "tweet not created");
            return (StatusCode::CONFLICT, e.to_string()).into_response();
        }
    };

    let published = Arc::new(PublishedTweet::new(id, &tweet));
    let delivered = state.broadcaster.publish(Arc::clone(&published));
    debug!(%id, delivered, "created tweet");

    (
        StatusCode::CREATED,
        [(header::LOCATION, published.location())],
        Json(published.as_ref().clone()),
    )
        .into_response()
}

/// GET /tweets - snapshot with fingerprint, or a live SSE session when the
/// client asks for an event stream.
async fn handle_tweets(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if wants_event_stream(&headers) {
        handle_stream(state).await
    } else {
        handle_list(state, headers).await
    }
}

fn wants_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .map(|accept| accept.contains("text/event-stream"))
        .unwrap_or(false)
}

/// Snapshot read. The fingerprint is computed over the same snapshot instance
/// that is serialized, so the validator can never disagree with the body.
async fn handle_list(state: AppState, headers: HeaderMap) -> Response {
    let snapshot = state.store.snapshot();
    let etag = format!("\"{}\"", fingerprint(&snapshot));

    let if_none_match = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok());
    if if_none_match == Some(etag.as_str()) {
        return (StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response();
    }

    let tweets = snapshot
        .iter()
        .map(|(id, tweet)| PublishedTweet::new(*id, tweet))
        .collect();

    (
        StatusCode::OK,
        [(header::ETAG, etag)],
        Json(TweetList { tweets }),
    )
        .into_response()
}

/// Open a streaming session: one SSE event per tweet published from now on.
async fn handle_stream(state: AppState) -> Response {
    let subscription = match state.broadcaster.subscribe() {
        Ok(subscription) => subscription,
        Err(e) => {
            warn!(error = %e, "could not open stream");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };
    info!(
        subscribers = state.broadcaster.subscriber_count(),
        "stream opened"
    );

    Sse::new(tweet_event_stream(subscription))
        .keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(state.options.keep_alive_seconds))
                .text("keepalive"),
        )
        .into_response()
}

/// Adapt a subscription into SSE events.
///
/// Each tweet becomes one `id:`/`data:` block, with the decimal identifier as
/// the event id and the tweet JSON as the data line. The stream ends when the
/// subscription terminates; dropping it (client disconnect) unregisters the
/// subscriber.
pub fn tweet_event_stream(
    mut subscription: Subscription,
) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        while let Some(tweet) = subscription.next_event().await {
            match serde_json::to_string(&*tweet) {
                Ok(data) => yield Ok(Event::default().id(tweet.id.to_string()).data(data)),
                Err(e) => warn!(error = %e, "skipping unserializable tweet"),
            }
        }
    }
}

/// Start the server.
pub async fn start_server(options: ServerOptions) -> std::io::Result<()> {
    let state = AppState::new(options.clone());
    let broadcaster = Arc::clone(&state.broadcaster);
    let router = create_router(state);

    let addr = format!("{}:{}", options.host, options.port);
    info!("Starting tweet streaming server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown requested, closing live streams");
            broadcaster.shutdown();
        })
        .await?;

    Ok(())
}
