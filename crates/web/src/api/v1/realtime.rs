use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, on},
    Router,
};
use dispatch::store::{FLEET_CHANNEL, NOTIFICATIONS_CHANNEL};
use futures::Stream;
use tokio_stream::{
    wrappers::{errors::BroadcastStreamRecvError, BroadcastStream},
    StreamExt as _,
};
use tower_http::trace::TraceLayer;

use crate::{
    broadcast::ChannelSink,
    common::{route_not_found, METHOD_FILTER_ALL},
    WebState,
};

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::v1::resource!("/realtime{}", format_args!($($arg)*))
    };
}

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/", get(channels))
        .route("/fleet", get(fleet))
        .route("/notifications", get(notifications))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

async fn channels() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "fleet": resource!("/fleet"),
        "notifications": resource!("/notifications"),
    }))
}

async fn fleet(
    State(WebState { broadcast, .. }): State<WebState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    channel_events(&broadcast, FLEET_CHANNEL)
}

async fn notifications(
    State(WebState { broadcast, .. }): State<WebState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    channel_events(&broadcast, NOTIFICATIONS_CHANNEL)
}

/// Streams every message published on `channel` from now on.
fn channel_events(
    sink: &ChannelSink,
    channel: &'static str,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    log::debug!("client subscribed to {}", channel);
    let stream = BroadcastStream::new(sink.subscribe())
        .filter_map(move |message| match message {
            Ok(envelope) if envelope.channel == channel => {
                match Event::default().event(channel).json_data(&envelope.payload) {
                    Ok(event) => Some(event),
                    Err(why) => {
                        log::warn!("could not encode event for {}: {}", channel, why);
                        None
                    }
                }
            }
            Ok(_) => None,
            Err(BroadcastStreamRecvError::Lagged(missed)) => {
                log::warn!("realtime client on {} missed {} messages", channel, missed);
                None
            }
        })
        .map(Ok);

    Sse::new(stream).keep_alive(KeepAlive::default())
}
