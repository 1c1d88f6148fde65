use axum::{
    extract::{OriginalUri, State},
    http::Method,
    routing::{on, post},
    Json, Router,
};
use dispatch::simulator::PositionUpdate;
use serde::Deserialize;
use utility::geo::Coordinate;

use crate::{
    common::{route_not_found, RouteErrorResponse, RouteResult, METHOD_FILTER_ALL},
    WebState,
};

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/", post(report))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

/// A position pushed by a tracker on the vehicle.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TelemetryDto {
    vehicle_id: String,
    latitude: f64,
    longitude: f64,
    speed: f64,
}

async fn report(
    OriginalUri(original_uri): OriginalUri,
    State(WebState {
        dispatch_client, ..
    }): State<WebState>,
    Json(telemetry): Json<TelemetryDto>,
) -> RouteResult<Json<PositionUpdate>> {
    let update = dispatch_client
        .report_position(
            &telemetry.vehicle_id.as_str().into(),
            Coordinate::new(telemetry.latitude, telemetry.longitude),
            telemetry.speed,
        )
        .await
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::POST)
                .with_uri(original_uri.path())
        })?;
    Ok(Json(update))
}
