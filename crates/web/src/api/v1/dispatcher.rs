use axum::{
    extract::{OriginalUri, Path, State},
    http::Method,
    routing::{get, on, post},
    Json, Router,
};
use dispatch::route::RoutePlan;

use crate::{
    common::{route_not_found, schema, RouteErrorResponse, RouteResult, METHOD_FILTER_ALL},
    WebState,
};

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/optimize/:vehicle_id", post(optimize))
        .route("/optimize/schema", get(schema::<RoutePlan>))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

async fn optimize(
    OriginalUri(original_uri): OriginalUri,
    State(WebState {
        dispatch_client, ..
    }): State<WebState>,
    Path(vehicle_id): Path<String>,
) -> RouteResult<Json<RoutePlan>> {
    let plan = dispatch_client
        .optimize_route(&vehicle_id.as_str().into())
        .await
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::POST)
                .with_uri(original_uri.path())
        })?;
    log::info!(
        "optimized route for vehicle {} over {} stops",
        vehicle_id,
        plan.stops.len()
    );
    Ok(Json(plan))
}
