//! Greedy nearest-neighbor ordering of the stops of a single vehicle.
//!
//! Each step scans all remaining stops, so ordering is quadratic in the number
//! of stops. That is fine for the tens of stops a vehicle carries but not for
//! fleet-wide planning. Vehicle capacity is not considered, callers filter the
//! stops beforehand.

use model::{stop::Stop, WithDistance};
use schemars::JsonSchema;
use serde::Serialize;
use utility::geo::{distance_meters, Coordinate, ValidationError};

/// Orders `stops` by repeatedly visiting the nearest unvisited stop, starting
/// at `origin`. If two stops are equally near, the one that comes first in
/// `stops` wins, so equal input always yields equal output.
pub fn optimize_route(
    origin: Coordinate,
    stops: &[Stop],
) -> Result<Vec<Stop>, ValidationError> {
    if stops.is_empty() {
        return Ok(vec![]);
    }
    origin.validate()?;
    for stop in stops {
        stop.location.validate()?;
    }

    let mut remaining = stops.iter().collect::<Vec<_>>();
    let mut route = Vec::with_capacity(stops.len());
    let mut current = origin;

    while !remaining.is_empty() {
        let mut nearest = 0;
        let mut nearest_distance = f64::INFINITY;
        for (index, stop) in remaining.iter().enumerate() {
            let distance = distance_meters(current, stop.location)?;
            // strictly less, ties go to the earlier stop
            if distance < nearest_distance {
                nearest = index;
                nearest_distance = distance;
            }
        }
        let stop = remaining.remove(nearest);
        current = stop.location;
        route.push(stop.clone());
    }

    Ok(route)
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoutePlan {
    pub origin: Coordinate,
    /// Ordered stops, each with the length of the leg leading to it.
    pub stops: Vec<WithDistance<Stop>>,
    pub total_distance_meters: f64,
}

/// Runs `optimize_route` and annotates the result with leg distances.
pub fn plan_route(origin: Coordinate, stops: &[Stop]) -> Result<RoutePlan, ValidationError> {
    let ordered = optimize_route(origin, stops)?;

    let mut current = origin;
    let mut total_distance_meters = 0.0;
    let mut legs = Vec::with_capacity(ordered.len());
    for stop in ordered {
        let distance = distance_meters(current, stop.location)?;
        total_distance_meters += distance;
        current = stop.location;
        legs.push(WithDistance::new(distance, stop));
    }

    Ok(RoutePlan {
        origin,
        stops: legs,
        total_distance_meters,
    })
}
