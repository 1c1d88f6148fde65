use chrono::{DateTime, Local};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::Id;

use crate::{shipment::Shipment, vehicle::Vehicle};

/// Emitted once when a vehicle enters the arrival radius around the
/// destination of the shipment it carries.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArrivalEvent {
    pub vehicle_id: Id<Vehicle>,
    pub shipment_id: Id<Shipment>,
    pub distance_meters: f64,
    pub threshold_meters: f64,
    pub message: String,
    pub timestamp: DateTime<Local>,
}

impl ArrivalEvent {
    pub fn new(
        vehicle_id: Id<Vehicle>,
        shipment_id: Id<Shipment>,
        distance_meters: f64,
        threshold_meters: f64,
    ) -> Self {
        let message = format!(
            "Vehicle {} is within {:.0}m of destination for shipment {}",
            vehicle_id, threshold_meters, shipment_id
        );
        Self {
            vehicle_id,
            shipment_id,
            distance_meters,
            threshold_meters,
            message,
            timestamp: Local::now(),
        }
    }
}
