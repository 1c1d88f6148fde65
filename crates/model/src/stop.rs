use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::{geo::Coordinate, id::Id};

use crate::shipment::{Shipment, ShipmentDestination};

/// A delivery stop on a vehicle's route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub shipment_id: Id<Shipment>,
    pub location: Coordinate,
}

impl Stop {
    pub fn new(shipment_id: Id<Shipment>, location: Coordinate) -> Self {
        Self {
            shipment_id,
            location,
        }
    }
}

impl From<ShipmentDestination> for Stop {
    fn from(destination: ShipmentDestination) -> Self {
        Self::new(destination.id, destination.location)
    }
}
