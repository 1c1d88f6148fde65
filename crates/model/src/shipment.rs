use chrono::{DateTime, Local};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::{
    geo::Coordinate,
    id::{HasId, Id},
};

use crate::{vehicle::Vehicle, WithId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
    Pending,
    InTransit,
    Delivered,
    Cancelled,
}

impl ShipmentStatus {
    /// Whether the shipment still has to be delivered.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::InTransit)
    }
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    pub customer: String,
    pub recipient_name: String,
    pub origin: String,
    pub destination: String,
    pub destination_address: Option<String>,
    pub weight: Option<String>,
    pub status: ShipmentStatus,
    pub destination_location: Coordinate,
    pub assigned_vehicle: Option<Id<Vehicle>>,
    pub estimated_delivery: Option<DateTime<Local>>,
}

impl HasId for Shipment {
    type IdType = String;
}

impl WithId<Shipment> {
    pub fn destination(&self) -> ShipmentDestination {
        ShipmentDestination {
            id: self.id.clone(),
            location: self.content.destination_location,
            status: self.content.status,
        }
    }
}

/// The part of a shipment the dispatch core needs: where it goes and
/// whether it is under way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentDestination {
    pub id: Id<Shipment>,
    pub location: Coordinate,
    pub status: ShipmentStatus,
}
