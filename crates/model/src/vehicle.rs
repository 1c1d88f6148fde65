use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::{
    geo::Coordinate,
    id::{HasId, Id},
};

use crate::WithId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStatus {
    Idle,
    InTransit,
    Maintenance,
}

/// The full vehicle record as kept by a vehicle store.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub name: String,
    pub plate: String,
    pub driver: Option<String>,
    pub location: Coordinate,
    /// km/h
    pub speed: f64,
    pub fuel: f64,
    pub mileage: f64,
    pub last_service: Option<String>,
    pub temperature: Option<f64>,
    pub status: VehicleStatus,
    /// kg
    pub max_capacity: f64,
}

impl HasId for Vehicle {
    type IdType = String;
}

impl Vehicle {
    /// Copies the fields owned by the dispatch core (position and speed) from
    /// `state`. Everything else is left as it is.
    pub fn apply(&mut self, state: &VehicleState) {
        self.location = state.location;
        self.speed = state.speed;
    }
}

impl WithId<Vehicle> {
    pub fn state(&self) -> VehicleState {
        VehicleState {
            id: self.id.clone(),
            location: self.content.location,
            speed: self.content.speed,
            status: self.content.status,
        }
    }
}

/// The part of a vehicle the dispatch core reads and writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehicleState {
    pub id: Id<Vehicle>,
    pub location: Coordinate,
    pub speed: f64,
    pub status: VehicleStatus,
}

impl VehicleState {
    pub fn is_in_transit(&self) -> bool {
        self.status == VehicleStatus::InTransit
    }
}
