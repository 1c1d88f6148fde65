//! Capabilities the dispatch core needs from the rest of the system.
//!
//! Vehicle and shipment records are owned elsewhere. The core reads snapshots
//! through these traits and only ever writes back the position and speed of a
//! vehicle.

use std::{error, result, sync::Arc};

use async_trait::async_trait;
use model::{
    shipment::ShipmentDestination,
    vehicle::{Vehicle, VehicleState},
};
use serde::Serialize;
use thiserror::Error;
use utility::id::Id;

/// Channel carrying vehicle state deltas.
pub const FLEET_CHANNEL: &str = "/topic/fleet";
/// Channel carrying arrival notifications.
pub const NOTIFICATIONS_CHANNEL: &str = "/topic/notifications";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("entry not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Other(Box<dyn error::Error + Send + Sync>),
}

pub type Result<T> = result::Result<T, StoreError>;

#[async_trait]
pub trait VehicleStore: Send + Sync {
    async fn list_all(&self) -> Result<Vec<VehicleState>>;

    async fn get(&self, id: &Id<Vehicle>) -> Result<Option<VehicleState>>;

    /// Writes position and speed of `state` to the stored vehicle and returns
    /// the resulting state. Fields not part of the position update are kept.
    async fn save(&self, state: VehicleState) -> Result<VehicleState>;
}

#[async_trait]
pub trait ShipmentStore: Send + Sync {
    async fn find_in_transit_by_vehicle(
        &self,
        vehicle_id: &Id<Vehicle>,
    ) -> Result<Option<ShipmentDestination>>;

    /// Shipments assigned to the vehicle which are not delivered or cancelled,
    /// in store order.
    async fn find_assigned_to_vehicle(
        &self,
        vehicle_id: &Id<Vehicle>,
    ) -> Result<Vec<ShipmentDestination>>;
}

pub trait Database: VehicleStore + ShipmentStore + Clone + 'static {}

impl<T> Database for T where T: VehicleStore + ShipmentStore + Clone + 'static {}

/// Fire-and-forget delivery of state deltas to connected clients.
pub trait BroadcastSink: Send + Sync + 'static {
    fn publish(&self, channel: &str, payload: serde_json::Value);
}

impl<T: BroadcastSink> BroadcastSink for Arc<T> {
    fn publish(&self, channel: &str, payload: serde_json::Value) {
        self.as_ref().publish(channel, payload)
    }
}

/// Serializes `value` and publishes it. Serialization failures are logged and
/// otherwise ignored, broadcasting is best-effort.
pub fn broadcast<B, T>(sink: &B, channel: &str, value: &T)
where
    B: BroadcastSink + ?Sized,
    T: Serialize,
{
    match serde_json::to_value(value) {
        Ok(payload) => sink.publish(channel, payload),
        Err(why) => log::warn!("could not serialize payload for {}: {}", channel, why),
    }
}
