//! Edge-triggered arrival detection.
//!
//! For every (vehicle, shipment) pair the monitor remembers whether the
//! vehicle is currently inside the arrival radius. A notification is produced
//! only when a pair moves from outside to inside. Leaving the radius resets the
//! pair, so a later approach notifies again.
//!
//! The state lives in memory only. After a restart every pair starts outside,
//! which can drop the notification for a vehicle that was already inside.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use model::{
    event::ArrivalEvent,
    shipment::{Shipment, ShipmentStatus},
    vehicle::Vehicle,
};
use utility::{
    geo::{distance_meters, Coordinate, ValidationError},
    id::Id,
};

/// Default arrival radius in meters.
pub const ARRIVAL_THRESHOLD_METERS: f64 = 800.0;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeofenceKey {
    pub vehicle_id: Id<Vehicle>,
    pub shipment_id: Id<Shipment>,
}

impl GeofenceKey {
    pub fn new(vehicle_id: Id<Vehicle>, shipment_id: Id<Shipment>) -> Self {
        Self {
            vehicle_id,
            shipment_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeofenceState {
    /// Outside the radius, or never evaluated.
    #[default]
    None,
    /// Inside the radius, the notification for this approach was sent.
    Armed,
}

#[derive(Debug)]
pub struct GeofenceMonitor {
    threshold_meters: f64,
    states: Mutex<HashMap<GeofenceKey, GeofenceState>>,
}

impl Default for GeofenceMonitor {
    fn default() -> Self {
        Self::new(ARRIVAL_THRESHOLD_METERS)
    }
}

impl GeofenceMonitor {
    pub fn new(threshold_meters: f64) -> Self {
        Self {
            threshold_meters,
            states: Mutex::new(HashMap::new()),
        }
    }

    pub fn threshold_meters(&self) -> f64 {
        self.threshold_meters
    }

    pub fn state(&self, key: &GeofenceKey) -> GeofenceState {
        self.lock().get(key).copied().unwrap_or_default()
    }

    /// Number of pairs evaluated so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evaluates one vehicle/shipment pair and returns an event if the vehicle
    /// just entered the arrival radius. Shipments that are not in transit are
    /// ignored without touching any state.
    pub fn evaluate(
        &self,
        vehicle_position: Coordinate,
        vehicle_id: &Id<Vehicle>,
        destination: Coordinate,
        shipment_id: &Id<Shipment>,
        shipment_status: ShipmentStatus,
    ) -> Result<Option<ArrivalEvent>, ValidationError> {
        if shipment_status != ShipmentStatus::InTransit {
            return Ok(None);
        }
        let distance = distance_meters(vehicle_position, destination)?;
        let inside = distance <= self.threshold_meters;

        let mut states = self.lock();
        let state = states
            .entry(GeofenceKey::new(vehicle_id.clone(), shipment_id.clone()))
            .or_default();

        match (*state, inside) {
            (GeofenceState::None, true) => {
                *state = GeofenceState::Armed;
                log::info!(
                    "geofence trigger: vehicle {} is nearing destination for shipment {} ({:.0}m)",
                    vehicle_id,
                    shipment_id,
                    distance
                );
                Ok(Some(ArrivalEvent::new(
                    vehicle_id.clone(),
                    shipment_id.clone(),
                    distance,
                    self.threshold_meters,
                )))
            }
            (GeofenceState::Armed, true) => Ok(None),
            (_, false) => {
                *state = GeofenceState::None;
                Ok(None)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<GeofenceKey, GeofenceState>> {
        // the map is consistent after every single write, so a poisoned lock
        // is still safe to use
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
