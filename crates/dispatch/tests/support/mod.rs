#![allow(dead_code)]

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use dispatch::store::{self, BroadcastSink, ShipmentStore, StoreError, VehicleStore};
use indexmap::IndexMap;
use model::{
    shipment::{ShipmentDestination, ShipmentStatus},
    vehicle::{Vehicle, VehicleState, VehicleStatus},
};
use tokio::sync::{Notify, Semaphore};
use utility::{geo::Coordinate, id::Id};

#[derive(Default)]
struct Inner {
    vehicles: IndexMap<String, VehicleState>,
    shipments: Vec<(Id<Vehicle>, ShipmentDestination)>,
    failing: HashSet<String>,
    saves: usize,
    list_delay: Duration,
    list_panics: usize,
    latch: Option<SaveLatch>,
}

/// Keeps saves waiting until released.
#[derive(Clone)]
pub struct SaveLatch {
    entered: Arc<Notify>,
    release: Arc<Semaphore>,
}

impl SaveLatch {
    /// Resolves once a save is waiting on the latch.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.release.add_permits(1024);
    }
}

/// In-memory stores with switchable write failures per vehicle.
#[derive(Clone, Default)]
pub struct MockDatabase {
    inner: Arc<Mutex<Inner>>,
}

impl MockDatabase {
    pub fn with_vehicle(self, id: &str, location: Coordinate, speed: f64, status: VehicleStatus) -> Self {
        self.inner.lock().unwrap().vehicles.insert(
            id.to_owned(),
            VehicleState {
                id: id.into(),
                location,
                speed,
                status,
            },
        );
        self
    }

    pub fn with_shipment(
        self,
        vehicle: &str,
        shipment: &str,
        destination: Coordinate,
        status: ShipmentStatus,
    ) -> Self {
        self.inner.lock().unwrap().shipments.push((
            vehicle.into(),
            ShipmentDestination {
                id: shipment.into(),
                location: destination,
                status,
            },
        ));
        self
    }

    pub fn fail_saves_for(&self, id: &str) {
        self.inner.lock().unwrap().failing.insert(id.to_owned());
    }

    pub fn heal(&self, id: &str) {
        self.inner.lock().unwrap().failing.remove(id);
    }

    /// Lets `list_all` take its snapshot and then wait before returning it.
    pub fn delay_listing(&self, delay: Duration) {
        self.inner.lock().unwrap().list_delay = delay;
    }

    pub fn panic_on_next_listing(&self) {
        self.inner.lock().unwrap().list_panics += 1;
    }

    pub fn hold_saves(&self) -> SaveLatch {
        let latch = SaveLatch {
            entered: Arc::new(Notify::new()),
            release: Arc::new(Semaphore::new(0)),
        };
        self.inner.lock().unwrap().latch = Some(latch.clone());
        latch
    }

    pub fn vehicle(&self, id: &str) -> VehicleState {
        self.inner.lock().unwrap().vehicles[id].clone()
    }

    pub fn set_location(&self, id: &str, location: Coordinate) {
        self.inner.lock().unwrap().vehicles[id].location = location;
    }

    pub fn saves(&self) -> usize {
        self.inner.lock().unwrap().saves
    }
}

#[async_trait]
impl VehicleStore for MockDatabase {
    async fn list_all(&self) -> store::Result<Vec<VehicleState>> {
        let (vehicles, delay) = {
            let mut inner = self.inner.lock().unwrap();
            if inner.list_panics > 0 {
                inner.list_panics -= 1;
                drop(inner);
                panic!("vehicle listing exploded");
            }
            let vehicles = inner.vehicles.values().cloned().collect::<Vec<_>>();
            (vehicles, inner.list_delay)
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(vehicles)
    }

    async fn get(&self, id: &Id<Vehicle>) -> store::Result<Option<VehicleState>> {
        Ok(self.inner.lock().unwrap().vehicles.get(id.raw_ref::<str>()).cloned())
    }

    async fn save(&self, state: VehicleState) -> store::Result<VehicleState> {
        let latch = self.inner.lock().unwrap().latch.clone();
        if let Some(latch) = latch {
            latch.entered.notify_one();
            let _ = latch.release.acquire().await;
        }

        let mut inner = self.inner.lock().unwrap();
        if inner.failing.contains(state.id.raw_ref::<str>()) {
            return Err(StoreError::Unavailable(format!("write to {} refused", state.id)));
        }
        inner.saves += 1;
        let stored = inner
            .vehicles
            .get_mut(state.id.raw_ref::<str>())
            .ok_or(StoreError::NotFound)?;
        stored.location = state.location;
        stored.speed = state.speed;
        Ok(stored.clone())
    }
}

#[async_trait]
impl ShipmentStore for MockDatabase {
    async fn find_in_transit_by_vehicle(
        &self,
        vehicle_id: &Id<Vehicle>,
    ) -> store::Result<Option<ShipmentDestination>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .shipments
            .iter()
            .find(|(vehicle, shipment)| {
                vehicle == vehicle_id && shipment.status == ShipmentStatus::InTransit
            })
            .map(|(_, shipment)| shipment.clone()))
    }

    async fn find_assigned_to_vehicle(
        &self,
        vehicle_id: &Id<Vehicle>,
    ) -> store::Result<Vec<ShipmentDestination>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .shipments
            .iter()
            .filter(|(vehicle, shipment)| vehicle == vehicle_id && shipment.status.is_open())
            .map(|(_, shipment)| shipment.clone())
            .collect())
    }
}

/// Remembers everything published to it.
#[derive(Clone, Default)]
pub struct RecordingSink {
    published: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
}

impl RecordingSink {
    pub fn on(&self, channel: &str) -> Vec<serde_json::Value> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .filter(|(published_on, _)| published_on == channel)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.published.lock().unwrap().clear();
    }
}

impl BroadcastSink for RecordingSink {
    fn publish(&self, channel: &str, payload: serde_json::Value) {
        self.published
            .lock()
            .unwrap()
            .push((channel.to_owned(), payload));
    }
}
