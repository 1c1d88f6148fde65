//! In-process vehicle and shipment storage.

use std::sync::Arc;

use async_trait::async_trait;
use dispatch::store::{self, ShipmentStore, StoreError, VehicleStore};
use indexmap::IndexMap;
use model::{
    shipment::{Shipment, ShipmentDestination, ShipmentStatus},
    vehicle::{Vehicle, VehicleState},
    WithId,
};
use tokio::sync::RwLock;
use utility::id::Id;

pub mod seed;

#[derive(Debug, Default)]
struct Tables {
    // index maps keep insertion order, so listings are stable between calls
    vehicles: IndexMap<Id<Vehicle>, Vehicle>,
    shipments: IndexMap<Id<Shipment>, Shipment>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// A database filled with the demo fleet.
    pub async fn seeded() -> Self {
        let database = Self::new();
        let (vehicles, shipments) = seed::seed_fleet();
        log::info!(
            "seeding {} vehicles and {} shipments",
            vehicles.len(),
            shipments.len()
        );
        for vehicle in vehicles {
            database.put_vehicle(vehicle).await;
        }
        for shipment in shipments {
            database.put_shipment(shipment).await;
        }
        database
    }

    /// Inserts or replaces a complete vehicle record.
    pub async fn put_vehicle(&self, vehicle: WithId<Vehicle>) {
        self.tables
            .write()
            .await
            .vehicles
            .insert(vehicle.id, vehicle.content);
    }

    pub async fn put_shipment(&self, shipment: WithId<Shipment>) {
        self.tables
            .write()
            .await
            .shipments
            .insert(shipment.id, shipment.content);
    }

    pub async fn vehicle(&self, id: &Id<Vehicle>) -> Option<WithId<Vehicle>> {
        self.tables
            .read()
            .await
            .vehicles
            .get(id)
            .map(|vehicle| WithId::new(id.clone(), vehicle.clone()))
    }

    pub async fn set_shipment_status(
        &self,
        id: &Id<Shipment>,
        status: ShipmentStatus,
    ) -> store::Result<()> {
        let mut tables = self.tables.write().await;
        let shipment = tables.shipments.get_mut(id).ok_or(StoreError::NotFound)?;
        shipment.status = status;
        Ok(())
    }

    async fn shipments_of(
        &self,
        vehicle_id: &Id<Vehicle>,
        filter: impl Fn(ShipmentStatus) -> bool,
    ) -> Vec<ShipmentDestination> {
        self.tables
            .read()
            .await
            .shipments
            .iter()
            .filter(|(_, shipment)| shipment.assigned_vehicle.as_ref() == Some(vehicle_id))
            .filter(|(_, shipment)| filter(shipment.status))
            .map(|(id, shipment)| ShipmentDestination {
                id: id.clone(),
                location: shipment.destination_location,
                status: shipment.status,
            })
            .collect()
    }
}

#[async_trait]
impl VehicleStore for MemoryDatabase {
    async fn list_all(&self) -> store::Result<Vec<VehicleState>> {
        Ok(self
            .tables
            .read()
            .await
            .vehicles
            .iter()
            .map(|(id, vehicle)| VehicleState {
                id: id.clone(),
                location: vehicle.location,
                speed: vehicle.speed,
                status: vehicle.status,
            })
            .collect())
    }

    async fn get(&self, id: &Id<Vehicle>) -> store::Result<Option<VehicleState>> {
        Ok(self.vehicle(id).await.map(|vehicle| vehicle.state()))
    }

    async fn save(&self, state: VehicleState) -> store::Result<VehicleState> {
        let mut tables = self.tables.write().await;
        let vehicle = tables
            .vehicles
            .get_mut(&state.id)
            .ok_or(StoreError::NotFound)?;
        vehicle.apply(&state);
        Ok(VehicleState {
            status: vehicle.status,
            ..state
        })
    }
}

#[async_trait]
impl ShipmentStore for MemoryDatabase {
    async fn find_in_transit_by_vehicle(
        &self,
        vehicle_id: &Id<Vehicle>,
    ) -> store::Result<Option<ShipmentDestination>> {
        Ok(self
            .shipments_of(vehicle_id, |status| status == ShipmentStatus::InTransit)
            .await
            .into_iter()
            .next())
    }

    async fn find_assigned_to_vehicle(
        &self,
        vehicle_id: &Id<Vehicle>,
    ) -> store::Result<Vec<ShipmentDestination>> {
        Ok(self
            .shipments_of(vehicle_id, |status| status.is_open())
            .await)
    }
}
