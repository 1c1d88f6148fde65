use std::sync::Arc;

use model::{
    stop::Stop,
    vehicle::{Vehicle, VehicleState},
};
use utility::{geo::Coordinate, id::Id};

use crate::{
    geofence::GeofenceMonitor,
    route::{self, RoutePlan},
    simulator::{self, CommitGate, PositionUpdate},
    store::{BroadcastSink, Database, ShipmentStore, VehicleStore},
    RequestError, RequestResult,
};

/// Request-side entry point into the dispatch core.
#[derive(Debug, Clone)]
pub struct Client<D, B>
where
    D: Database,
    B: BroadcastSink + Clone,
{
    database: D,
    sink: B,
    geofence: Arc<GeofenceMonitor>,
    gate: CommitGate,
}

impl<D, B> Client<D, B>
where
    D: Database,
    B: BroadcastSink + Clone,
{
    /// A client writing on its own. Next to a running simulation use
    /// [`FleetPositionSimulator::client`](crate::simulator::FleetPositionSimulator::client)
    /// instead, which serializes reported positions with the ticks.
    pub fn new(database: D, sink: B, geofence: Arc<GeofenceMonitor>) -> Self {
        Self::with_gate(database, sink, geofence, CommitGate::default())
    }

    pub(crate) fn with_gate(
        database: D,
        sink: B,
        geofence: Arc<GeofenceMonitor>,
        gate: CommitGate,
    ) -> Self {
        Self {
            database,
            sink,
            geofence,
            gate,
        }
    }

    pub fn geofence(&self) -> &GeofenceMonitor {
        &self.geofence
    }

    /// Suggests an order in which the vehicle should deliver its open
    /// shipments, starting at its current position. Nothing is modified.
    pub async fn optimize_route(&self, vehicle_id: &Id<Vehicle>) -> RequestResult<RoutePlan> {
        let vehicle = VehicleStore::get(&self.database, vehicle_id)
            .await?
            .ok_or(RequestError::NotFound)?;
        let stops = self
            .database
            .find_assigned_to_vehicle(vehicle_id)
            .await?
            .into_iter()
            .map(Stop::from)
            .collect::<Vec<_>>();
        log::debug!(
            "optimizing route of vehicle {} over {} stops",
            vehicle_id,
            stops.len()
        );
        Ok(route::plan_route(vehicle.location, &stops)?)
    }

    /// Accepts a position reported by a tracker on the vehicle. The update
    /// goes through the same save, broadcast and geofence steps as a
    /// simulated one.
    pub async fn report_position(
        &self,
        vehicle_id: &Id<Vehicle>,
        location: Coordinate,
        speed: f64,
    ) -> RequestResult<PositionUpdate> {
        location.validate()?;
        if !(speed.is_finite() && speed >= 0.0) {
            return Err(RequestError::InvalidInput(format!(
                "speed must be a non-negative number, got {}",
                speed
            )));
        }

        let _gate = self.gate.lock().await;
        let current = VehicleStore::get(&self.database, vehicle_id)
            .await?
            .ok_or(RequestError::NotFound)?;
        let state = VehicleState {
            location,
            speed,
            ..current
        };
        log::info!("telemetry received for vehicle {}", vehicle_id);
        Ok(simulator::commit(&self.database, &self.sink, &self.geofence, state).await?)
    }
}
