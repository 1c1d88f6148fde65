//! Periodic position simulation for all vehicles in transit.
//!
//! Every tick perturbs position and speed of each in-transit vehicle with
//! bounded random jitter, writes the result back, broadcasts it and checks
//! whether the vehicle just reached the destination of its shipment.

use std::{panic::AssertUnwindSafe, sync::Arc, time::Duration};

use futures::{future::join_all, FutureExt};
use model::{event::ArrivalEvent, vehicle::VehicleState};
use rand::{rngs::StdRng, Rng};
use serde::Serialize;
use tokio::{
    sync::{Mutex, OwnedMutexGuard},
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    client::Client,
    geofence::GeofenceMonitor,
    settings::{SettingsError, SimulationSettings},
    store::{
        self, BroadcastSink, Database, ShipmentStore, VehicleStore, FLEET_CHANNEL,
        NOTIFICATIONS_CHANNEL,
    },
};

/// Result of pushing one new vehicle state through store, broadcast and
/// geofence.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionUpdate {
    pub state: VehicleState,
    pub arrival: Option<ArrivalEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Vehicles whose new state was saved and broadcast.
    pub advanced: usize,
    /// Vehicles whose save failed. They are picked up again next tick.
    pub failed: usize,
    pub arrivals: usize,
}

/// Serializes everything that writes vehicle positions. A tick holds it from
/// reading the fleet until its last commit, telemetry holds it for its single
/// commit.
#[derive(Debug, Clone, Default)]
pub(crate) struct CommitGate(Arc<Mutex<()>>);

impl CommitGate {
    pub(crate) async fn lock(&self) -> OwnedMutexGuard<()> {
        Arc::clone(&self.0).lock_owned().await
    }
}

pub struct FleetPositionSimulator<D, B>
where
    D: Database,
    B: BroadcastSink,
{
    database: D,
    sink: B,
    geofence: Arc<GeofenceMonitor>,
    gate: CommitGate,
    settings: SimulationSettings,
    rng: StdRng,
}

impl<D, B> FleetPositionSimulator<D, B>
where
    D: Database,
    B: BroadcastSink,
{
    pub fn new(
        database: D,
        sink: B,
        geofence: Arc<GeofenceMonitor>,
        settings: SimulationSettings,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        let rng = settings.rng();
        Ok(Self {
            database,
            sink,
            geofence,
            gate: CommitGate::default(),
            settings,
            rng,
        })
    }

    /// A dispatch client sharing stores, geofence and write gate with this
    /// simulation, so reported positions never interleave with a tick.
    pub fn client(&self) -> Client<D, B>
    where
        B: Clone,
    {
        Client::with_gate(
            self.database.clone(),
            self.sink.clone(),
            Arc::clone(&self.geofence),
            self.gate.clone(),
        )
    }

    /// Replaces the jitter source.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Runs a single simulation step.
    pub async fn tick(&mut self) -> TickReport {
        let _gate = self.gate.lock().await;
        let vehicles = match self.database.list_all().await {
            Ok(vehicles) => vehicles,
            Err(why) => {
                log::error!("could not read vehicles, skipping tick: {}", why);
                return TickReport::default();
            }
        };

        // draw all jitter up front, in snapshot order, so the trajectory only
        // depends on the seed and not on how the commits below interleave
        let updates = vehicles
            .into_iter()
            .filter(VehicleState::is_in_transit)
            .map(|state| self.advance(state))
            .collect::<Vec<_>>();

        let database = &self.database;
        let sink = &self.sink;
        let geofence = self.geofence.as_ref();
        let results = join_all(updates.into_iter().map(|state| async move {
            let id = state.id.clone();
            (id, commit(database, sink, geofence, state).await)
        }))
        .await;

        let mut report = TickReport::default();
        for (id, result) in results {
            match result {
                Ok(update) => {
                    report.advanced += 1;
                    if update.arrival.is_some() {
                        report.arrivals += 1;
                    }
                }
                Err(why) => {
                    report.failed += 1;
                    log::warn!("could not save vehicle {}, retrying next tick: {}", id, why);
                }
            }
        }
        log::debug!(
            "tick done: {} advanced, {} failed, {} arrivals",
            report.advanced,
            report.failed,
            report.arrivals
        );
        report
    }

    fn advance(&mut self, state: VehicleState) -> VehicleState {
        let jitter = self.settings.position_jitter_degrees;
        let latitude_delta = self.rng.gen_range(-jitter..=jitter);
        let longitude_delta = self.rng.gen_range(-jitter..=jitter);
        let speed_jitter = self.settings.speed_jitter;
        let speed_delta = self.rng.gen_range(-speed_jitter..=speed_jitter);

        VehicleState {
            location: state.location.offset(latitude_delta, longitude_delta),
            speed: (state.speed + speed_delta)
                .clamp(self.settings.speed_min, self.settings.speed_max),
            ..state
        }
    }

    /// Spawns the tick loop. Ticks run one after another; if a tick overruns
    /// the period, the missed ticks are skipped rather than queued.
    pub fn start(mut self, period: Duration) -> Result<SimulatorHandle, SettingsError> {
        if period.is_zero() {
            return Err(SettingsError::Inconsistent("tick period must not be zero"));
        }
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            log::info!("fleet simulation started, tick every {:?}", period);
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {}
                }
                // a started tick always runs to completion, cancellation is
                // only observed between ticks
                let result = AssertUnwindSafe(self.tick()).catch_unwind().await;
                if let Err(why) = result {
                    log::error!("simulation tick panicked: {:?}", why);
                }
            }
            log::info!("fleet simulation stopped");
        });

        Ok(SimulatorHandle { cancel, task })
    }
}

/// Controls a running simulation.
pub struct SimulatorHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SimulatorHandle {
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops scheduling new ticks and waits for the current one to finish.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(why) = self.task.await {
            log::error!("simulation task failed: {:?}", why);
        }
    }
}

/// Saves `state`, broadcasts the saved state and evaluates the geofence for
/// the vehicle's in-transit shipment. Only the save is allowed to fail, every
/// later step is best-effort. Callers hold the [`CommitGate`].
pub(crate) async fn commit<D, B>(
    database: &D,
    sink: &B,
    geofence: &GeofenceMonitor,
    state: VehicleState,
) -> store::Result<PositionUpdate>
where
    D: Database,
    B: BroadcastSink,
{
    let state = database.save(state).await?;
    store::broadcast(sink, FLEET_CHANNEL, &state);

    let shipment = match database.find_in_transit_by_vehicle(&state.id).await {
        Ok(shipment) => shipment,
        Err(why) => {
            log::warn!("could not read shipment of vehicle {}: {}", state.id, why);
            None
        }
    };

    let mut arrival = None;
    if let Some(shipment) = shipment {
        match geofence.evaluate(
            state.location,
            &state.id,
            shipment.location,
            &shipment.id,
            shipment.status,
        ) {
            Ok(Some(event)) => {
                store::broadcast(sink, NOTIFICATIONS_CHANNEL, &event);
                arrival = Some(event);
            }
            Ok(None) => {}
            Err(why) => log::warn!(
                "could not evaluate geofence for vehicle {} and shipment {}: {}",
                state.id,
                shipment.id,
                why
            ),
        }
    }

    Ok(PositionUpdate { state, arrival })
}
