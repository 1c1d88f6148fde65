use std::sync::Arc;

use database::MemoryDatabase;
use dispatch::{
    geofence::GeofenceMonitor, settings::SimulationSettings, simulator::FleetPositionSimulator,
};
use web::{broadcast::ChannelSink, start_web_server, WebSettings, WebState};

/// Envelopes buffered per subscriber before slow clients start to miss some.
const BROADCAST_CAPACITY: usize = 256;

#[tokio::main]
async fn main() {
    env_logger::init();

    // settings
    let simulation_settings =
        SimulationSettings::from_env().expect("expected valid simulation settings in env.");
    let web_settings = WebSettings::from_env();

    // stores and fan-out
    let database = MemoryDatabase::seeded().await;
    let sink = ChannelSink::new(BROADCAST_CAPACITY);
    let geofence = Arc::new(GeofenceMonitor::new(
        simulation_settings.arrival_threshold_meters,
    ));

    // simulation
    let period = simulation_settings.period;
    let simulator =
        FleetPositionSimulator::new(database, sink.clone(), geofence, simulation_settings)
            .expect("expected consistent simulation settings.");
    let dispatch_client = simulator.client();
    let simulation = simulator
        .start(period)
        .expect("expected a non-zero simulation period.");

    // web server
    let state = WebState {
        dispatch_client,
        broadcast: sink,
    };
    if let Err(why) = start_web_server(state, web_settings, shutdown_signal()).await {
        log::error!("web server failed: {}", why);
    }

    simulation.stop().await;
}

async fn shutdown_signal() {
    if let Err(why) = tokio::signal::ctrl_c().await {
        log::error!("could not listen for ctrl-c: {}", why);
        std::future::pending::<()>().await;
    }
    log::info!("shutting down...");
}
