mod support;

use std::sync::Arc;

use dispatch::{
    client::Client,
    geofence::GeofenceMonitor,
    store::{FLEET_CHANNEL, NOTIFICATIONS_CHANNEL},
    RequestError,
};
use model::{shipment::ShipmentStatus, vehicle::VehicleStatus};
use utility::geo::{Coordinate, ValidationError};

use self::support::{MockDatabase, RecordingSink};

fn client(database: &MockDatabase, sink: &RecordingSink) -> Client<MockDatabase, RecordingSink> {
    Client::new(
        database.clone(),
        sink.clone(),
        Arc::new(GeofenceMonitor::default()),
    )
}

fn database() -> MockDatabase {
    MockDatabase::default()
        .with_vehicle("VN-1", Coordinate::new(0.0, 0.0), 50.0, VehicleStatus::InTransit)
        .with_vehicle("VN-2", Coordinate::new(10.0, 10.0), 50.0, VehicleStatus::Idle)
        .with_shipment("VN-1", "A", Coordinate::new(0.0, 1.0), ShipmentStatus::InTransit)
        .with_shipment("VN-1", "B", Coordinate::new(0.0, 5.0), ShipmentStatus::Pending)
        .with_shipment("VN-1", "X", Coordinate::new(0.0, 0.5), ShipmentStatus::Delivered)
        .with_shipment("VN-1", "C", Coordinate::new(0.0, 2.0), ShipmentStatus::Pending)
        .with_shipment("VN-2", "D", Coordinate::new(0.0, 3.0), ShipmentStatus::Pending)
}

// Should order the vehicle's open shipments nearest first.
#[tokio::test]
async fn optimizes_open_shipments() {
    let database = database();
    let sink = RecordingSink::default();
    let plan = client(&database, &sink)
        .optimize_route(&"VN-1".into())
        .await
        .expect("should plan");

    let order = plan
        .stops
        .iter()
        .map(|leg| leg.content.shipment_id.raw())
        .collect::<Vec<_>>();
    assert_eq!(order, ["A", "C", "B"]);
    assert_eq!(plan.origin, Coordinate::new(0.0, 0.0));
    assert!(plan.total_distance_meters > 0.0);

    // planning must not touch any state
    assert_eq!(database.saves(), 0);
    assert!(sink.on(FLEET_CHANNEL).is_empty());
}

// Should return an empty plan for a vehicle without shipments.
#[tokio::test]
async fn empty_plan() {
    let database = MockDatabase::default().with_vehicle(
        "VN-9",
        Coordinate::new(1.0, 1.0),
        0.0,
        VehicleStatus::Idle,
    );
    let plan = client(&database, &RecordingSink::default())
        .optimize_route(&"VN-9".into())
        .await
        .expect("should plan");
    assert!(plan.stops.is_empty());
    assert_eq!(plan.total_distance_meters, 0.0);
}

// Should report unknown vehicles.
#[tokio::test]
async fn unknown_vehicle() {
    let client = client(&database(), &RecordingSink::default());
    let result = client.optimize_route(&"VN-404".into()).await;
    assert!(matches!(result, Err(RequestError::NotFound)));

    let result = client
        .report_position(&"VN-404".into(), Coordinate::new(0.0, 0.0), 10.0)
        .await;
    assert!(matches!(result, Err(RequestError::NotFound)));
}

// Should save, broadcast and evaluate the geofence for reported positions.
#[tokio::test]
async fn reported_position_is_committed() {
    let database = database();
    let sink = RecordingSink::default();
    let client = client(&database, &sink);

    let update = client
        .report_position(&"VN-1".into(), Coordinate::new(0.0, 0.999), 42.0)
        .await
        .expect("should accept");
    assert_eq!(update.state.location, Coordinate::new(0.0, 0.999));
    assert_eq!(update.state.speed, 42.0);
    assert_eq!(update.state.status, VehicleStatus::InTransit);
    assert!(update.arrival.is_some());

    assert_eq!(database.vehicle("VN-1").speed, 42.0);
    assert_eq!(sink.on(FLEET_CHANNEL).len(), 1);
    assert_eq!(sink.on(NOTIFICATIONS_CHANNEL).len(), 1);

    // still inside, no second notification
    let update = client
        .report_position(&"VN-1".into(), Coordinate::new(0.0, 0.998), 40.0)
        .await
        .expect("should accept");
    assert!(update.arrival.is_none());
    assert_eq!(sink.on(NOTIFICATIONS_CHANNEL).len(), 1);
}

// Should reject invalid telemetry before touching the store.
#[tokio::test]
async fn rejects_invalid_telemetry() {
    let database = database();
    let client = client(&database, &RecordingSink::default());

    let result = client
        .report_position(&"VN-1".into(), Coordinate::new(120.0, 0.0), 10.0)
        .await;
    assert!(matches!(
        result,
        Err(RequestError::Validation(ValidationError::Latitude(_)))
    ));

    let result = client
        .report_position(&"VN-1".into(), Coordinate::new(0.0, 0.0), f64::NAN)
        .await;
    assert!(matches!(result, Err(RequestError::InvalidInput(_))));
    assert_eq!(database.saves(), 0);
}

// Should surface store failures on the request path.
#[tokio::test]
async fn store_failure_on_report() {
    let database = database();
    database.fail_saves_for("VN-1");
    let sink = RecordingSink::default();

    let result = client(&database, &sink)
        .report_position(&"VN-1".into(), Coordinate::new(0.0, 0.1), 10.0)
        .await;
    assert!(matches!(result, Err(RequestError::Store(_))));
    assert!(sink.on(FLEET_CHANNEL).is_empty());
}
