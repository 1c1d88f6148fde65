use chrono::{Duration, Local};
use model::{
    shipment::{Shipment, ShipmentStatus},
    vehicle::{Vehicle, VehicleStatus},
    WithId,
};
use utility::geo::Coordinate;

/// The demo fleet the server starts with: one truck under way in San
/// Francisco, one idle in Los Angeles and one in the workshop in New York.
pub fn seed_fleet() -> (Vec<WithId<Vehicle>>, Vec<WithId<Shipment>>) {
    let vehicles = vec![
        WithId::new(
            "VN-101".into(),
            Vehicle {
                name: "Tesla Semi".to_owned(),
                plate: "CA-7842-XL".to_owned(),
                driver: Some("John Doe".to_owned()),
                location: Coordinate::new(37.7749, -122.4194),
                speed: 65.0,
                fuel: 78.5,
                mileage: 12500.0,
                last_service: Some("Feb 10, 2026".to_owned()),
                temperature: Some(4.2),
                status: VehicleStatus::InTransit,
                max_capacity: 36_000.0,
            },
        ),
        WithId::new(
            "VN-102".into(),
            Vehicle {
                name: "Volvo FH16".to_owned(),
                plate: "TX-9901-BA".to_owned(),
                driver: Some("Jane Smith".to_owned()),
                location: Coordinate::new(34.0522, -118.2437),
                speed: 55.0,
                fuel: 45.0,
                mileage: 8900.5,
                last_service: Some("Jan 22, 2026".to_owned()),
                temperature: Some(-18.5),
                status: VehicleStatus::Idle,
                max_capacity: 40_000.0,
            },
        ),
        WithId::new(
            "VN-103".into(),
            Vehicle {
                name: "Freightliner Cascadia".to_owned(),
                plate: "NY-4423-CC".to_owned(),
                driver: Some("Mike Ross".to_owned()),
                location: Coordinate::new(40.7128, -74.0060),
                speed: 0.0,
                fuel: 91.0,
                mileage: 4500.0,
                last_service: Some("Feb 05, 2026".to_owned()),
                temperature: Some(5.0),
                status: VehicleStatus::Maintenance,
                max_capacity: 36_000.0,
            },
        ),
    ];

    let now = Local::now();
    let shipments = vec![
        WithId::new(
            "SH-9001".into(),
            Shipment {
                customer: "Global Corp".to_owned(),
                recipient_name: "Chris Obi".to_owned(),
                origin: "San Francisco, CA".to_owned(),
                destination: "New York, NY".to_owned(),
                destination_address: Some("123 Tech Lane, NY".to_owned()),
                weight: Some("2,400 kg".to_owned()),
                status: ShipmentStatus::InTransit,
                destination_location: Coordinate::new(40.7589, -73.9851),
                assigned_vehicle: Some("VN-101".into()),
                estimated_delivery: Some(now + Duration::hours(4)),
            },
        ),
        WithId::new(
            "SH-9002".into(),
            Shipment {
                customer: "NextGen Logistics".to_owned(),
                recipient_name: "Sarah Connor".to_owned(),
                origin: "Austin, TX".to_owned(),
                destination: "Los Angeles, CA".to_owned(),
                destination_address: Some("456 Cyber St, LA".to_owned()),
                weight: Some("1,800 kg".to_owned()),
                status: ShipmentStatus::Pending,
                destination_location: Coordinate::new(34.0522, -118.2437),
                assigned_vehicle: Some("VN-102".into()),
                estimated_delivery: Some(now + Duration::days(1)),
            },
        ),
    ];

    (vehicles, shipments)
}
