use chrono::NaiveDateTime;
use device_reader::mock::MockDevice;
use gateway::{
    Bridge, BridgeSettings, Outcome,
    payload::{OutboundPayload, TIMESTAMP_FORMAT},
    time::SystemClock,
};
use mqtt_client::mock::RecordingPublisher;
use serde_json::json;
use std::time::Duration;

fn settings() -> BridgeSettings {
    BridgeSettings {
        topic: "piezo/stream".to_string(),
        device_id: "laptop_setup_01".to_string(),
        idle_interval: Duration::from_millis(1),
    }
}

async fn drain(
    bridge: &mut Bridge<MockDevice, RecordingPublisher, SystemClock>,
    passes: usize,
) -> Vec<Outcome> {
    let mut outcomes = Vec::new();
    for _ in 0..passes {
        outcomes.push(bridge.tick().await);
    }
    outcomes
}

fn decode_all(published: &[(String, String)]) -> Vec<OutboundPayload> {
    published
        .iter()
        .map(|(_, payload)| serde_json::from_str(payload).unwrap())
        .collect()
}

#[tokio::test]
async fn test_scenario_well_formed_record() {
    let before = chrono::Local::now().naive_local();
    let mut bridge = Bridge::new(
        MockDevice::with_lines([r#"{"v": 3.21, "s": 1}"#]),
        RecordingPublisher::new(),
        SystemClock,
        settings(),
    );

    drain(&mut bridge, 1).await;
    let after = chrono::Local::now().naive_local();

    let payloads = decode_all(&bridge.into_publisher().published());
    assert_eq!(payloads.len(), 1);

    let payload = &payloads[0];
    assert_eq!(payload.device_id, "laptop_setup_01");
    assert_eq!(payload.voltage, json!(3.21));
    assert_eq!(payload.step_detected, json!(1));

    // Stamped by the gateway at forwarding time, to microsecond precision.
    let stamped = NaiveDateTime::parse_from_str(&payload.timestamp, TIMESTAMP_FORMAT).unwrap();
    let slack = chrono::Duration::milliseconds(1);
    assert!(before - slack <= stamped && stamped <= after);
}

#[tokio::test]
async fn test_scenario_not_json_and_empty_lines() {
    let mut bridge = Bridge::new(
        MockDevice::with_lines(["not json at all", ""]),
        RecordingPublisher::new(),
        SystemClock,
        settings(),
    );

    let outcomes = drain(&mut bridge, 2).await;

    assert!(matches!(outcomes[0], Outcome::Corrupted { .. }));
    assert!(matches!(outcomes[1], Outcome::Skipped));

    let stats = bridge.stats();
    assert_eq!(stats.corrupted, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(bridge.into_publisher().calls(), 0);
}

#[tokio::test]
async fn test_published_order_matches_device_order() {
    let mut device = MockDevice::new();
    for i in 0..20 {
        if i % 3 == 0 {
            device.push_line("{corrupt");
        }
        if i % 4 == 0 {
            device.push_idle();
        }
        device.push_line(&format!(r#"{{"v": {}, "s": {}}}"#, i, i % 2));
    }
    let mut bridge = Bridge::new(device, RecordingPublisher::new().fail_call(5), SystemClock, settings());

    // 20 records, 7 corrupt lines, 5 idle polls.
    drain(&mut bridge, 32).await;

    let voltages: Vec<_> = decode_all(&bridge.into_publisher().published())
        .into_iter()
        .map(|payload| payload.voltage)
        .collect();

    // The sixth publish (v = 5) fails; everything else arrives in order.
    let expected: Vec<_> = (0..20).filter(|i| *i != 5).map(|i| json!(i)).collect();
    assert_eq!(voltages, expected);
}
