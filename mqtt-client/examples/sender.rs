use std::time::Duration;

use mqtt_client::{BrokerSettings, MqttSender};

// Publishes a few sample records to a plain-TCP broker, e.g. `mosquitto -p 1883`.
#[tokio::main]
async fn main() {
    println!("Running mqtt with broker localhost:1883 at topic piezo/stream");

    let settings = BrokerSettings {
        host: "127.0.0.1".to_string(),
        port: 1883,
        client_id: "gateway-example".to_string(),
        keep_alive: Duration::from_secs(30),
        connect_timeout: Duration::from_secs(5),
        publish_timeout: Duration::from_secs(5),
        reconnect_delay: Duration::from_secs(1),
        credentials: None,
    };

    let sender = MqttSender::connect(&settings)
        .await
        .expect("Error connecting. Is the broker on?");

    for i in 0..7 {
        tokio::time::sleep(Duration::from_millis(500)).await;
        let payload = format!(r#"{{"voltage": {}, "step_detected": {}}}"#, 3.0 + i as f64 / 10.0, i % 2);
        sender
            .publish("piezo/stream", &payload)
            .await
            .expect("Error sending message");
        println!("Published {}", payload);
    }

    sender.disconnect().await.expect("Error disconnecting");
}
