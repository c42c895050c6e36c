use crate::{ConnectError, CredentialBundle, PublishError, Publisher};
use async_trait::async_trait;
use log::{debug, info, warn};
use rumqttc::{
    AsyncClient, ClientError, ConnectReturnCode, ConnectionError, Event, EventLoop, MqttOptions,
    Packet, QoS, Transport,
};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Everything needed to open a session with the broker.
#[derive(Debug, Clone)]
pub struct BrokerSettings {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub keep_alive: Duration,
    pub connect_timeout: Duration,
    pub publish_timeout: Duration,
    pub reconnect_delay: Duration,
    /// Plain TCP when `None`.
    pub credentials: Option<CredentialBundle>,
}

/// A connected MQTT session that publishes at QoS 1.
///
/// The client's event loop runs on a background task for the lifetime of the
/// sender; it flushes queued publishes, handles acknowledgements and
/// reconnects after network failures.
pub struct MqttSender {
    client: AsyncClient,
    publish_timeout: Duration,
    driver: JoinHandle<()>,
}

impl MqttSender {
    /// Opens the session and waits for the broker to acknowledge it.
    pub async fn connect(settings: &BrokerSettings) -> Result<Self, ConnectError> {
        let mut options = MqttOptions::new(&settings.client_id, &settings.host, settings.port);
        options.set_keep_alive(settings.keep_alive);

        if let Some(credentials) = &settings.credentials {
            options.set_transport(Transport::Tls(credentials.load()?));
        }

        let (client, mut eventloop) = AsyncClient::new(options, 10);

        tokio::time::timeout(settings.connect_timeout, wait_for_connack(&mut eventloop))
            .await
            .map_err(|_| ConnectError::Timeout(settings.connect_timeout))??;

        info!(
            "Connected to {}:{} as {}",
            settings.host, settings.port, settings.client_id
        );

        let driver = tokio::spawn(drive(eventloop, settings.reconnect_delay));

        Ok(Self {
            client,
            publish_timeout: settings.publish_timeout,
            driver,
        })
    }

    pub async fn publish(&self, topic: &str, payload: &str) -> Result<(), PublishError> {
        let request = self
            .client
            .publish(topic, QoS::AtLeastOnce, false, payload.as_bytes().to_vec());

        tokio::time::timeout(self.publish_timeout, request)
            .await
            .map_err(|_| PublishError::Timeout(self.publish_timeout))??;

        debug!("Queued {} bytes for topic: {}", payload.len(), topic);
        Ok(())
    }

    /// Sends a DISCONNECT and stops the background event loop.
    pub async fn disconnect(self) -> Result<(), ClientError> {
        let result = self.client.disconnect().await;
        // Give the event loop a moment to flush the DISCONNECT.
        tokio::time::sleep(Duration::from_millis(100)).await;
        self.driver.abort();
        result
    }
}

#[async_trait]
impl Publisher for MqttSender {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), PublishError> {
        MqttSender::publish(self, topic, payload).await
    }
}

async fn wait_for_connack(eventloop: &mut EventLoop) -> Result<(), ConnectError> {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                return match ack.code {
                    ConnectReturnCode::Success => Ok(()),
                    code => Err(ConnectError::Refused(code)),
                };
            }
            Ok(event) => debug!("Event before ConnAck: {:?}", event),
            Err(ConnectionError::ConnectionRefused(code)) => {
                return Err(ConnectError::Refused(code));
            }
            Err(e) => return Err(ConnectError::Connection(e)),
        }
    }
}

async fn drive(mut eventloop: EventLoop, reconnect_delay: Duration) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::PubAck(ack))) => {
                debug!("Broker acknowledged packet {}", ack.pkid)
            }
            // The first ConnAck is consumed during connect, so any later one is a reconnect.
            Ok(Event::Incoming(Packet::ConnAck(_))) => info!("Reconnected to broker"),
            Ok(_) => {}
            Err(e) => {
                warn!(
                    "Broker connection error: {}; retrying in {:?}",
                    e, reconnect_delay
                );
                tokio::time::sleep(reconnect_delay).await;
            }
        }
    }
}
