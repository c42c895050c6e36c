use crate::bridge::BridgeSettings;
use config::{ConfigBuilder, ConfigError, builder::DefaultState};
use device_reader::SerialSettings;
use mqtt_client::{BrokerSettings, CredentialBundle};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub serial: SerialConfig,
    pub mqtt: MqttConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SerialConfig {
    pub port: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MqttConfig {
    pub host: String,
    #[serde(default = "default_mqtt_port")]
    pub port: u16,
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default = "default_topic")]
    pub topic: String,
    #[serde(default = "default_keep_alive_seconds")]
    pub keep_alive_seconds: u64,
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,
    #[serde(default = "default_publish_timeout_seconds")]
    pub publish_timeout_seconds: u64,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsConfig {
    pub root_ca: PathBuf,
    pub private_key: PathBuf,
    pub client_certificate: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    #[serde(default = "default_device_id")]
    pub device_id: String,
    #[serde(default = "default_idle_interval_ms")]
    pub idle_interval_ms: u64,
}

/// Command-line values that take precedence over the file and environment.
#[derive(Debug, Default)]
pub struct Overrides {
    pub serial_port: Option<String>,
    pub host: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file, `GATEWAY_*` environment variables
    /// and command-line overrides, in increasing order of precedence.
    pub fn load(path: &Path, overrides: &Overrides) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let builder = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix("GATEWAY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("serial.port", overrides.serial_port.clone())?
            .set_override_option("mqtt.host", overrides.host.clone())?;

        Self::build(builder)
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.serial.port.trim().is_empty() {
            return Err(ConfigError::Message("serial.port must not be empty".into()));
        }
        if self.serial.baud_rate == 0 {
            return Err(ConfigError::Message("serial.baud_rate must be positive".into()));
        }
        if self.mqtt.host.trim().is_empty() {
            return Err(ConfigError::Message("mqtt.host must not be empty".into()));
        }
        if self.mqtt.client_id.trim().is_empty() || self.mqtt.client_id.starts_with(' ') {
            return Err(ConfigError::Message("mqtt.client_id must be a non-blank identifier".into()));
        }
        if self.mqtt.topic.is_empty() || self.mqtt.topic.contains(['+', '#']) {
            return Err(ConfigError::Message(format!(
                "mqtt.topic {:?} must be a non-empty topic name without wildcards",
                self.mqtt.topic
            )));
        }
        Ok(())
    }

    pub fn serial_settings(&self) -> SerialSettings {
        SerialSettings {
            port: self.serial.port.clone(),
            baud_rate: self.serial.baud_rate,
            read_timeout: Duration::from_millis(self.serial.read_timeout_ms),
        }
    }

    pub fn broker_settings(&self) -> BrokerSettings {
        BrokerSettings {
            host: self.mqtt.host.clone(),
            port: self.mqtt.port,
            client_id: self.mqtt.client_id.clone(),
            keep_alive: Duration::from_secs(self.mqtt.keep_alive_seconds),
            connect_timeout: Duration::from_secs(self.mqtt.connect_timeout_seconds),
            publish_timeout: Duration::from_secs(self.mqtt.publish_timeout_seconds),
            reconnect_delay: Duration::from_millis(self.mqtt.reconnect_delay_ms),
            credentials: Some(CredentialBundle {
                root_ca: self.mqtt.credentials.root_ca.clone(),
                private_key: self.mqtt.credentials.private_key.clone(),
                client_certificate: self.mqtt.credentials.client_certificate.clone(),
            }),
        }
    }

    pub fn bridge_settings(&self) -> BridgeSettings {
        BridgeSettings {
            topic: self.mqtt.topic.clone(),
            device_id: self.bridge.device_id.clone(),
            idle_interval: Duration::from_millis(self.bridge.idle_interval_ms),
        }
    }
}

impl SerialConfig {
    /// Pause after opening the port while the device resets.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            root_ca: PathBuf::from("root-CA.pem"),
            private_key: PathBuf::from("private.pem.key"),
            client_certificate: PathBuf::from("certificate.pem.crt"),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            device_id: default_device_id(),
            idle_interval_ms: default_idle_interval_ms(),
        }
    }
}

fn default_baud_rate() -> u32 {
    115200
}

fn default_read_timeout_ms() -> u64 {
    1000
}

fn default_settle_delay_ms() -> u64 {
    2000
}

fn default_mqtt_port() -> u16 {
    8883
}

fn default_client_id() -> String {
    "PiezoLaptopGateway".to_string()
}

fn default_topic() -> String {
    "piezo/stream".to_string()
}

fn default_keep_alive_seconds() -> u64 {
    30
}

fn default_connect_timeout_seconds() -> u64 {
    10
}

fn default_publish_timeout_seconds() -> u64 {
    5
}

fn default_reconnect_delay_ms() -> u64 {
    1000
}

fn default_device_id() -> String {
    crate::payload::DEVICE_ID.to_string()
}

fn default_idle_interval_ms() -> u64 {
    10
}
