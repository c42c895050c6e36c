mod error;
pub mod mock;
pub mod sender;
pub mod tls;

pub use error::{ConnectError, PublishError};
pub use sender::{BrokerSettings, MqttSender};
pub use tls::CredentialBundle;

use async_trait::async_trait;

/// Anything that can forward a serialized payload to a topic.
#[async_trait]
pub trait Publisher {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), PublishError>;
}
