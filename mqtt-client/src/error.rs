use rumqttc::{ClientError, ConnectReturnCode, ConnectionError};
use std::{io, path::PathBuf, time::Duration};
use thiserror::Error;

/// Failures while establishing the broker session. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("could not read credential file {}: {source}", .path.display())]
    Credentials {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("broker refused the connection: {0:?}")]
    Refused(ConnectReturnCode),

    #[error("could not reach broker: {0}")]
    Connection(#[source] ConnectionError),

    #[error("no acknowledgement from broker within {0:?}")]
    Timeout(Duration),
}

/// Failures while handing one payload to the client.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("client rejected publish: {0}")]
    Client(#[from] ClientError),

    #[error("publish not accepted within {0:?}")]
    Timeout(Duration),
}
