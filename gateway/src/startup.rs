use device_reader::ReadError;
use log::info;
use mqtt_client::ConnectError;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Startup failures. Either one ends the process before the bridge runs.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("could not connect to broker, check certificates: {0}")]
    Connect(#[from] ConnectError),

    #[error("{0}. Is the device plugged in?")]
    Open(#[from] ReadError),
}

/// Brings up both ends of the bridge in order.
///
/// The broker session comes first; the serial port is only opened once it is
/// up, and the settle delay only runs after the port opened.
pub async fn start<P, S, C, O>(
    connect: C,
    open: O,
    settle_delay: Duration,
) -> Result<(P, S), StartupError>
where
    C: Future<Output = Result<P, ConnectError>>,
    O: FnOnce() -> Result<S, ReadError>,
{
    let publisher = connect.await?;
    info!("Connected to broker");

    let source = open()?;

    // The device resets when the port opens; let it boot before reading.
    tokio::time::sleep(settle_delay).await;
    info!("Serial port open, listening for records");

    Ok((publisher, source))
}
