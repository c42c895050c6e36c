use clap::Parser;
use device_reader::SerialDeviceReader;
use gateway::{Bridge, Config, Overrides, startup, time::SystemClock};
use log::{error, info};
use mqtt_client::MqttSender;
use std::path::PathBuf;

/// Serial-to-MQTT telemetry gateway
#[derive(Parser, Debug)]
#[command(version, about = "Serial-to-MQTT telemetry gateway", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Serial port to read from (overrides serial.port)
    #[arg(long)]
    serial_port: Option<String>,

    /// Broker hostname (overrides mqtt.host)
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Args::parse();
    let overrides = Overrides {
        serial_port: args.serial_port,
        host: args.host,
    };

    // Load configuration
    let config = Config::load(&args.config, &overrides).unwrap_or_else(|err| {
        error!(
            "Failed to load configuration from {}: {}",
            args.config.display(),
            err
        );
        std::process::exit(1);
    });

    info!("Connecting to broker {}:{}", config.mqtt.host, config.mqtt.port);
    let serial_settings = config.serial_settings();

    let (sender, reader) = startup::start(
        MqttSender::connect(&config.broker_settings()),
        || {
            info!("Opening serial connection on {}", serial_settings.port);
            SerialDeviceReader::open(&serial_settings)
        },
        config.serial.settle_delay(),
    )
    .await
    .unwrap_or_else(|err| {
        error!("{}", err);
        std::process::exit(1);
    });

    info!(
        "Publishing to {} as {}",
        config.mqtt.topic, config.bridge.device_id
    );

    let mut bridge = Bridge::new(reader, sender, SystemClock, config.bridge_settings());

    tokio::select! {
        _ = bridge.run() => {}
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    info!("Shutting down: {}", bridge.stats());

    if let Err(e) = bridge.into_publisher().disconnect().await {
        error!("Error disconnecting MQTT client: {}", e);
    }
}
