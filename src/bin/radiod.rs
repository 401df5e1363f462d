//! Radio Daemon
//!
//! Wires the GPIO inputs, the MAX9744 amplifier, the stream player and the
//! speech announcer to the command serializer. Ctrl-C stops playback and
//! releases the GPIO pins without powering the host off.

use anyhow::{Context, Result};
use rppal::i2c::I2c;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use radio_control::{
    amplifier::{AmplifierController, Max9744},
    channels::ChannelRegistry,
    command::{command_channel, CommandSender},
    config::{AmplifierConfig, AppConfig, InputConfig},
    control::{CommandPower, ExitReason, RadioController, ShutdownSequencer},
    error::HardwareError,
    input::{GpioMonitor, InputDecoder, RpiGpio},
    persistence::FileStateStore,
    stream::{CommandAnnouncer, PlayerLauncher, StreamSession},
};

type SerializerJoin = std::result::Result<std::thread::Result<ExitReason>, tokio::task::JoinError>;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting radio controller");

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::load_or_default(config_path.as_deref())?;
    let registry = ChannelRegistry::new(config.channels.clone())?;

    println!("\n=== Channels ===");
    for (index, channel) in registry.iter().enumerate() {
        println!("  {:>2}: {}", index, channel.name);
        println!("      {}", channel.url);
    }
    println!();

    let store = FileStateStore::new(config.state.resolve_dir());
    tracing::info!("State directory: {}", store.dir().display());

    // Playback side
    let amplifier = open_amplifier(&config.amplifier).context("amplifier setup failed")?;
    let session = StreamSession::new(
        Box::new(PlayerLauncher::new(&config.player)),
        Box::new(CommandAnnouncer::new(&config.announcer)),
        config.player.quit_timeout(),
        config.amplifier.announce_volume,
    );

    // Input side; the edge callbacks hold the only senders
    let (intake, commands) = command_channel();
    let monitor = start_inputs(&config.input, intake).context("GPIO setup failed")?;
    let stop_inputs = monitor.stop_handle();

    let mut shutdown = ShutdownSequencer::new(Box::new(CommandPower::new(&config.power)));
    shutdown.claim(Box::new(monitor));

    let controller = RadioController::new(registry, amplifier, session, Box::new(store), shutdown)
        .with_input_gate(Box::new(stop_inputs.clone()));
    let serializer = controller.spawn(commands)?;
    let mut serializer = tokio::task::spawn_blocking(move || serializer.join());

    tracing::info!("Radio running - press Ctrl+C to stop");

    tokio::select! {
        result = &mut serializer => report(result),
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, stopping inputs");
            stop_inputs.stop();
            report(serializer.await)
        }
    }
}

fn open_amplifier(config: &AmplifierConfig) -> radio_control::Result<AmplifierController> {
    let bus = I2c::with_bus(config.bus).map_err(|e| HardwareError::I2cBus {
        bus: config.bus,
        reason: e.to_string(),
    })?;
    tracing::info!("MAX9744 on /dev/i2c-{} at {:#04x}", config.bus, config.address);
    Ok(AmplifierController::new(Box::new(Max9744::new(bus, config))))
}

fn start_inputs(config: &InputConfig, intake: CommandSender) -> radio_control::Result<GpioMonitor> {
    let gpio = Arc::new(RpiGpio::open(config.pins)?);
    let decoder = Arc::new(InputDecoder::new(
        gpio.clone(),
        config.rotary_settle(),
        config.button_debounce(),
        intake,
    ));
    Ok(GpioMonitor::start(gpio, decoder)?)
}

fn report(result: SerializerJoin) -> Result<()> {
    match result {
        Ok(Ok(reason)) => {
            tracing::info!("Command serializer finished: {:?}", reason);
            Ok(())
        }
        Ok(Err(_)) => anyhow::bail!("command serializer panicked"),
        Err(e) => Err(e).context("failed to join command serializer"),
    }
}
