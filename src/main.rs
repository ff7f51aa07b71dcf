use anyhow::{Context, Result};
use clap::Parser;
use iced::{window, Application, Settings};
use power_panel::bus::{CommandBus, TelemetryBus};
use power_panel::gui::{PanelApp, PanelFlags};
use power_panel::link::{SerialLink, SimulatedBase};
use power_panel::PanelConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "power-panel", about = "Battery, breaker and drive mode panel for a robot base")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial device of the base bridge; without one a simulated base is used
    #[arg(short, long)]
    port: Option<String>,

    #[arg(short, long)]
    baud: Option<u32>,

    /// Fraction of simulated commands that fail
    #[arg(long)]
    fail_rate: Option<f64>,

    #[arg(long, default_value_t = Level::INFO)]
    log_level: Level,

    #[arg(long)]
    fullscreen: bool,

    /// Print serial ports and exit
    #[arg(long)]
    list_ports: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt().with_max_level(args.log_level).init();

    if args.list_ports {
        for port in SerialLink::list_available_ports() {
            println!("{}", port);
        }
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => PanelConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PanelConfig::default(),
    };
    if let Some(port) = args.port {
        config.link.port = Some(port);
    }
    if let Some(baud) = args.baud {
        config.link.baud_rate = baud;
    }
    if let Some(rate) = args.fail_rate {
        config.link.sim_failure_rate = rate;
    }

    let (telemetry, commands, source): (Arc<dyn TelemetryBus>, Arc<dyn CommandBus>, String) =
        match config.link.port.clone() {
            Some(port) => {
                let link = Arc::new(
                    SerialLink::open(&port, &config)
                        .with_context(|| format!("opening serial link on {}", port))?,
                );
                let telemetry: Arc<dyn TelemetryBus> = link.clone();
                let commands: Arc<dyn CommandBus> = link;
                (telemetry, commands, port)
            }
            None => {
                info!("no serial port configured, using simulated base");
                let base = Arc::new(SimulatedBase::new(config.link.sim_failure_rate));
                let telemetry: Arc<dyn TelemetryBus> = base.clone();
                let commands: Arc<dyn CommandBus> = base;
                (telemetry, commands, "simulated base".to_string())
            }
        };

    PanelApp::run(Settings {
        window: window::Settings {
            size: iced::Size::new(900.0, 760.0),
            ..window::Settings::default()
        },
        ..Settings::with_flags(PanelFlags {
            config,
            telemetry,
            commands,
            source,
            fullscreen: args.fullscreen,
        })
    })?;
    Ok(())
}
