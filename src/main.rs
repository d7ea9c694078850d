// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand, ValueEnum};
use kinect_mesh::app::{MeshApp, ParamId, Tunables};
use kinect_mesh::backends::sensor::{SensorPreference, open_sensor};
use kinect_mesh::config::Config;
use kinect_mesh::constants::APP_DIR_NAME;
use kinect_mesh::mesh::RenderMode;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "kinect-mesh")]
#[command(about = "Live depth-camera height-field mesh viewer")]
#[command(version = env!("GIT_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Use the synthetic depth scene instead of a Kinect
    #[arg(long, global = true)]
    synthetic: bool,

    /// Config file (default: ~/.config/kinect-mesh/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Mesh resolution divisor (1 = full resolution)
    #[arg(long, global = true)]
    divisor: Option<i32>,

    /// Initial render mode
    #[arg(long, global = true, value_enum)]
    mode: Option<ModeArg>,
}

#[derive(Subcommand)]
enum Commands {
    /// List attached depth sensors
    List,

    /// Build meshes without a UI and print a JSON summary
    Stats {
        /// Number of depth frames to process
        #[arg(short, long, default_value = "1")]
        frames: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Depth hue colors
    Color,
    /// RGB video texture
    Rgb,
    /// Infrared video texture
    Infrared,
}

impl From<ModeArg> for RenderMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Color => RenderMode::DepthColor,
            ModeArg::Rgb => RenderMode::RgbTexture,
            ModeArg::Infrared => RenderMode::InfraredTexture,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // The viewer owns the terminal, so its logs go to a file
    init_logging(cli.command.is_none());

    match cli.command {
        Some(Commands::List) => cli::list_sensors()?,
        Some(Commands::Stats { frames }) => cli::print_stats(build_app(&cli)?, frames)?,
        None => kinect_mesh::terminal::run(build_app(&cli)?)?,
    }

    Ok(())
}

/// Set RUST_LOG to control the log level, e.g. RUST_LOG=kinect_mesh=debug
fn init_logging(to_file: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true);

    if to_file {
        match open_log_file() {
            Some(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).init(),
            None => builder.with_writer(std::io::sink).init(),
        }
    } else {
        builder.with_writer(std::io::stderr).init();
    }
}

/// `<cache>/kinect-mesh/kinect-mesh.log`, truncated on each start
fn open_log_file() -> Option<File> {
    let dir = dirs::cache_dir()?.join(APP_DIR_NAME);
    std::fs::create_dir_all(&dir).ok()?;
    File::create(dir.join(format!("{}.log", APP_DIR_NAME))).ok()
}

/// Merge config file and command line, then open the sensor
fn build_app(cli: &Cli) -> Result<MeshApp, Box<dyn std::error::Error>> {
    let config = Config::load_or_default(cli.config.as_deref())?;

    let mut tunables: Tunables = config.tunables;
    if let Some(divisor) = cli.divisor {
        tunables.set(ParamId::MeshResolution, divisor as f64);
    }
    if let Some(mode) = cli.mode {
        tunables.mode = mode.into();
    }

    let preference = if cli.synthetic {
        SensorPreference::Synthetic
    } else {
        config.sensor
    };

    Ok(MeshApp::new(open_sensor(preference), tunables))
}
