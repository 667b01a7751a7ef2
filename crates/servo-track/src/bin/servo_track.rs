//! servo-track CLI: replay recorded detections, inspect configs, decode
//! telemetry frames.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use servo_track::replay::{run_replay, DetectionLog};
use servo_track::telemetry::{decode_stream, TelemetryFrame};
use servo_track::{Preset, TrackerConfig};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "servo-track")]
#[command(about = "Rectangle tracking visual servo loop with UART error telemetry")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit structured JSON logs through `tracing` (honours RUST_LOG).
    #[cfg(feature = "tracing")]
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the tracking loop over recorded detector output.
    Replay(ReplayArgs),

    /// Print the effective configuration as JSON.
    Config(ConfigArgs),

    /// Decode hex-encoded telemetry frames.
    Decode {
        /// Frame bytes in hex, e.g. "66 66 CE FF F6 F6".
        hex: String,
    },
}

#[derive(Debug, Clone, Args)]
struct ConfigArgs {
    /// JSON configuration file; missing keys take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Parameter preset applied on top of the configuration.
    #[arg(long, value_enum)]
    preset: Option<PresetArg>,
}

#[derive(Debug, Clone, Args)]
struct ReplayArgs {
    /// JSON file with one detector result per frame (`null` = detector failure).
    #[arg(long)]
    detections: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,

    /// File or pre-configured serial device receiving telemetry frames.
    #[arg(long)]
    serial: Option<PathBuf>,

    /// Path to write the replay report (JSON).
    #[arg(long)]
    report: Option<PathBuf>,

    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<u64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PresetArg {
    HighAccuracy,
    HighSpeed,
    Balanced,
}

impl PresetArg {
    fn to_core(self) -> Preset {
        match self {
            PresetArg::HighAccuracy => Preset::HighAccuracy,
            PresetArg::HighSpeed => Preset::HighSpeed,
            PresetArg::Balanced => Preset::Balanced,
        }
    }
}

impl ConfigArgs {
    /// Resolve the configuration and a label describing where it came from.
    fn resolve(&self) -> CliResult<(TrackerConfig, String)> {
        let (mut cfg, mut source) = match &self.config {
            Some(path) => (TrackerConfig::load_json(path)?, path.display().to_string()),
            None => (TrackerConfig::default(), "defaults".to_string()),
        };
        if let Some(preset) = self.preset {
            let preset = preset.to_core();
            preset.apply(&mut cfg);
            cfg.validate()?;
            source.push_str(&format!(" + preset {preset:?}"));
        }
        Ok((cfg, source))
    }
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    match cli.command {
        Commands::Replay(args) => run_replay_cmd(&args),
        Commands::Config(args) => run_config(&args),
        Commands::Decode { hex } => run_decode(&hex),
    }
}

#[cfg(feature = "tracing")]
fn init_logging(cli: &Cli) -> CliResult<()> {
    if cli.json_logs {
        servo_track::core::init_tracing(true);
        return Ok(());
    }
    servo_track::core::init_with_level(servo_track::core::level_from_verbosity(cli.verbose))?;
    Ok(())
}

#[cfg(not(feature = "tracing"))]
fn init_logging(cli: &Cli) -> CliResult<()> {
    servo_track::core::init_with_level(servo_track::core::level_from_verbosity(cli.verbose))?;
    Ok(())
}

// ── replay ─────────────────────────────────────────────────────────────

fn run_replay_cmd(args: &ReplayArgs) -> CliResult<()> {
    let (cfg, source) = args.config.resolve()?;
    info!("Loading detections: {}", args.detections.display());
    let log = DetectionLog::load_json(&args.detections)?;

    let report = run_replay(&cfg, &source, log, args.serial.as_deref(), args.max_frames)?;

    let stats = &report.summary.stats;
    println!(
        "frames={} detections={} sent={} failed={} unlinked={} recovered={} stop={:?}",
        stats.frames,
        stats.detections,
        stats.telemetry_sent,
        stats.telemetry_failed,
        stats.telemetry_unlinked,
        stats.recovered_errors,
        report.summary.reason,
    );

    if let Some(path) = &args.report {
        report.write_json(path)?;
        info!("Report written to {}", path.display());
    }
    Ok(())
}

// ── config ─────────────────────────────────────────────────────────────

fn run_config(args: &ConfigArgs) -> CliResult<()> {
    let (cfg, source) = args.resolve()?;
    info!("{}", cfg.summary(&source));
    println!("{}", serde_json::to_string_pretty(&cfg)?);
    Ok(())
}

// ── decode ─────────────────────────────────────────────────────────────

fn run_decode(hex: &str) -> CliResult<()> {
    let bytes = parse_hex(hex)?;
    let frames = decode_stream(&bytes);
    if frames.is_empty() {
        // Report why the leading bytes are not a frame.
        TelemetryFrame::decode(&bytes)?;
    }
    for frame in frames {
        let rendered: Vec<String> = frame
            .as_bytes()
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect();
        println!("error={} bytes=[{}]", frame.error(), rendered.join(" "));
    }
    Ok(())
}

fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let digits: String = input
        .split_whitespace()
        .map(|chunk| {
            chunk
                .trim_start_matches("0x")
                .trim_start_matches("0X")
                .to_string()
        })
        .collect();
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(format!("not a hex string: {input:?}").into());
    }
    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits in {input:?}").into());
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|e| -> CliError { format!("invalid hex byte: {e}").into() })
        })
        .collect()
}
