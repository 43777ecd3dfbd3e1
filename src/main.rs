use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use clap::{Args, Parser, Subcommand};
use log::{LevelFilter, Log, Metadata, Record};
use serde::Serialize;

use killfeed::output::{OutputArtifact, OutputDir};
use killfeed::{AssetSet, KillEvent, KillfeedConfig, Numeral, Orientation};

#[derive(Parser)]
#[command(name = "killfeed", about = "Render killfeed banners from an asset tree")]
struct Cli {
    /// Asset tree root (overrides the config file)
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    /// Output directory (overrides the config file)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render one killfeed and print the artifact as JSON
    Render(RenderArgs),
    /// List available agent identifiers
    Agents,
    /// List available weapon identifiers
    Weapons,
    /// Delete generated images older than the retention age
    Sweep {
        /// Retention in seconds (defaults to the configured age)
        #[arg(long)]
        max_age: Option<u64>,
    },
}

#[derive(Args)]
struct RenderArgs {
    #[arg(long)]
    killer: String,
    #[arg(long)]
    victim: String,
    #[arg(long)]
    killer_agent: String,
    #[arg(long)]
    victim_agent: String,
    #[arg(long)]
    weapon: String,
    #[arg(long)]
    headshot: bool,
    #[arg(long)]
    wallbang: bool,
    /// Highlight the local player
    #[arg(long)]
    player_kill: bool,
    /// Mirrored "killed by" layout
    #[arg(long)]
    reverse: bool,
    /// Multi-kill badge, 3 through 7
    #[arg(long)]
    numeral: Option<String>,
    /// Include the PNG as a data URL in the report
    #[arg(long)]
    data_url: bool,
    /// Skip the cleanup pass before rendering
    #[arg(long)]
    no_sweep: bool,
}

#[derive(Serialize)]
struct RenderReport {
    #[serde(flatten)]
    artifact: OutputArtifact,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_url: Option<String>,
}

struct StderrLogger {
    level: LevelFilter,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

fn log_level(verbose: u8, env: Option<&str>) -> LevelFilter {
    match verbose {
        0 => env.and_then(|v| v.parse().ok()).unwrap_or(LevelFilter::Warn),
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

fn init_logging(verbose: u8) {
    let env = std::env::var("KILLFEED_LOG").ok();
    let level = log_level(verbose, env.as_deref());
    let logger = Box::new(StderrLogger { level });
    if log::set_boxed_logger(logger).is_ok() {
        log::set_max_level(level);
    }
}

fn load_config(cli: &Cli) -> Result<KillfeedConfig> {
    let mut config = match &cli.config {
        Some(path) => KillfeedConfig::from_json_file(path)?,
        None => KillfeedConfig::default(),
    };
    if let Some(assets) = &cli.assets {
        config.asset_root = assets.clone();
    }
    if let Some(output) = &cli.output {
        config.output_dir = output.clone();
    }
    Ok(config)
}

fn render(config: &KillfeedConfig, args: RenderArgs) -> Result<()> {
    let numeral = match args.numeral.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<Numeral>()?),
    };
    let event = KillEvent::new(
        args.killer,
        args.victim,
        args.killer_agent,
        args.victim_agent,
        args.weapon,
    )
    .with_headshot(args.headshot)
    .with_wallbang(args.wallbang)
    .with_player_kill(args.player_kill)
    .with_numeral(numeral);
    event.validate()?;

    let output = OutputDir::create(&config.output_dir)
        .with_context(|| format!("cannot open output directory {}", config.output_dir.display()))?;
    if !args.no_sweep {
        output.sweep(Duration::from_secs(config.cleanup_max_age_secs))?;
    }

    let orientation = if args.reverse {
        Orientation::Reverse
    } else {
        Orientation::Forward
    };
    let compositor = killfeed::new_compositor(config);
    let artifact = compositor.generate(&event, orientation, &output)?;

    let data_url = if args.data_url {
        let bytes = std::fs::read(&artifact.path)?;
        Some(format!("data:image/png;base64,{}", STANDARD.encode(bytes)))
    } else {
        None
    };
    let report = RenderReport { artifact, data_url };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let assets = AssetSet::new(&config.asset_root, config.assets.clone());
    match cli.command {
        Command::Render(args) => render(&config, args)?,
        Command::Agents => {
            for id in assets.agents()? {
                println!("{}", id);
            }
        }
        Command::Weapons => {
            for id in assets.weapons()? {
                println!("{}", id);
            }
        }
        Command::Sweep { max_age } => {
            let output = OutputDir::create(&config.output_dir)?;
            let age = Duration::from_secs(max_age.unwrap_or(config.cleanup_max_age_secs));
            let report = output.sweep(age)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(e) = run(cli) {
        eprintln!("killfeed: {:#}", e);
        std::process::exit(1);
    }
}
