use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fabric-bridge", version)]
struct Cli {
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "warn")]
    log: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a simulated app through the bridge and print the resulting live tree.
    Replay(ReplayArgs),
    /// Print the layout descriptor the simulated engine publishes.
    Descriptor(DescriptorArgs),
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    /// Input app fixture JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Bridge options JSON.
    #[arg(long)]
    opts: Option<PathBuf>,

    /// Frames to run after the fixture script.
    #[arg(long, default_value_t = 1)]
    frames: u64,

    /// Navigate to this path after the frames, then run one more frame. Repeatable.
    #[arg(long)]
    navigate: Vec<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Html)]
    format: Format,
}

#[derive(Parser, Debug)]
struct DescriptorArgs {
    /// App fixture JSON; the built-in empty app when omitted.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Html,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log)?;
    match cli.cmd {
        Command::Replay(args) => cmd_replay(args),
        Command::Descriptor(args) => cmd_descriptor(args),
    }
}

fn init_tracing(default_filter: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(default_filter)
            .with_context(|| format!("parse log filter '{default_filter}'"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn read_app(path: &Path) -> anyhow::Result<fabric_bridge::SimApp> {
    fabric_bridge::SimApp::from_path(path)
        .with_context(|| format!("load app fixture '{}'", path.display()))
}

fn cmd_replay(args: ReplayArgs) -> anyhow::Result<()> {
    let app = read_app(&args.in_path)?;
    let opts = match &args.opts {
        Some(p) => fabric_bridge::BridgeOpts::from_path(p)
            .with_context(|| format!("load options '{}'", p.display()))?,
        None => fabric_bridge::BridgeOpts::default(),
    };

    let mut replay = fabric_bridge::Replay::new(app, opts).context("start bridge")?;
    replay.run_script().context("run fixture script")?;
    replay.run_frames(args.frames);
    for path in &args.navigate {
        replay
            .bridge_mut()
            .navigate(path)
            .with_context(|| format!("navigate to '{path}'"))?;
        replay.frame();
    }

    let summary = replay.summary();
    if summary.halted {
        anyhow::bail!("render loop halted after {} frames", summary.frames);
    }
    match args.format {
        Format::Html => print!("{}", replay.bridge().dom().to_html()),
        Format::Json => println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("serialize summary")?
        ),
    }
    Ok(())
}

fn cmd_descriptor(args: DescriptorArgs) -> anyhow::Result<()> {
    let app = match &args.in_path {
        Some(p) => read_app(p)?,
        None => fabric_bridge::SimApp::default(),
    };
    let mut engine = fabric_bridge::SimEngine::new(app);
    let layout = fabric_bridge::LayoutDescriptor::load(&mut engine).context("load descriptor")?;
    println!(
        "{}",
        serde_json::to_string_pretty(&layout).context("serialize descriptor")?
    );
    Ok(())
}
