use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use self::{evaluate::EvaluateArg, formations::FormationsArg, optimize::OptimizeArg};

mod evaluate;
mod formations;
mod optimize;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Search the rating/chemistry Pareto frontier
    Optimize(#[clap(flatten)] OptimizeArg),
    /// Score a hand-written lineup
    Evaluate(#[clap(flatten)] EvaluateArg),
    /// List built-in formations
    Formations(#[clap(flatten)] FormationsArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_logging(&args)?;
    match args.mode {
        Mode::Optimize(arg) => optimize::run(&arg)?,
        Mode::Evaluate(arg) => evaluate::run(&arg)?,
        Mode::Formations(arg) => formations::run(&arg)?,
    }
    Ok(())
}

fn init_logging(args: &CommandArgs) -> anyhow::Result<()> {
    let level = match (args.quiet, args.verbose) {
        (true, _) => Level::WARN,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}
