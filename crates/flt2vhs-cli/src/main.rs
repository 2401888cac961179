// crates/flt2vhs-cli/src/main.rs

use std::io::Write;

use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "flt2vhs")]
#[command(about = "Convert flight recordings (.flt) into VHS tapes (.vhs)", long_about = None)]
pub struct Cli {
    /// More logging (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Prefix log lines with millisecond timestamps
    #[arg(long, global = true)]
    pub timestamps: bool,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert an .flt recording into a .vhs tape
    Convert(cmd::convert::ConvertArgs),

    /// Summarize the records in an .flt without converting
    Inspect(cmd::inspect::InspectArgs),

    /// Dump a .vhs tape as JSON lines (reads stdin without --in or with "-")
    Cat(cmd::cat::CatArgs),
}

fn init_logging(verbose: u8, timestamps: bool) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();
    if timestamps {
        builder.format(|buf, record| {
            writeln!(
                buf,
                "[{} {:5} {}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.target(),
                record.args()
            )
        });
    } else {
        builder.format_timestamp(None);
    }
    builder.init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.timestamps);

    let code = match cli.cmd {
        Commands::Convert(args) => cmd::convert::run(args)?,
        Commands::Inspect(args) => cmd::inspect::run(args)?,
        Commands::Cat(args) => cmd::cat::run(args)?,
    };
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
