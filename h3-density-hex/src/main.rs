mod converter;
mod error;
mod identifier;
mod input;
mod instrumented_reader;
mod record;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

const EXAMPLE: &str = "Example: h3-density-hex sample_points.csv sample-density.csv";

/// Convert H3 ids in a density CSV from unsigned decimal to hexadecimal.
#[derive(clap::Parser, Debug)]
#[command(name = "h3-density-hex", version, after_help = EXAMPLE)]
struct ClArgs {
    /// Input CSV of `decimal_id,density` lines, plain or gzip-compressed
    #[arg()]
    input: PathBuf,

    /// Output CSV path, written as `h3code,density`
    #[arg()]
    output: PathBuf,

    /// Verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_args() -> ClArgs {
    match ClArgs::try_parse() {
        Ok(args) => args,
        // Usage errors get the example appended; --help and --version exit as usual.
        Err(err) if err.use_stderr() => {
            let _ = err.print();
            eprintln!("\n{}", EXAMPLE);
            std::process::exit(err.exit_code());
        }
        Err(err) => err.exit(),
    }
}

fn main() -> anyhow::Result<()> {
    let args = parse_args();
    init_logging(args.verbose);

    info!("Converting {} -> {}", args.input.display(), args.output.display());
    let summary = converter::convert_file(&args.input, &args.output).with_context(|| {
        format!(
            "converting {} to {}",
            args.input.display(),
            args.output.display()
        )
    })?;

    if summary.skipped() > 0 {
        info!(
            "Skipped {} lines ({} malformed, {} with bad identifiers)",
            summary.skipped(),
            summary.malformed,
            summary.unparseable
        );
    }
    println!("Successfully converted {} records", summary.converted);
    println!("Output written to: {}", args.output.display());
    Ok(())
}
