use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use env_logger::{Env, Target};
use log::LevelFilter;
use pioneerflat_io_fs::{LOG_TARGET_PROGRESS, SpecFlattenOptions, flatten_contents};

#[derive(Parser, Debug)]
#[command(name = "pioneerflat")]
#[command(
    about = "Copy every file under a Pioneer Contents folder into one flat directory",
    long_about = None
)]
#[command(version)]
struct Args {
    /// Path to the Pioneer "Contents" folder
    #[arg(value_name = "PIONEER")]
    pioneer: PathBuf,

    /// Destination directory, created if missing
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,
}

/// Bare messages on stdout; `RUST_LOG` overrides the `info` default.
///
/// Progress lines are installed after the environment filter and always print.
fn init_logging() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .filter(Some(LOG_TARGET_PROGRESS), LevelFilter::Info)
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .target(Target::Stdout)
        .init();
}

fn run(args: &Args) -> anyhow::Result<()> {
    let report = flatten_contents(&args.pioneer, &args.output, &SpecFlattenOptions::default())?;
    if report.cnt_renamed > 0 {
        log::debug!("{} file(s) renamed to avoid collisions", report.cnt_renamed);
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("{e:?}");
            println!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
