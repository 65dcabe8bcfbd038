//! asc2eph: JPL ASCII ephemeris to binary converter
//!
//! ```text
//! asc2eph header.440 ascp01550.440 ascp01650.440 -o de440.bin --atomic --verify
//! ```

mod cli;

use std::{fs::File, io::BufReader, process::ExitCode};

use clap::Parser;
use tracing::{error, info};

use asc2eph::{
    asc2eph_errors::Asc2EphError,
    binary::reader::EphemerisReader,
    convert::{convert, ConvertOptions},
};
use cli::Cli;

fn run(cli: &Cli) -> Result<(), Asc2EphError> {
    let options = ConvertOptions {
        output: cli.output.clone(),
        atomic: cli.atomic,
    };
    let summary = convert(&cli.header, cli.data_files.as_slice(), &options)?;

    if cli.verify {
        let file = File::open(&options.output).map_err(|source| Asc2EphError::FileOpen {
            path: options.output.clone(),
            source,
        })?;
        let mut reader = EphemerisReader::new(BufReader::new(file), options.output.as_str())?;
        let verification = reader.verify()?;
        info!(
            records = verification.data_records,
            span = %verification.span,
            "binary ephemeris verified"
        );
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|err| Asc2EphError::Write(std::io::Error::other(err)))?;
        println!("{json}");
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
