//! Command line arguments of asc2eph

use camino::Utf8PathBuf;
use clap::Parser;

use asc2eph::constants::DEFAULT_OUTPUT;

#[derive(Parser, Debug)]
#[command(name = "asc2eph")]
#[command(about = "Convert JPL ASCII ephemeris files into a binary ephemeris")]
#[command(version)]
pub struct Cli {
    /// ASCII header file (header.440, header.405, ...)
    pub header: Utf8PathBuf,

    /// ASCII data files, processed in lexical order
    #[arg(required = true)]
    pub data_files: Vec<Utf8PathBuf>,

    /// Binary ephemeris to write
    #[arg(short, long, env = "ASC2EPH_OUTPUT", default_value = DEFAULT_OUTPUT)]
    pub output: Utf8PathBuf,

    /// Write to <output>.tmp and rename it only if the conversion succeeds
    #[arg(long)]
    pub atomic: bool,

    /// Read the binary file back and check its data records
    #[arg(long)]
    pub verify: bool,

    /// Print the conversion summary as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
