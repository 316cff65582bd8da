//! Nodal - DC circuit analysis console
//!
//! Enter resistive circuits branch by branch and query node voltages and
//! branch currents, solved exactly.
//!
//! # Usage
//!
//! ```bash
//! nodal divider.txt
//! echo "RETURN V(ALL)" | nodal --no-color --quiet divider.txt
//! ```

use std::io;
use std::path::PathBuf;

use clap::Parser;
use nodal_core::{
    error::Result,
    repl::{Repl, ReplConfig, DEFAULT_PRECISION},
};

/// Exact nodal analysis of resistive DC circuits
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Netlist files imported before the prompt
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Disable colours and cursor control
    #[arg(long)]
    no_color: bool,

    /// Decimals shown for voltages and currents
    #[arg(short, long, default_value_t = DEFAULT_PRECISION)]
    precision: usize,

    /// Skip the banner and the echo of imported files
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ReplConfig::new()
        .with_color(!args.no_color)
        .with_precision(args.precision);
    if args.quiet {
        config = config.quiet();
    }

    let stdin = io::stdin();
    let mut repl = Repl::new(stdin.lock(), io::stdout(), config);

    repl.greet()?;
    for path in &args.files {
        repl.load(path)?;
    }
    repl.run()
}
