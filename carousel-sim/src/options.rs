use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "carousel-sim", bin_name = "carousel-sim")]
#[command(about = "Assemble and simulate column-carousel (SMB) chromatography processes")]
pub struct Cli {
    #[command(flatten)]
    pub verbosity: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a process description and print the resolved flow rates
    Check {
        #[command(flatten)]
        source: ProcessSource,
    },
    /// Print the column-to-slot assignment for the switching schedule
    Schedule {
        #[command(flatten)]
        source: ProcessSource,

        /// Number of switches to print (default is one full cycle)
        #[arg(long)]
        switches: Option<usize>,
    },
    /// Assemble the process and run it through an external column solver
    Simulate(SimulateArgs),
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub source: ProcessSource,

    /// Path to the solver executable, invoked as `<solver> <process.xml> <solution.csv>`
    #[arg(long, value_name = "EXECUTABLE")]
    pub solver: PathBuf,

    /// Number of full carousel cycles to simulate
    #[arg(long, default_value_t = 1)]
    pub cycles: u32,

    /// Override the time integrator absolute tolerance
    #[arg(long)]
    pub abstol: Option<f64>,

    /// Override the time integrator relative tolerance
    #[arg(long)]
    pub reltol: Option<f64>,

    /// Override the time integrator initial step size
    #[arg(long)]
    pub init_step_size: Option<f64>,

    /// Override the time integrator maximum step size
    #[arg(long)]
    pub max_step_size: Option<f64>,

    /// Write the solution table to a CSV file instead of printing it
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Keep the solver working directory instead of deleting it
    #[arg(long)]
    pub keep_work_dir: bool,

    /// Report the cycle-to-cycle deviation of the solution
    #[arg(long)]
    pub stationarity: bool,
}

/// Where the process description comes from, either an XML file or a bundled demo.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct ProcessSource {
    /// Path to a carousel process XML file
    #[arg(value_name = "PROCESS")]
    pub process: Option<PathBuf>,

    /// Use a bundled demo process instead of a file
    #[arg(long, value_enum)]
    pub demo: Option<DemoProcess>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DemoProcess {
    /// Four-zone binary separation with a closed recycle loop
    BinarySmb,
    /// Five-zone ternary separation with two extract draws
    TernarySmb,
}
