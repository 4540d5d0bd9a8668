#![doc = include_str!("../README.md")]
#![deny(clippy::all)]

use carousel::{schema, Network, Unit};
use itertools::Itertools;

pub mod demo;
mod interpolation;
pub mod options;
pub mod solver;
pub mod stationarity;

use options::{Cli, Commands, DemoProcess, ProcessSource, SimulateArgs};
use solver::{ExternalSolver, ProcessSolver};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Carousel(#[from] carousel::Error),

    #[error(transparent)]
    Schema(#[from] schema::Error),

    #[error(transparent)]
    Solve(#[from] solver::SolveError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Solution table has no '{0}' column")]
    MissingColumn(String),

    #[error("Solution table spans {span} s, need two full cycles of {cycle_time} s")]
    ShortSolution { span: f64, cycle_time: f64 },
}

/// Run the parsed command line.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Check { source } => check(&load_network(&source)?)?,
        Commands::Schedule { source, switches } => {
            print_schedule(&load_network(&source)?, switches)
        }
        Commands::Simulate(args) => simulate(args)?,
    }
    Ok(())
}

/// Load a [`Network`] from a process XML file or one of the bundled demos.
fn load_network(source: &ProcessSource) -> Result<Network, Error> {
    match (&source.process, source.demo) {
        (Some(path), _) => {
            log::info!("Reading process description from {path:?}");
            let xml = std::fs::read_to_string(path)?;
            let document: schema::CarouselProcess = schema::deserialize(&xml)?;
            document.check_version()?;
            Ok(Network::from_document(&document)?)
        }
        (None, Some(DemoProcess::BinarySmb)) => Ok(demo::binary_smb()?),
        (None, Some(DemoProcess::TernarySmb)) => Ok(demo::ternary_smb()?),
        // the argument group requires exactly one source
        (None, None) => unreachable!(),
    }
}

/// Validate the process and print the resolved steady flow of every unit.
fn check(network: &Network) -> Result<(), Error> {
    let process = network.build()?;

    let mut table = comfy_table::Table::new();
    table.set_header(vec!["Unit", "Kind", "Flow [m^3/s]"]);
    for unit in network.units() {
        let kind = match unit {
            Unit::Inlet(_) => "inlet".to_string(),
            Unit::Outlet(_) => "outlet".to_string(),
            Unit::Zone(zone) => format!(
                "zone, {} column(s), {:?}",
                zone.n_columns(),
                zone.arrangement()
            ),
        };
        let flow = process
            .unit_flow(unit.name())
            .map(|q| format!("{q:.4e}"))
            .unwrap_or_default();
        table.add_row(vec![unit.name().to_string(), kind, flow]);
    }
    println!("{table}");

    let schedule = network.schedule();
    println!(
        "Process '{}': {} columns, switch time {} s, cycle time {} s",
        network.name(),
        network.n_columns(),
        schedule.switch_time(),
        schedule.cycle_time()
    );
    Ok(())
}

/// Print the column occupying each carousel slot for the first `switches`
/// switch intervals (one full cycle by default).
fn print_schedule(network: &Network, switches: Option<usize>) {
    let schedule = network.schedule();
    let count = switches.unwrap_or(network.n_columns());

    let mut header = vec!["Switch".to_string(), "Window [s]".to_string()];
    for zone in network.carousel_zones() {
        for position in 0..zone.n_columns() {
            header.push(format!("{}[{position}]", zone.name()));
        }
    }

    let mut table = comfy_table::Table::new();
    table.set_header(header);
    for index in 0..count {
        let window = schedule.interval(index as i64);
        let layout = schedule.layout_at_switch(index as i64);
        let mut row = vec![
            index.to_string(),
            format!("{} .. {}", window.start, window.end),
        ];
        row.extend(layout.iter().map(|column| format!("column_{column}")));
        table.add_row(row);
    }
    println!("{table}");
}

/// Assemble the process document, hand it to the external solver and
/// report the solution.
fn simulate(args: SimulateArgs) -> Result<(), Error> {
    let network = load_network(&args.source)?;
    let process = network.build()?;

    let mut document = process.document();
    document.n_cycles = args.cycles;

    let mut integrator = document.time_integrator.clone().unwrap_or_default();
    if let Some(abstol) = args.abstol {
        integrator.abstol = abstol;
    }
    if let Some(reltol) = args.reltol {
        integrator.reltol = reltol;
    }
    if let Some(step) = args.init_step_size {
        integrator.init_step_size = step;
    }
    if let Some(step) = args.max_step_size {
        integrator.max_step_size = step;
    }
    document.time_integrator = Some(integrator);

    let mut solver = ExternalSolver::new(&args.solver).keep_work_dir(args.keep_work_dir);
    let solution = solver.solve(&document)?;

    if let Some(path) = &args.output {
        let file = std::fs::File::create(path)?;
        let mut writer = arrow::csv::WriterBuilder::new()
            .with_header(true)
            .build(file);
        writer.write(&solution)?;
        log::info!("Wrote solution table to {path:?}");
    } else {
        let formatted = arrow::util::pretty::pretty_format_batches(&[solution.clone()])?;
        println!("{formatted}");
    }

    if args.stationarity {
        let cycle_time = network.schedule().cycle_time();
        let deviations = stationarity::cycle_deviation(&solution, cycle_time)?;
        let options = stationarity::StationarityOptions::default();
        for deviation in &deviations {
            println!(
                "{}: max cycle deviation {:.3e} ({})",
                deviation.column,
                deviation.max_deviation,
                if deviation.is_stationary(&options) {
                    "stationary"
                } else {
                    "not stationary"
                }
            );
        }
        if stationarity::is_stationary(&deviations, &options) {
            println!("Cyclic steady state reached.");
        } else {
            let lagging = deviations
                .iter()
                .filter(|d| !d.is_stationary(&options))
                .map(|d| d.column.as_str())
                .join(", ");
            println!("Cyclic steady state not reached, still drifting: {lagging}");
        }
    }

    Ok(())
}
