//! The `carousel` crate models periodic column-switching (simulated moving
//! bed) chromatography processes as static networks with a switching rule.
//! A process is configured incrementally on a [`CarouselBuilder`], validated
//! into an immutable [`Network`], and assembled into a [`Process`] holding
//! one concrete flow graph per switch interval of a carousel cycle. The
//! assembled process is handed to an external column solver as a
//! [`schema::CarouselProcess`] document; solving the column equations is out
//! of scope here.
//!
//! ## Examples
//!
//! ### A four-zone binary separation
//!
//! ```rust
//! use carousel::{CarouselBuilder, ComponentSystem, Inlet, Outlet, Zone};
//!
//! fn main() -> Result<(), carousel::Error> {
//!     let system = ComponentSystem::new(["A", "B"]);
//!
//!     let mut builder = CarouselBuilder::new("smb", system.clone());
//!     builder.add_unit(Inlet::new("eluent", &system).with_flow_rate(4.14e-8))?;
//!     builder.add_unit(
//!         Inlet::new("feed", &system)
//!             .with_concentrations([2.78e3, 2.78e3])?
//!             .with_flow_rate(2.0e-8),
//!     )?;
//!     builder.add_unit(Outlet::new("extract"))?;
//!     builder.add_unit(Outlet::new("raffinate"))?;
//!     for zone in ["zone_I", "zone_II", "zone_III", "zone_IV"] {
//!         builder.add_unit(Zone::serial(zone, 2)?)?;
//!     }
//!
//!     builder.add_connection("eluent", "zone_I")?;
//!     builder.add_connection("zone_I", "extract")?;
//!     builder.add_connection("zone_I", "zone_II")?;
//!     builder.set_output_state("zone_I", &[0.248, 0.752])?;
//!     builder.add_connection("zone_II", "zone_III")?;
//!     builder.add_connection("feed", "zone_III")?;
//!     builder.add_connection("zone_III", "raffinate")?;
//!     builder.add_connection("zone_III", "zone_IV")?;
//!     builder.set_output_state("zone_III", &[0.213, 0.787])?;
//!     builder.add_connection("zone_IV", "zone_I")?;
//!     builder.set_switch_time(1552.0);
//!
//!     let network = builder.validate()?;
//!     let process = network.build()?;
//!     assert_eq!(process.stages().len(), 8);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature flags
#![doc = document_features::document_features!()]
#![deny(clippy::all)]

// Re-export the carousel-schema crate
pub use carousel_schema as schema;

pub mod builder;
pub mod component;
mod document;
mod flow;
pub mod network;
pub mod process;
pub mod schedule;
pub mod units;
pub mod zone;

pub use builder::CarouselBuilder;
pub use component::ComponentSystem;
pub use network::{Connection, Network, Port, PortSide};
pub use process::{FlowStage, LogicalFlow, Process, StageFlow};
pub use schedule::{InitialLayout, SwitchSchedule};
pub use units::{ColumnModel, Inlet, LinearBinding, Outlet, Unit};
pub use zone::{Zone, ZoneArrangement};

/// Split fractions leaving a port, and parallel column weights, must sum
/// to 1 within this tolerance.
pub const FRACTION_TOLERANCE: f64 = 1e-9;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("A unit named '{name}' is already registered")]
    DuplicateName { name: String },

    #[error("Flow split imbalance at '{unit}': {detail}")]
    FlowImbalance { unit: String, detail: String },

    #[error("Network topology error: {detail}")]
    Topology { detail: String },

    #[error("Cannot resolve steady flow rates: {detail}")]
    UnderspecifiedFlow { detail: String },

    #[error("Unknown unit: {name}")]
    UnknownUnit { name: String },

    #[error("Connection '{from}' -> '{target}' already exists")]
    DuplicateConnection { from: String, target: String },

    #[error("'{target}' is an inlet stream and cannot receive a connection from '{from}'")]
    ConnectionIntoSource { from: String, target: String },

    #[error("'{from}' is an outlet stream and cannot feed a connection to '{target}'")]
    ConnectionFromSink { from: String, target: String },

    #[error("Zone '{zone}' must hold at least one column")]
    EmptyZone { zone: String },

    #[error("Unit '{unit}' carries {found} component values, the process has {expected}")]
    ComponentMismatch {
        unit: String,
        expected: usize,
        found: usize,
    },

    #[error("Invalid switch time: {detail}")]
    InvalidSwitchTime { detail: String },

    #[error("Initial layout is not a permutation of {n_slots} slots")]
    InvalidLayout { n_slots: usize },

    #[error("Zone '{zone}' has unknown arrangement '{value}'")]
    InvalidArrangement { zone: String, value: String },

    #[error(transparent)]
    Schema(#[from] carousel_schema::Error),
}
