//! The validated, immutable process network.

use std::collections::HashMap;

use crate::{
    component::ComponentSystem,
    schedule::{InitialLayout, SwitchSchedule},
    units::{ColumnModel, Unit},
    zone::Zone,
};

/// Which side of a unit a connection attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortSide {
    Inlet,
    Outlet,
}

/// One side of a named unit in the connection graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Port {
    unit: String,
    side: PortSide,
}

impl Port {
    pub fn inlet(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            side: PortSide::Inlet,
        }
    }

    pub fn outlet(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            side: PortSide::Outlet,
        }
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn side(&self) -> PortSide {
        self.side
    }
}

impl std::fmt::Display for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.side {
            PortSide::Inlet => write!(f, "{}:in", self.unit),
            PortSide::Outlet => write!(f, "{}:out", self.unit),
        }
    }
}

/// A validated directed edge of the graph with its resolved split fraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub(crate) source: Port,
    pub(crate) target: Port,
    pub(crate) fraction: f64,
    pub(crate) source_idx: usize,
    pub(crate) target_idx: usize,
}

impl Connection {
    /// The outlet port the stream leaves from.
    pub fn source(&self) -> &Port {
        &self.source
    }

    /// The inlet port the stream arrives at.
    pub fn target(&self) -> &Port {
        &self.target
    }

    /// Share of the source unit's outflow carried by this edge.
    pub fn fraction(&self) -> f64 {
        self.fraction
    }
}

/// An immutable, validated carousel network.
///
/// Produced by [`CarouselBuilder::validate`](crate::CarouselBuilder::validate).
/// All configuration happens on the builder; a network only answers
/// questions and assembles processes.
#[derive(Debug, Clone)]
pub struct Network {
    pub(crate) name: String,
    pub(crate) system: ComponentSystem,
    pub(crate) units: Vec<Unit>,
    pub(crate) index: HashMap<String, usize>,
    pub(crate) connections: Vec<Connection>,
    /// Zone unit indices in carousel order, starting at the first
    /// registered zone.
    pub(crate) ring: Vec<usize>,
    pub(crate) switch_time: f64,
    pub(crate) n_columns: usize,
    pub(crate) column_model: Option<ColumnModel>,
    pub(crate) valve_dead_volume: Option<f64>,
    pub(crate) initial_layout: InitialLayout,
}

impl Network {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn system(&self) -> &ComponentSystem {
        &self.system
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    pub fn unit(&self, name: &str) -> Option<&Unit> {
        self.index.get(name).map(|&idx| &self.units[idx])
    }

    /// Connections in configuration order, fractions resolved.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// The switch interval τ in seconds.
    pub fn switch_time(&self) -> f64 {
        self.switch_time
    }

    /// Total number of physical columns (and slots) on the carousel.
    pub fn n_columns(&self) -> usize {
        self.n_columns
    }

    /// Zones in carousel order, beginning with the first registered zone.
    /// Slot indices follow this order, one slot per column.
    pub fn carousel_zones(&self) -> impl Iterator<Item = &Zone> + '_ {
        self.ring
            .iter()
            .filter_map(move |&idx| self.units[idx].as_zone())
    }

    pub fn column_model(&self) -> Option<&ColumnModel> {
        self.column_model.as_ref()
    }

    pub fn initial_layout(&self) -> &InitialLayout {
        &self.initial_layout
    }

    /// The switching rule over this network's slots.
    pub fn schedule(&self) -> SwitchSchedule {
        SwitchSchedule::new(self.switch_time, self.n_columns)
            .with_layout(self.initial_layout.clone())
    }

    /// Effective hold-up volume on the column inlet lines of `zone`, the
    /// zone's own or the process-wide default.
    pub(crate) fn dead_volume_for(&self, zone: &Zone) -> Option<f64> {
        zone.dead_volume().or(self.valve_dead_volume)
    }
}
