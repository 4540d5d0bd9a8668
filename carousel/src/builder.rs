//! Incremental configuration of a carousel process.

use std::collections::HashMap;

use itertools::Itertools;

use crate::{
    component::ComponentSystem,
    network::{Connection, Network, Port},
    schedule::InitialLayout,
    units::{ColumnModel, Unit},
    Error, FRACTION_TOLERANCE,
};

#[derive(Debug, Clone)]
struct RawConnection {
    source: usize,
    target: usize,
    fraction: Option<f64>,
}

/// Accumulates units, connections and switching parameters, then validates
/// them into an immutable [`Network`].
///
/// Registration appends facts and only checks what is locally checkable
/// (names, port directions, fraction ranges). Whole-graph conditions are
/// deferred to [`validate`](Self::validate).
#[derive(Debug, Clone)]
pub struct CarouselBuilder {
    name: String,
    system: ComponentSystem,
    units: Vec<Unit>,
    index: HashMap<String, usize>,
    connections: Vec<RawConnection>,
    switch_time: Option<f64>,
    column_model: Option<ColumnModel>,
    valve_dead_volume: Option<f64>,
    initial_layout: InitialLayout,
}

impl CarouselBuilder {
    pub fn new(name: impl Into<String>, system: ComponentSystem) -> Self {
        Self {
            name: name.into(),
            system,
            units: Vec::new(),
            index: HashMap::new(),
            connections: Vec::new(),
            switch_time: None,
            column_model: None,
            valve_dead_volume: None,
            initial_layout: InitialLayout::default(),
        }
    }

    /// Registers a unit under its name.
    pub fn add_unit(&mut self, unit: impl Into<Unit>) -> Result<(), Error> {
        let unit = unit.into();
        let name = unit.name().to_string();
        if self.index.contains_key(&name) {
            return Err(Error::DuplicateName { name });
        }
        if let Unit::Inlet(inlet) = &unit {
            if inlet.concentrations().len() != self.system.n_components() {
                return Err(Error::ComponentMismatch {
                    unit: name,
                    expected: self.system.n_components(),
                    found: inlet.concentrations().len(),
                });
            }
        }
        log::debug!("Registering unit '{name}'");
        self.index.insert(name, self.units.len());
        self.units.push(unit);
        Ok(())
    }

    /// Connects the outlet of `source` to the inlet of `target`, with the
    /// split fraction left open.
    ///
    /// A port with a single outgoing connection carries its full outflow; a
    /// port with several needs explicit fractions, either per connection
    /// via [`add_connection_weighted`](Self::add_connection_weighted) or in
    /// bulk via [`set_output_state`](Self::set_output_state).
    pub fn add_connection(&mut self, source: &str, target: &str) -> Result<(), Error> {
        self.connect(source, target, None)
    }

    /// Connects `source` to `target` with an explicit split fraction in
    /// (0, 1].
    pub fn add_connection_weighted(
        &mut self,
        source: &str,
        target: &str,
        fraction: f64,
    ) -> Result<(), Error> {
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(Error::FlowImbalance {
                unit: source.to_string(),
                detail: format!("split fraction {fraction} toward '{target}' is outside (0, 1]"),
            });
        }
        self.connect(source, target, Some(fraction))
    }

    fn connect(&mut self, source: &str, target: &str, fraction: Option<f64>) -> Result<(), Error> {
        let source_idx = self.lookup(source)?;
        let target_idx = self.lookup(target)?;
        if self.units[source_idx].is_sink() {
            return Err(Error::ConnectionFromSink {
                from: source.to_string(),
                target: target.to_string(),
            });
        }
        if self.units[target_idx].is_source() {
            return Err(Error::ConnectionIntoSource {
                from: source.to_string(),
                target: target.to_string(),
            });
        }
        if self
            .connections
            .iter()
            .any(|c| c.source == source_idx && c.target == target_idx)
        {
            return Err(Error::DuplicateConnection {
                from: source.to_string(),
                target: target.to_string(),
            });
        }
        log::debug!("Connecting '{source}' -> '{target}'");
        self.connections.push(RawConnection {
            source: source_idx,
            target: target_idx,
            fraction,
        });
        Ok(())
    }

    /// Assigns split fractions to the outgoing connections of `source`, in
    /// the order the connections were added. The fractions must be in
    /// (0, 1] and sum to 1.
    pub fn set_output_state(&mut self, source: &str, fractions: &[f64]) -> Result<(), Error> {
        let source_idx = self.lookup(source)?;
        let outgoing: Vec<usize> = self
            .connections
            .iter()
            .positions(|c| c.source == source_idx)
            .collect();
        if outgoing.len() != fractions.len() {
            return Err(Error::FlowImbalance {
                unit: source.to_string(),
                detail: format!(
                    "{} fractions given for {} outgoing connections",
                    fractions.len(),
                    outgoing.len()
                ),
            });
        }
        if let Some(fraction) = fractions.iter().find(|f| !(**f > 0.0 && **f <= 1.0)) {
            return Err(Error::FlowImbalance {
                unit: source.to_string(),
                detail: format!("split fraction {fraction} is outside (0, 1]"),
            });
        }
        let sum: f64 = fractions.iter().sum();
        if (sum - 1.0).abs() > FRACTION_TOLERANCE {
            return Err(Error::FlowImbalance {
                unit: source.to_string(),
                detail: format!("split fractions sum to {sum}, expected 1"),
            });
        }
        for (connection_idx, fraction) in outgoing.into_iter().zip(fractions) {
            self.connections[connection_idx].fraction = Some(*fraction);
        }
        Ok(())
    }

    /// Sets the switch interval τ in seconds.
    pub fn set_switch_time(&mut self, switch_time: f64) {
        self.switch_time = Some(switch_time);
    }

    /// Sets the column model shared by every column on the carousel.
    pub fn set_column_model(&mut self, model: ColumnModel) {
        self.column_model = Some(model);
    }

    /// Default hold-up volume in m³ on every column inlet line. A zone's
    /// own dead volume takes precedence.
    pub fn set_valve_dead_volume(&mut self, volume: f64) {
        self.valve_dead_volume = Some(volume);
    }

    /// Sets the column-to-slot assignment at t = 0.
    pub fn set_initial_layout(&mut self, layout: InitialLayout) {
        self.initial_layout = layout;
    }

    fn lookup(&self, name: &str) -> Result<usize, Error> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownUnit {
                name: name.to_string(),
            })
    }

    /// Consumes the builder and checks the whole graph: split fraction
    /// completeness, port degrees, the zone ring, and the initial layout.
    pub fn validate(self) -> Result<Network, Error> {
        let CarouselBuilder {
            name,
            system,
            units,
            index,
            connections,
            switch_time,
            column_model,
            valve_dead_volume,
            initial_layout,
        } = self;

        let switch_time = switch_time.ok_or_else(|| Error::InvalidSwitchTime {
            detail: "no switch time configured".to_string(),
        })?;
        if !switch_time.is_finite() || switch_time <= 0.0 {
            return Err(Error::InvalidSwitchTime {
                detail: format!("{switch_time} is not a positive finite interval"),
            });
        }

        // A single outgoing connection defaults to the full outflow;
        // several must all be explicit and sum to 1.
        for (unit_idx, unit) in units.iter().enumerate() {
            let outgoing: Vec<&RawConnection> = connections
                .iter()
                .filter(|c| c.source == unit_idx)
                .collect();
            match outgoing.as_slice() {
                [] => {}
                [single] => {
                    if let Some(fraction) = single.fraction {
                        if (fraction - 1.0).abs() > FRACTION_TOLERANCE {
                            return Err(Error::FlowImbalance {
                                unit: unit.name().to_string(),
                                detail: format!(
                                    "its only outgoing connection carries fraction {fraction}"
                                ),
                            });
                        }
                    }
                }
                several => {
                    let missing = several
                        .iter()
                        .filter(|c| c.fraction.is_none())
                        .map(|c| format!("'{}'", units[c.target].name()))
                        .join(", ");
                    if !missing.is_empty() {
                        return Err(Error::FlowImbalance {
                            unit: unit.name().to_string(),
                            detail: format!("connections toward {missing} have no split fraction"),
                        });
                    }
                    let sum: f64 = several.iter().filter_map(|c| c.fraction).sum();
                    if (sum - 1.0).abs() > FRACTION_TOLERANCE {
                        return Err(Error::FlowImbalance {
                            unit: unit.name().to_string(),
                            detail: format!("split fractions sum to {sum}, expected 1"),
                        });
                    }
                }
            }
        }

        // Every non-source needs a feeder, every non-sink a consumer.
        for (unit_idx, unit) in units.iter().enumerate() {
            if !unit.is_source() && !connections.iter().any(|c| c.target == unit_idx) {
                return Err(Error::Topology {
                    detail: format!("'{}' has no incoming connection", unit.name()),
                });
            }
            if !unit.is_sink() && !connections.iter().any(|c| c.source == unit_idx) {
                return Err(Error::Topology {
                    detail: format!("'{}' has no outgoing connection", unit.name()),
                });
            }
        }

        // With zones contracted to single nodes, the zone-to-zone edges
        // must trace one closed ring visiting every zone.
        let zone_indices: Vec<usize> = units
            .iter()
            .positions(|unit| unit.as_zone().is_some())
            .collect();
        if zone_indices.is_empty() {
            return Err(Error::Topology {
                detail: "the network holds no column-bearing zone".to_string(),
            });
        }

        let mut successor: Vec<Option<usize>> = vec![None; units.len()];
        let mut predecessors = vec![0usize; units.len()];
        for connection in &connections {
            if units[connection.source].as_zone().is_some()
                && units[connection.target].as_zone().is_some()
            {
                if successor[connection.source]
                    .replace(connection.target)
                    .is_some()
                {
                    return Err(Error::Topology {
                        detail: format!(
                            "zone '{}' feeds more than one zone",
                            units[connection.source].name()
                        ),
                    });
                }
                predecessors[connection.target] += 1;
            }
        }
        for &zone_idx in &zone_indices {
            if successor[zone_idx].is_none() {
                return Err(Error::Topology {
                    detail: format!(
                        "zone '{}' feeds no other zone, the carousel ring is open",
                        units[zone_idx].name()
                    ),
                });
            }
            if predecessors[zone_idx] != 1 {
                return Err(Error::Topology {
                    detail: format!(
                        "zone '{}' is fed by {} zones, expected exactly one",
                        units[zone_idx].name(),
                        predecessors[zone_idx]
                    ),
                });
            }
        }

        // Walk the ring from the first registered zone; it must close after
        // visiting every zone. Slot numbering follows this walk.
        let start = zone_indices[0];
        let mut ring = vec![start];
        let mut cursor = successor[start];
        while let Some(next) = cursor {
            if next == start {
                break;
            }
            if ring.len() == zone_indices.len() {
                break;
            }
            ring.push(next);
            cursor = successor[next];
        }
        if ring.len() != zone_indices.len() || cursor != Some(start) {
            return Err(Error::Topology {
                detail: "the zones do not form a single closed carousel ring".to_string(),
            });
        }

        let n_columns = ring
            .iter()
            .filter_map(|&idx| units[idx].as_zone())
            .map(|zone| zone.n_columns())
            .sum();
        initial_layout.check(n_columns)?;

        let resolved = connections
            .iter()
            .map(|c| Connection {
                source: Port::outlet(units[c.source].name()),
                target: Port::inlet(units[c.target].name()),
                fraction: c.fraction.unwrap_or(1.0),
                source_idx: c.source,
                target_idx: c.target,
            })
            .collect::<Vec<_>>();

        log::info!(
            "Validated network '{name}': {} units, {} connections, {n_columns} columns over {} zones",
            units.len(),
            resolved.len(),
            ring.len()
        );

        Ok(Network {
            name,
            system,
            units,
            index,
            connections: resolved,
            ring,
            switch_time,
            n_columns,
            column_model,
            valve_dead_volume,
            initial_layout,
        })
    }
}
