//! Assembly of the per-interval flow schedule.

use std::collections::HashMap;

use crate::{
    flow::{resolve, ResolvedFlows},
    network::Network,
    schedule::SwitchSchedule,
    zone::{Zone, ZoneArrangement},
    Error,
};

pub(crate) fn column_instance(column: usize) -> String {
    format!("column_{column}")
}

fn hold_instance(zone: &str, position: usize) -> String {
    format!("{zone}_hold_{position}")
}

fn junction_in(zone: &str) -> String {
    format!("{zone}_in")
}

fn junction_out(zone: &str) -> String {
    format!("{zone}_out")
}

/// The unit-level connection a concrete stream realizes.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalFlow {
    pub source: String,
    pub target: String,
    pub fraction: f64,
}

/// One concrete stream of a stage, between two physical instances
/// (inlets, outlets, columns, or junction vessels).
#[derive(Debug, Clone, PartialEq)]
pub struct StageFlow {
    pub source: String,
    pub target: String,
    /// Absolute flow rate in m³/s.
    pub rate: f64,
    /// The configured connection this stream realizes; internal zone
    /// plumbing carries `None`.
    pub logical: Option<LogicalFlow>,
}

impl StageFlow {
    fn internal(source: String, target: String, rate: f64) -> Self {
        Self {
            source,
            target,
            rate,
            logical: None,
        }
    }
}

/// The concrete flow graph in effect on [`start_time`, `end_time`).
///
/// Configured connections come first, in configuration order, followed by
/// the internal plumbing of each zone in ring order.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowStage {
    pub index: usize,
    pub start_time: f64,
    pub end_time: f64,
    pub flows: Vec<StageFlow>,
}

impl FlowStage {
    /// The unit-level connections realized in this stage, in configuration
    /// order with their split fractions.
    pub fn logical_connections(&self) -> Vec<LogicalFlow> {
        self.flows
            .iter()
            .filter_map(|flow| flow.logical.clone())
            .collect()
    }
}

/// Slot geometry of one ring zone.
pub(crate) struct ZoneGeometry<'a> {
    zone: &'a Zone,
    unit_idx: usize,
    slot_base: usize,
    dead_volume: Option<f64>,
}

impl ZoneGeometry<'_> {
    fn column(&self, layout: &[usize], position: usize) -> String {
        column_instance(layout[self.slot_base + position])
    }

    fn has_junctions(&self) -> bool {
        self.zone.n_columns() > 1 && self.zone.arrangement() == ZoneArrangement::Parallel
    }

    /// Physical instance receiving the zone's incoming streams.
    fn entry_instance(&self, layout: &[usize]) -> String {
        if self.has_junctions() {
            junction_in(self.zone.name())
        } else if self.dead_volume.is_some() {
            hold_instance(self.zone.name(), 0)
        } else {
            self.column(layout, 0)
        }
    }

    /// Physical instance the zone's outgoing streams tap.
    fn exit_instance(&self, layout: &[usize]) -> String {
        if self.has_junctions() {
            junction_out(self.zone.name())
        } else {
            self.column(layout, self.zone.n_columns() - 1)
        }
    }

    fn internal_flows(&self, layout: &[usize], through: f64, flows: &mut Vec<StageFlow>) {
        let name = self.zone.name();
        if self.has_junctions() {
            for (position, weight) in self.zone.column_weights().iter().enumerate() {
                let rate = weight * through;
                let column = self.column(layout, position);
                if self.dead_volume.is_some() {
                    flows.push(StageFlow::internal(
                        junction_in(name),
                        hold_instance(name, position),
                        rate,
                    ));
                    flows.push(StageFlow::internal(
                        hold_instance(name, position),
                        column.clone(),
                        rate,
                    ));
                } else {
                    flows.push(StageFlow::internal(junction_in(name), column.clone(), rate));
                }
                flows.push(StageFlow::internal(column, junction_out(name), rate));
            }
        } else {
            for position in 0..self.zone.n_columns() {
                if self.dead_volume.is_some() {
                    flows.push(StageFlow::internal(
                        hold_instance(name, position),
                        self.column(layout, position),
                        through,
                    ));
                }
                if position + 1 < self.zone.n_columns() {
                    let next = if self.dead_volume.is_some() {
                        hold_instance(name, position + 1)
                    } else {
                        self.column(layout, position + 1)
                    };
                    flows.push(StageFlow::internal(
                        self.column(layout, position),
                        next,
                        through,
                    ));
                }
            }
        }
    }
}

impl Network {
    pub(crate) fn zone_geometries(&self) -> Vec<ZoneGeometry<'_>> {
        let mut slot_base = 0;
        self.ring
            .iter()
            .filter_map(|&unit_idx| {
                self.units[unit_idx].as_zone().map(|zone| {
                    let geometry = ZoneGeometry {
                        zone,
                        unit_idx,
                        slot_base,
                        dead_volume: self.dead_volume_for(zone),
                    };
                    slot_base += zone.n_columns();
                    geometry
                })
            })
            .collect()
    }

    /// Assembles the process: resolves every unit's steady through-flow,
    /// substitutes the physical columns into their slots for each of the C
    /// switch intervals of a cycle, and applies the split fractions as
    /// absolute rates.
    pub fn build(&self) -> Result<Process, Error> {
        let flows = resolve(self)?;
        let schedule = self.schedule();
        let geometries = self.zone_geometries();

        let stages: Vec<FlowStage> = (0..self.n_columns)
            .map(|index| self.assemble_stage(index, &flows, &schedule, &geometries))
            .collect();

        log::info!(
            "Built process '{}': {} stages of {} streams each",
            self.name,
            stages.len(),
            stages.first().map(|s| s.flows.len()).unwrap_or(0)
        );

        Ok(Process {
            network: self.clone(),
            flows,
            stages,
        })
    }

    fn assemble_stage(
        &self,
        index: usize,
        flows: &ResolvedFlows,
        schedule: &SwitchSchedule,
        geometries: &[ZoneGeometry],
    ) -> FlowStage {
        let layout = schedule.layout_at_switch(index as i64);
        let by_unit: HashMap<usize, &ZoneGeometry> =
            geometries.iter().map(|g| (g.unit_idx, g)).collect();

        let mut stage_flows = Vec::new();
        for connection in &self.connections {
            let source = match by_unit.get(&connection.source_idx) {
                Some(geometry) => geometry.exit_instance(&layout),
                None => self.units[connection.source_idx].name().to_string(),
            };
            let target = match by_unit.get(&connection.target_idx) {
                Some(geometry) => geometry.entry_instance(&layout),
                None => self.units[connection.target_idx].name().to_string(),
            };
            stage_flows.push(StageFlow {
                source,
                target,
                rate: connection.fraction * flows.through[connection.source_idx],
                logical: Some(LogicalFlow {
                    source: self.units[connection.source_idx].name().to_string(),
                    target: self.units[connection.target_idx].name().to_string(),
                    fraction: connection.fraction,
                }),
            });
        }
        for geometry in geometries {
            geometry.internal_flows(&layout, flows.through[geometry.unit_idx], &mut stage_flows);
        }

        let window = schedule.interval(index as i64);
        FlowStage {
            index,
            start_time: window.start,
            end_time: window.end,
            flows: stage_flows,
        }
    }
}

/// A fully assembled process: resolved unit flows plus one [`FlowStage`]
/// per switch interval of a carousel cycle.
///
/// Assembly does not solve the column equations; the stages are the
/// contract handed to an external solver.
#[derive(Debug, Clone)]
pub struct Process {
    network: Network,
    flows: ResolvedFlows,
    stages: Vec<FlowStage>,
}

impl Process {
    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn stages(&self) -> &[FlowStage] {
        &self.stages
    }

    pub fn stage(&self, index: usize) -> Option<&FlowStage> {
        self.stages.get(index)
    }

    /// Resolved volumetric through-flow of `unit` in m³/s.
    pub fn unit_flow(&self, unit: &str) -> Option<f64> {
        self.network
            .index
            .get(unit)
            .map(|&idx| self.flows.through[idx])
    }

    /// All resolved unit flows as (name, rate) pairs in registration order.
    pub fn unit_flows(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.network
            .units
            .iter()
            .zip(&self.flows.through)
            .map(|(unit, &flow)| (unit.name(), flow))
    }

    /// Physical column instance names, `column_0` through `column_{C-1}`.
    pub fn column_instances(&self) -> Vec<String> {
        (0..self.network.n_columns).map(column_instance).collect()
    }

    /// Stationary junction vessels of the carousel with their volumes,
    /// named as they appear in stage flows. Hold-up vessels carry the
    /// configured dead volume, mixing junctions are volumeless.
    pub fn junctions(&self) -> Vec<(String, f64)> {
        let mut junctions = Vec::new();
        for geometry in self.network.zone_geometries() {
            let name = geometry.zone.name();
            if geometry.has_junctions() {
                junctions.push((junction_in(name), 0.0));
            }
            if let Some(volume) = geometry.dead_volume {
                for position in 0..geometry.zone.n_columns() {
                    junctions.push((hold_instance(name, position), volume));
                }
            }
            if geometry.has_junctions() {
                junctions.push((junction_out(name), 0.0));
            }
        }
        junctions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        builder::CarouselBuilder,
        component::ComponentSystem,
        units::{Inlet, Outlet},
        Error,
    };

    fn two_zone_network(dead_volume: Option<f64>) -> Network {
        let system = ComponentSystem::new(["A"]);
        let mut builder = CarouselBuilder::new("ring", system.clone());
        builder
            .add_unit(Inlet::new("feed", &system).with_flow_rate(1.0e-7))
            .unwrap();
        builder.add_unit(Outlet::new("product")).unwrap();
        let mut zone_a = Zone::serial("zone_a", 1).unwrap();
        if let Some(volume) = dead_volume {
            zone_a = zone_a.with_dead_volume(volume);
        }
        builder.add_unit(zone_a).unwrap();
        builder.add_unit(Zone::serial("zone_b", 1).unwrap()).unwrap();
        builder.add_connection("feed", "zone_a").unwrap();
        builder.add_connection("zone_a", "zone_b").unwrap();
        builder
            .add_connection_weighted("zone_b", "product", 0.5)
            .unwrap();
        builder
            .add_connection_weighted("zone_b", "zone_a", 0.5)
            .unwrap();
        builder.set_switch_time(30.0);
        builder.validate().unwrap()
    }

    #[test]
    fn test_stage_instances_without_dead_volume() {
        let process = two_zone_network(None).build().unwrap();
        assert_eq!(process.stages().len(), 2);

        let stage = &process.stages()[0];
        assert_eq!(stage.start_time, 0.0);
        assert_eq!(stage.end_time, 30.0);
        // Identity layout at interval 0: zone_a holds column_0.
        let feed_edge = &stage.flows[0];
        assert_eq!(feed_edge.source, "feed");
        assert_eq!(feed_edge.target, "column_0");
        // One switch later column_1 has moved into slot 0.
        let shifted = &process.stages()[1].flows[0];
        assert_eq!(shifted.target, "column_1");
        assert!(process.junctions().is_empty());
    }

    #[test]
    fn test_stage_instances_with_dead_volume() {
        let process = two_zone_network(Some(1.0e-9)).build().unwrap();
        let stage = &process.stages()[0];

        // Feed lands on the hold-up vessel ahead of zone_a's column.
        assert_eq!(stage.flows[0].target, "zone_a_hold_0");
        let hold_edge = stage
            .flows
            .iter()
            .find(|f| f.source == "zone_a_hold_0")
            .unwrap();
        assert_eq!(hold_edge.target, "column_0");
        assert!(hold_edge.logical.is_none());
        assert_eq!(process.junctions(), vec![("zone_a_hold_0".to_string(), 1.0e-9)]);
    }

    #[test]
    fn test_parallel_zone_junctions() {
        let system = ComponentSystem::new(["A"]);
        let mut builder = CarouselBuilder::new("wash", system.clone());
        builder
            .add_unit(Inlet::new("feed", &system).with_flow_rate(2.0e-7))
            .unwrap();
        builder.add_unit(Outlet::new("product")).unwrap();
        builder
            .add_unit(Zone::parallel_weighted("zone_a", vec![0.25, 0.75]).unwrap())
            .unwrap();
        builder.add_unit(Zone::serial("zone_b", 1).unwrap()).unwrap();
        builder.add_connection("feed", "zone_a").unwrap();
        builder.add_connection("zone_a", "zone_b").unwrap();
        builder
            .add_connection_weighted("zone_b", "product", 0.5)
            .unwrap();
        builder
            .add_connection_weighted("zone_b", "zone_a", 0.5)
            .unwrap();
        builder.set_switch_time(30.0);
        let process = builder.validate().unwrap().build().unwrap();

        let stage = &process.stages()[0];
        assert_eq!(stage.flows[0].target, "zone_a_in");
        let q_zone = process.unit_flow("zone_a").unwrap();
        let splits: Vec<&StageFlow> = stage
            .flows
            .iter()
            .filter(|f| f.source == "zone_a_in")
            .collect();
        assert_eq!(splits.len(), 2);
        assert_eq!(splits[0].rate, 0.25 * q_zone);
        assert_eq!(splits[1].rate, 0.75 * q_zone);
        assert_eq!(
            process.junctions(),
            vec![
                ("zone_a_in".to_string(), 0.0),
                ("zone_a_out".to_string(), 0.0)
            ]
        );
    }

    #[test]
    fn test_build_requires_resolvable_flows() {
        let system = ComponentSystem::new(["A"]);
        let mut builder = CarouselBuilder::new("ring", system.clone());
        builder.add_unit(Inlet::new("feed", &system)).unwrap();
        builder.add_unit(Outlet::new("product")).unwrap();
        builder.add_unit(Zone::serial("zone_a", 1).unwrap()).unwrap();
        builder.add_unit(Zone::serial("zone_b", 1).unwrap()).unwrap();
        builder.add_connection("feed", "zone_a").unwrap();
        builder.add_connection("zone_a", "zone_b").unwrap();
        builder
            .add_connection_weighted("zone_b", "product", 0.5)
            .unwrap();
        builder
            .add_connection_weighted("zone_b", "zone_a", 0.5)
            .unwrap();
        builder.set_switch_time(30.0);
        let network = builder.validate().unwrap();
        assert!(matches!(
            network.build(),
            Err(Error::UnderspecifiedFlow { .. })
        ));
    }
}
