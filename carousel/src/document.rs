//! Conversion between assembled processes and the handoff document.

use crate::{
    builder::CarouselBuilder,
    component::ComponentSystem,
    network::Network,
    process::Process,
    schedule::InitialLayout,
    schema::process as doc,
    units::{ColumnModel, Inlet, LinearBinding, Outlet, Unit},
    zone::{Zone, ZoneArrangement},
    Error,
};

impl Process {
    /// Emits the process as a [`doc::CarouselProcess`] document for an
    /// external solver.
    ///
    /// The document is stamped for one carousel cycle with default
    /// integrator settings; callers adjust `n_cycles` and
    /// `time_integrator` before handoff.
    pub fn document(&self) -> doc::CarouselProcess {
        let network = self.network();
        let system = network.system();

        let components = doc::Components {
            components: system
                .components()
                .iter()
                .map(|name| doc::Component { name: name.clone() })
                .collect(),
        };

        let mut units = doc::Units::default();
        for unit in network.units() {
            match unit {
                Unit::Inlet(inlet) => units.inlets.push(doc::Inlet {
                    name: inlet.name().to_string(),
                    flow_rate: inlet.flow_rate(),
                    concentrations: system
                        .components()
                        .iter()
                        .zip(inlet.concentrations())
                        .map(|(component, &value)| doc::Concentration {
                            component: component.clone(),
                            value,
                        })
                        .collect(),
                }),
                Unit::Outlet(outlet) => units.outlets.push(doc::Outlet {
                    name: outlet.name().to_string(),
                }),
                Unit::Zone(zone) => units.zones.push(doc::Zone {
                    name: zone.name().to_string(),
                    n_columns: zone.n_columns() as u32,
                    arrangement: match zone.arrangement() {
                        ZoneArrangement::Serial => "serial".to_string(),
                        ZoneArrangement::Parallel => "parallel".to_string(),
                    },
                    dead_volume: network.dead_volume_for(zone),
                    weights: zone
                        .weights()
                        .unwrap_or_default()
                        .iter()
                        .map(|&value| doc::Weight { value })
                        .collect(),
                }),
            }
        }

        let connections = doc::Connections {
            connections: network
                .connections()
                .iter()
                .map(|connection| doc::Connection {
                    from: connection.source().unit().to_string(),
                    to: connection.target().unit().to_string(),
                    fraction: Some(connection.fraction()),
                })
                .collect(),
        };

        let carousel = doc::Carousel {
            n_columns: network.n_columns() as u32,
            columns: self
                .column_instances()
                .into_iter()
                .map(|name| doc::Column { name })
                .collect(),
            junctions: self
                .junctions()
                .into_iter()
                .map(|(name, volume)| doc::Junction { name, volume })
                .collect(),
        };

        let schedule = doc::Schedule {
            stages: self
                .stages()
                .iter()
                .map(|stage| doc::Stage {
                    index: stage.index as u32,
                    start_time: stage.start_time,
                    end_time: stage.end_time,
                    flows: stage
                        .flows
                        .iter()
                        .map(|flow| doc::Flow {
                            from: flow.source.clone(),
                            to: flow.target.clone(),
                            rate: flow.rate,
                        })
                        .collect(),
                })
                .collect(),
        };

        let initial_layout = match network.initial_layout() {
            InitialLayout::Identity => None,
            InitialLayout::Custom(slots) => Some(doc::InitialLayout {
                assigns: slots
                    .iter()
                    .enumerate()
                    .map(|(column, &slot)| doc::Assign {
                        column: column as u32,
                        slot: slot as u32,
                    })
                    .collect(),
            }),
        };

        let mut document = doc::CarouselProcess {
            format_version: crate::schema::FORMAT_VERSION.to_string(),
            name: network.name().to_string(),
            switch_time: network.switch_time(),
            n_cycles: 1,
            generation_tool: None,
            generation_date_and_time: None,
            components,
            units,
            column_model: network
                .column_model()
                .map(|model| column_model_to_doc(model, system)),
            initial_layout,
            time_integrator: Some(doc::TimeIntegrator::default()),
            connections,
            carousel,
            schedule,
        };
        document.set_provenance(concat!("carousel ", env!("CARGO_PKG_VERSION")));
        document
    }
}

fn column_model_to_doc(model: &ColumnModel, system: &ComponentSystem) -> doc::ColumnModel {
    doc::ColumnModel {
        length: model.length,
        diameter: model.diameter,
        bed_porosity: model.bed_porosity,
        particle_porosity: model.particle_porosity,
        particle_radius: model.particle_radius,
        axial_dispersion: model.axial_dispersion,
        film_diffusion: model.film_diffusion,
        pore_diffusion: model.pore_diffusion,
        binding: model.binding.as_ref().map(|binding| doc::Binding {
            kinetic: binding.is_kinetic,
            rates: system
                .components()
                .iter()
                .zip(binding.adsorption_rates.iter().zip(&binding.desorption_rates))
                .map(|(component, (&adsorption, &desorption))| doc::BindingRate {
                    component: component.clone(),
                    adsorption,
                    desorption,
                })
                .collect(),
        }),
    }
}

impl Network {
    /// Reconstructs a network from the logical half of a document.
    ///
    /// The physical half (`Carousel`, `Schedule`) is derived data and is
    /// not read back; rebuilding the network and assembling it again
    /// reproduces it.
    pub fn from_document(document: &doc::CarouselProcess) -> Result<Self, Error> {
        let system = ComponentSystem::new(
            document
                .components
                .components
                .iter()
                .map(|component| component.name.clone()),
        );

        let mut builder = CarouselBuilder::new(&document.name, system.clone());
        builder.set_switch_time(document.switch_time);

        for inlet in &document.units.inlets {
            let concentrations: Vec<f64> = system
                .components()
                .iter()
                .map(|component| {
                    inlet
                        .concentrations
                        .iter()
                        .find(|c| &c.component == component)
                        .map(|c| c.value)
                        .unwrap_or(0.0)
                })
                .collect();
            let mut unit = Inlet::new(&inlet.name, &system).with_concentrations(concentrations)?;
            if let Some(rate) = inlet.flow_rate {
                unit = unit.with_flow_rate(rate);
            }
            builder.add_unit(unit)?;
        }
        for outlet in &document.units.outlets {
            builder.add_unit(Outlet::new(&outlet.name))?;
        }
        for zone in &document.units.zones {
            builder.add_unit(zone_from_doc(zone)?)?;
        }

        for connection in &document.connections.connections {
            match connection.fraction {
                Some(fraction) => {
                    builder.add_connection_weighted(&connection.from, &connection.to, fraction)?
                }
                None => builder.add_connection(&connection.from, &connection.to)?,
            }
        }

        if let Some(model) = &document.column_model {
            builder.set_column_model(column_model_from_doc(model, &system)?);
        }

        if let Some(layout) = &document.initial_layout {
            let n_slots = document
                .units
                .zones
                .iter()
                .map(|zone| zone.n_columns as usize)
                .sum();
            let mut slots: Vec<usize> = (0..n_slots).collect();
            for assign in &layout.assigns {
                let column = assign.column as usize;
                if column >= n_slots {
                    return Err(Error::InvalidLayout { n_slots });
                }
                slots[column] = assign.slot as usize;
            }
            builder.set_initial_layout(InitialLayout::Custom(slots));
        }

        builder.validate()
    }
}

fn zone_from_doc(zone: &doc::Zone) -> Result<Zone, Error> {
    let n_columns = zone.n_columns as usize;
    let built = match zone.arrangement.as_str() {
        "serial" => Zone::serial(&zone.name, n_columns)?,
        "parallel" if zone.weights.is_empty() => Zone::parallel(&zone.name, n_columns)?,
        "parallel" => {
            if zone.weights.len() != n_columns {
                return Err(Error::FlowImbalance {
                    unit: zone.name.clone(),
                    detail: format!(
                        "{} column weights given for {} columns",
                        zone.weights.len(),
                        n_columns
                    ),
                });
            }
            Zone::parallel_weighted(
                &zone.name,
                zone.weights.iter().map(|weight| weight.value).collect(),
            )?
        }
        other => {
            return Err(Error::InvalidArrangement {
                zone: zone.name.clone(),
                value: other.to_string(),
            })
        }
    };
    Ok(match zone.dead_volume {
        Some(volume) => built.with_dead_volume(volume),
        None => built,
    })
}

fn column_model_from_doc(
    model: &doc::ColumnModel,
    system: &ComponentSystem,
) -> Result<ColumnModel, Error> {
    let binding = match &model.binding {
        None => None,
        Some(binding) => {
            let mut adsorption_rates = Vec::with_capacity(system.n_components());
            let mut desorption_rates = Vec::with_capacity(system.n_components());
            for component in system.components() {
                let rate = binding
                    .rates
                    .iter()
                    .find(|rate| &rate.component == component)
                    .ok_or_else(|| Error::ComponentMismatch {
                        unit: "column binding".to_string(),
                        expected: system.n_components(),
                        found: binding.rates.len(),
                    })?;
                adsorption_rates.push(rate.adsorption);
                desorption_rates.push(rate.desorption);
            }
            Some(LinearBinding {
                adsorption_rates,
                desorption_rates,
                is_kinetic: binding.kinetic,
            })
        }
    };
    Ok(ColumnModel {
        length: model.length,
        diameter: model.diameter,
        bed_porosity: model.bed_porosity,
        particle_porosity: model.particle_porosity,
        particle_radius: model.particle_radius,
        axial_dispersion: model.axial_dispersion,
        film_diffusion: model.film_diffusion,
        pore_diffusion: model.pore_diffusion,
        binding,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_arrangement_rejected() {
        let zone = doc::Zone {
            name: "zone_I".to_string(),
            n_columns: 2,
            arrangement: "diagonal".to_string(),
            dead_volume: None,
            weights: Vec::new(),
        };
        assert!(matches!(
            zone_from_doc(&zone),
            Err(Error::InvalidArrangement { value, .. }) if value == "diagonal"
        ));
    }

    #[test]
    fn test_binding_needs_every_component() {
        let system = ComponentSystem::new(["A", "B"]);
        let model = doc::ColumnModel {
            binding: Some(doc::Binding {
                kinetic: false,
                rates: vec![doc::BindingRate {
                    component: "A".to_string(),
                    adsorption: 0.54,
                    desorption: 1.0,
                }],
            }),
            ..Default::default()
        };
        assert!(matches!(
            column_model_from_doc(&model, &system),
            Err(Error::ComponentMismatch { .. })
        ));
    }
}
