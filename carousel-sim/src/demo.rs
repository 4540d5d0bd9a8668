//! Bundled demo processes, usable from the CLI via `--demo`.

use carousel::{
    CarouselBuilder, ColumnModel, ComponentSystem, Inlet, LinearBinding, Network, Outlet, Zone,
};

/// Classic four-zone binary separation with two columns per zone.
///
/// Eluent feeds the recycle loop ahead of zone I, the feed enters ahead
/// of zone III, extract and raffinate are drawn between the zones and the
/// loop is closed from zone IV back to zone I.
pub fn binary_smb() -> Result<Network, carousel::Error> {
    let system = ComponentSystem::new(["A", "B"]);

    let mut builder = CarouselBuilder::new("smb-binary", system.clone());
    builder.set_column_model(ColumnModel {
        length: 0.536,
        diameter: 2.6e-2,
        bed_porosity: 0.38,
        particle_porosity: 1.0e-5,
        particle_radius: 1.63e-3,
        axial_dispersion: 3.81e-6,
        film_diffusion: 1.6e4,
        pore_diffusion: 5.0e-5,
        binding: Some(LinearBinding {
            adsorption_rates: vec![0.54, 0.28],
            desorption_rates: vec![1.0, 1.0],
            is_kinetic: false,
        }),
    });
    builder.set_valve_dead_volume(1.0e-9);

    builder.add_unit(Inlet::new("eluent", &system).with_flow_rate(4.14e-8))?;
    builder.add_unit(
        Inlet::new("feed", &system)
            .with_concentrations([2.78e3, 2.78e3])?
            .with_flow_rate(2.0e-8),
    )?;
    builder.add_unit(Outlet::new("extract"))?;
    builder.add_unit(Outlet::new("raffinate"))?;
    for zone in ["zone_I", "zone_II", "zone_III", "zone_IV"] {
        builder.add_unit(Zone::serial(zone, 2)?)?;
    }

    builder.add_connection("eluent", "zone_I")?;
    builder.add_connection("zone_I", "extract")?;
    builder.add_connection("zone_I", "zone_II")?;
    builder.set_output_state("zone_I", &[0.248, 0.752])?;
    builder.add_connection("zone_II", "zone_III")?;
    builder.add_connection("feed", "zone_III")?;
    builder.add_connection("zone_III", "raffinate")?;
    builder.add_connection("zone_III", "zone_IV")?;
    builder.set_output_state("zone_III", &[0.213, 0.787])?;
    builder.add_connection("zone_IV", "zone_I")?;
    builder.set_switch_time(1552.0);

    builder.validate()
}

/// Five-zone ternary separation drawing two extracts, one column per zone.
pub fn ternary_smb() -> Result<Network, carousel::Error> {
    let system = ComponentSystem::new(["A", "B", "C"]);

    let mut builder = CarouselBuilder::new("smb-ternary", system.clone());
    builder.set_column_model(ColumnModel {
        length: 0.150,
        diameter: 1.0e-2,
        bed_porosity: 0.80,
        particle_porosity: 1.0e-5,
        particle_radius: 1.5e-5,
        axial_dispersion: 3.81e-10,
        film_diffusion: 1.6e4,
        pore_diffusion: 5.0e-5,
        binding: Some(LinearBinding {
            adsorption_rates: vec![3.15, 7.40, 23.0],
            desorption_rates: vec![1.0, 1.0, 1.0],
            is_kinetic: true,
        }),
    });
    builder.set_valve_dead_volume(1.0e-9);

    builder.add_unit(Inlet::new("eluent", &system).with_flow_rate(2.34e-7))?;
    builder.add_unit(
        Inlet::new("feed", &system)
            .with_concentrations([4.41e3, 3.75e3, 3.98e3])?
            .with_flow_rate(1.67e-8),
    )?;
    builder.add_unit(Outlet::new("extract_1"))?;
    builder.add_unit(Outlet::new("extract_2"))?;
    builder.add_unit(Outlet::new("raffinate"))?;
    for zone in ["zone_I", "zone_II", "zone_III", "zone_IV", "zone_V"] {
        builder.add_unit(Zone::serial(zone, 1)?)?;
    }

    builder.add_connection("eluent", "zone_I")?;
    builder.add_connection("zone_I", "extract_1")?;
    builder.add_connection("zone_I", "zone_II")?;
    builder.set_output_state("zone_I", &[0.6438, 0.3562])?;
    builder.add_connection("zone_II", "extract_2")?;
    builder.add_connection("zone_II", "zone_III")?;
    builder.set_output_state("zone_II", &[0.4419, 0.5581])?;
    builder.add_connection("zone_III", "zone_IV")?;
    builder.add_connection("feed", "zone_IV")?;
    builder.add_connection("zone_IV", "raffinate")?;
    builder.add_connection("zone_IV", "zone_V")?;
    builder.set_output_state("zone_IV", &[0.224, 0.776])?;
    builder.add_connection("zone_V", "zone_I")?;
    builder.set_switch_time(264.0);

    builder.validate()
}
