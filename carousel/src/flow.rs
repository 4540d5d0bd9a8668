//! Steady flow resolution over a validated network.

use nalgebra::{DMatrix, DVector};

use crate::{network::Network, units::Unit, Error};

/// Volumetric through-flow of every unit in m³/s, indexed like
/// `Network::units`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResolvedFlows {
    pub(crate) through: Vec<f64>,
}

/// Resolves the steady through-flow of every unit.
///
/// Each non-source unit receives the fraction-weighted outflow of its
/// feeders, q_u = Σ f_e · q_src, and each inlet contributes its configured
/// rate, so the flows satisfy (I − M) q = b with M holding the split
/// fractions. The recycle loop keeps the system regular as long as a draw
/// takes part of the loop flow.
pub(crate) fn resolve(network: &Network) -> Result<ResolvedFlows, Error> {
    let n = network.units.len();
    let mut coefficients = DMatrix::<f64>::identity(n, n);
    let mut rhs = DVector::<f64>::zeros(n);

    for (idx, unit) in network.units.iter().enumerate() {
        if let Unit::Inlet(inlet) = unit {
            rhs[idx] = inlet
                .flow_rate()
                .ok_or_else(|| Error::UnderspecifiedFlow {
                    detail: format!("inlet '{}' has no flow rate configured", inlet.name()),
                })?;
        }
    }

    for connection in &network.connections {
        coefficients[(connection.target_idx, connection.source_idx)] -= connection.fraction;
    }

    let solution = coefficients
        .lu()
        .solve(&rhs)
        .ok_or_else(|| Error::UnderspecifiedFlow {
            detail: "the flow balance system is singular; a closed loop without a draw \
                     cannot reach a steady flow"
                .to_string(),
        })?;

    let through = solution.as_slice().to_vec();
    for (unit, &flow) in network.units.iter().zip(&through) {
        if !flow.is_finite() {
            return Err(Error::UnderspecifiedFlow {
                detail: format!("flow through '{}' is not finite", unit.name()),
            });
        }
        if unit.as_zone().is_some() && flow <= 0.0 {
            return Err(Error::UnderspecifiedFlow {
                detail: format!("no flow-rate input reaches zone '{}'", unit.name()),
            });
        }
        log::debug!("Resolved flow through '{}': {flow:.6e} m³/s", unit.name());
    }

    Ok(ResolvedFlows { through })
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use crate::{
        builder::CarouselBuilder,
        component::ComponentSystem,
        units::{Inlet, Outlet},
        zone::Zone,
        Error,
    };

    fn recycle_builder(feed_rate: Option<f64>) -> CarouselBuilder {
        let system = ComponentSystem::new(["A"]);
        let mut builder = CarouselBuilder::new("recycle", system.clone());
        let mut feed = Inlet::new("feed", &system);
        if let Some(rate) = feed_rate {
            feed = feed.with_flow_rate(rate);
        }
        builder.add_unit(feed).unwrap();
        builder.add_unit(Outlet::new("product")).unwrap();
        builder.add_unit(Zone::serial("zone_a", 1).unwrap()).unwrap();
        builder.add_unit(Zone::serial("zone_b", 1).unwrap()).unwrap();
        builder.add_connection("feed", "zone_a").unwrap();
        builder.add_connection("zone_a", "zone_b").unwrap();
        builder
            .add_connection_weighted("zone_b", "product", 0.25)
            .unwrap();
        builder
            .add_connection_weighted("zone_b", "zone_a", 0.75)
            .unwrap();
        builder.set_switch_time(60.0);
        builder
    }

    #[test]
    fn test_recycle_loop_flows() {
        let network = recycle_builder(Some(1.0e-7)).validate().unwrap();
        let flows = super::resolve(&network).unwrap();
        // q_a = Q + 0.75 q_a, so the loop runs at four times the feed.
        let q_a = 1.0e-7 / (1.0 - 0.75);
        assert_approx_eq!(f64, flows.through[2], q_a, epsilon = 1e-18);
        assert_approx_eq!(f64, flows.through[3], q_a, epsilon = 1e-18);
        assert_approx_eq!(f64, flows.through[1], 1.0e-7, epsilon = 1e-18);
    }

    #[test]
    fn test_missing_inlet_rate() {
        let network = recycle_builder(None).validate().unwrap();
        assert!(matches!(
            super::resolve(&network),
            Err(Error::UnderspecifiedFlow { detail }) if detail.contains("feed")
        ));
    }

    #[test]
    fn test_loop_without_draw_is_singular() {
        let system = ComponentSystem::new(["A"]);
        let mut builder = CarouselBuilder::new("closed", system.clone());
        builder
            .add_unit(Inlet::new("feed", &system).with_flow_rate(1.0e-7))
            .unwrap();
        builder.add_unit(Zone::serial("zone_a", 1).unwrap()).unwrap();
        builder.add_unit(Zone::serial("zone_b", 1).unwrap()).unwrap();
        builder.add_connection("feed", "zone_a").unwrap();
        builder.add_connection("zone_a", "zone_b").unwrap();
        builder.add_connection("zone_b", "zone_a").unwrap();
        builder.set_switch_time(60.0);
        let network = builder.validate().unwrap();
        assert!(matches!(
            super::resolve(&network),
            Err(Error::UnderspecifiedFlow { .. })
        ));
    }
}
