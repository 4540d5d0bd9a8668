//! Inlet streams, outlet streams, and the packed-column description.

use crate::{component::ComponentSystem, zone::Zone, Error};

/// An external source stream with fixed composition and flow rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Inlet {
    name: String,
    concentrations: Vec<f64>,
    flow_rate: Option<f64>,
}

impl Inlet {
    /// Creates an inlet feeding every component at zero concentration.
    pub fn new(name: impl Into<String>, system: &ComponentSystem) -> Self {
        Self {
            name: name.into(),
            concentrations: vec![0.0; system.n_components()],
            flow_rate: None,
        }
    }

    /// Sets the feed concentrations in mol/m³, one value per component.
    pub fn with_concentrations(
        mut self,
        concentrations: impl Into<Vec<f64>>,
    ) -> Result<Self, Error> {
        let concentrations = concentrations.into();
        if concentrations.len() != self.concentrations.len() {
            return Err(Error::ComponentMismatch {
                unit: self.name,
                expected: self.concentrations.len(),
                found: concentrations.len(),
            });
        }
        self.concentrations = concentrations;
        Ok(self)
    }

    /// Sets the volumetric feed rate in m³/s.
    pub fn with_flow_rate(mut self, flow_rate: f64) -> Self {
        self.flow_rate = Some(flow_rate);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn concentrations(&self) -> &[f64] {
        &self.concentrations
    }

    pub fn flow_rate(&self) -> Option<f64> {
        self.flow_rate
    }
}

/// An external sink stream drawing product from the ring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outlet {
    name: String,
}

impl Outlet {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Transport and binding parameters of the packed column.
///
/// Every column on the carousel is identical; the parameters pass to the
/// external solver unmodified. All quantities are SI.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnModel {
    /// Column length in m.
    pub length: f64,
    /// Column inner diameter in m.
    pub diameter: f64,
    /// Interstitial (bed) porosity.
    pub bed_porosity: f64,
    /// Intraparticle porosity.
    pub particle_porosity: f64,
    /// Particle radius in m.
    pub particle_radius: f64,
    /// Axial dispersion coefficient in m²/s.
    pub axial_dispersion: f64,
    /// Film mass-transfer coefficient in m/s.
    pub film_diffusion: f64,
    /// Pore diffusion coefficient in m²/s.
    pub pore_diffusion: f64,
    pub binding: Option<LinearBinding>,
}

/// Linear binding coefficients, one pair per component.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearBinding {
    pub adsorption_rates: Vec<f64>,
    pub desorption_rates: Vec<f64>,
    /// Rate-limited binding when true, instantaneous equilibrium otherwise.
    pub is_kinetic: bool,
}

/// A registered node of the process network.
#[derive(Debug, Clone, PartialEq)]
pub enum Unit {
    Inlet(Inlet),
    Outlet(Outlet),
    Zone(Zone),
}

impl Unit {
    pub fn name(&self) -> &str {
        match self {
            Unit::Inlet(inlet) => inlet.name(),
            Unit::Outlet(outlet) => outlet.name(),
            Unit::Zone(zone) => zone.name(),
        }
    }

    /// External source streams have no inlet port.
    pub fn is_source(&self) -> bool {
        matches!(self, Unit::Inlet(_))
    }

    /// External sink streams have no outlet port.
    pub fn is_sink(&self) -> bool {
        matches!(self, Unit::Outlet(_))
    }

    pub fn as_zone(&self) -> Option<&Zone> {
        match self {
            Unit::Zone(zone) => Some(zone),
            _ => None,
        }
    }
}

impl From<Inlet> for Unit {
    fn from(inlet: Inlet) -> Self {
        Unit::Inlet(inlet)
    }
}

impl From<Outlet> for Unit {
    fn from(outlet: Outlet) -> Self {
        Unit::Outlet(outlet)
    }
}

impl From<Zone> for Unit {
    fn from(zone: Zone) -> Self {
        Unit::Zone(zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inlet_concentration_arity() {
        let system = ComponentSystem::new(["A", "B"]);
        let inlet = Inlet::new("feed", &system);
        assert_eq!(inlet.concentrations(), &[0.0, 0.0]);

        let result = inlet.with_concentrations([1.0, 2.0, 3.0]);
        assert!(matches!(
            result,
            Err(Error::ComponentMismatch {
                expected: 2,
                found: 3,
                ..
            })
        ));
    }
}
