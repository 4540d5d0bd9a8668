//! Schema definitions for the `CarouselProcess` XML document.
//!
//! The document has two halves. The logical half (`Units`, `Connections`,
//! `ColumnModel`, `InitialLayout`) describes the process the way it is
//! configured: inlet and outlet streams, column-bearing zones, and the
//! split fractions between them. The physical half (`Carousel`, `Schedule`)
//! is the expanded form a solver integrates: the individual columns and
//! hold-up vessels, and one `Stage` per switch interval listing every
//! concrete flow in m³/s.

use crate::Error;

/// Root element of a carousel process description.
#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "CarouselProcess", strict(unknown_attribute, unknown_element))]
pub struct CarouselProcess {
    /// Version of the document format, semver.
    #[xml(attr = "formatVersion")]
    pub format_version: String,
    #[xml(attr = "name")]
    pub name: String,
    /// Switch interval τ in seconds.
    #[xml(attr = "switchTime")]
    pub switch_time: f64,
    /// Number of full carousel cycles the solver should integrate.
    #[xml(attr = "nCycles")]
    pub n_cycles: u32,
    #[xml(attr = "generationTool")]
    pub generation_tool: Option<String>,
    #[xml(attr = "generationDateAndTime")]
    pub generation_date_and_time: Option<String>,
    #[xml(child = "Components")]
    pub components: Components,
    #[xml(child = "Units")]
    pub units: Units,
    #[xml(child = "ColumnModel")]
    pub column_model: Option<ColumnModel>,
    #[xml(child = "InitialLayout")]
    pub initial_layout: Option<InitialLayout>,
    #[xml(child = "TimeIntegrator")]
    pub time_integrator: Option<TimeIntegrator>,
    #[xml(child = "Connections")]
    pub connections: Connections,
    #[xml(child = "Carousel")]
    pub carousel: Carousel,
    #[xml(child = "Schedule")]
    pub schedule: Schedule,
}

impl CarouselProcess {
    /// The document format version as a parsed semver version.
    pub fn version(&self) -> Result<semver::Version, Error> {
        Ok(semver::Version::parse(&self.format_version)?)
    }

    /// Checks that the document was written for a format this reader
    /// understands (same major version).
    pub fn check_version(&self) -> Result<(), Error> {
        let supported = semver::Version::parse(crate::FORMAT_VERSION)?;
        let found = self.version()?;
        if found.major != supported.major {
            return Err(Error::UnsupportedVersion {
                found: self.format_version.clone(),
                supported: crate::FORMAT_VERSION.to_string(),
            });
        }
        Ok(())
    }

    /// Stamps the document with the generating tool and the current UTC time.
    pub fn set_provenance(&mut self, tool: &str) {
        self.generation_tool = Some(tool.to_string());
        self.generation_date_and_time = Some(
            chrono::Utc::now()
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        );
    }
}

#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "Components", strict(unknown_attribute, unknown_element))]
pub struct Components {
    #[xml(child = "Component")]
    pub components: Vec<Component>,
}

#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "Component", strict(unknown_attribute, unknown_element))]
pub struct Component {
    #[xml(attr = "name")]
    pub name: String,
}

/// The logical units of the network: streams in, streams out, and zones.
#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "Units", strict(unknown_attribute, unknown_element))]
pub struct Units {
    #[xml(child = "Inlet")]
    pub inlets: Vec<Inlet>,
    #[xml(child = "Outlet")]
    pub outlets: Vec<Outlet>,
    #[xml(child = "Zone")]
    pub zones: Vec<Zone>,
}

#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "Inlet", strict(unknown_attribute, unknown_element))]
pub struct Inlet {
    #[xml(attr = "name")]
    pub name: String,
    /// Volumetric feed rate in m³/s. A document without it cannot be built
    /// into a flow schedule.
    #[xml(attr = "flowRate")]
    pub flow_rate: Option<f64>,
    #[xml(child = "Concentration")]
    pub concentrations: Vec<Concentration>,
}

/// Feed concentration of one component in mol/m³.
#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "Concentration", strict(unknown_attribute, unknown_element))]
pub struct Concentration {
    #[xml(attr = "component")]
    pub component: String,
    #[xml(attr = "value")]
    pub value: f64,
}

#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "Outlet", strict(unknown_attribute, unknown_element))]
pub struct Outlet {
    #[xml(attr = "name")]
    pub name: String,
}

#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "Zone", strict(unknown_attribute, unknown_element))]
pub struct Zone {
    #[xml(attr = "name")]
    pub name: String,
    #[xml(attr = "nColumns")]
    pub n_columns: u32,
    /// Column arrangement within the zone, `serial` or `parallel`.
    #[xml(attr = "arrangement")]
    pub arrangement: String,
    /// Hold-up volume in m³ on each column inlet line of this zone.
    #[xml(attr = "deadVolume")]
    pub dead_volume: Option<f64>,
    /// Flow weights for a parallel arrangement, one per column.
    #[xml(child = "Weight")]
    pub weights: Vec<Weight>,
}

#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "Weight", strict(unknown_attribute, unknown_element))]
pub struct Weight {
    #[xml(attr = "value")]
    pub value: f64,
}

/// Transport and binding parameters of the packed column, identical for
/// every column on the carousel. All values are opaque pass-through data
/// for the solver.
#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "ColumnModel", strict(unknown_attribute, unknown_element))]
pub struct ColumnModel {
    /// Column length L in m.
    #[xml(attr = "length")]
    pub length: f64,
    /// Column diameter d in m.
    #[xml(attr = "diameter")]
    pub diameter: f64,
    #[xml(attr = "bedPorosity")]
    pub bed_porosity: f64,
    #[xml(attr = "particlePorosity")]
    pub particle_porosity: f64,
    /// Particle radius r_p in m.
    #[xml(attr = "particleRadius")]
    pub particle_radius: f64,
    /// Axial dispersion coefficient D_ax in m²/s.
    #[xml(attr = "axialDispersion")]
    pub axial_dispersion: f64,
    /// Film diffusion coefficient k_f in m/s.
    #[xml(attr = "filmDiffusion")]
    pub film_diffusion: f64,
    /// Pore diffusion coefficient D_p in m²/s.
    #[xml(attr = "poreDiffusion")]
    pub pore_diffusion: f64,
    #[xml(child = "Binding")]
    pub binding: Option<Binding>,
}

/// Linear binding model coefficients.
#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "Binding", strict(unknown_attribute, unknown_element))]
pub struct Binding {
    /// Whether adsorption is rate-limited or in instantaneous equilibrium.
    #[xml(attr = "kinetic")]
    pub kinetic: bool,
    #[xml(child = "Rate")]
    pub rates: Vec<BindingRate>,
}

#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "Rate", strict(unknown_attribute, unknown_element))]
pub struct BindingRate {
    #[xml(attr = "component")]
    pub component: String,
    #[xml(attr = "adsorption")]
    pub adsorption: f64,
    #[xml(attr = "desorption")]
    pub desorption: f64,
}

/// The column-to-slot assignment at t = 0. Absent means column i starts
/// in slot i.
#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "InitialLayout", strict(unknown_attribute, unknown_element))]
pub struct InitialLayout {
    #[xml(child = "Assign")]
    pub assigns: Vec<Assign>,
}

#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "Assign", strict(unknown_attribute, unknown_element))]
pub struct Assign {
    #[xml(attr = "column")]
    pub column: u32,
    #[xml(attr = "slot")]
    pub slot: u32,
}

/// Tolerances and step bounds forwarded to the solver's time integrator.
#[derive(Clone, PartialEq, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "TimeIntegrator", strict(unknown_attribute, unknown_element))]
pub struct TimeIntegrator {
    #[xml(attr = "absTol")]
    pub abstol: f64,
    #[xml(attr = "relTol")]
    pub reltol: f64,
    #[xml(attr = "initStepSize")]
    pub init_step_size: f64,
    #[xml(attr = "maxStepSize")]
    pub max_step_size: f64,
}

impl Default for TimeIntegrator {
    fn default() -> Self {
        Self {
            abstol: 1e-10,
            reltol: 1e-6,
            init_step_size: 1e-14,
            max_step_size: 5e6,
        }
    }
}

/// Logical connections between units and zones.
#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "Connections", strict(unknown_attribute, unknown_element))]
pub struct Connections {
    #[xml(child = "Connection")]
    pub connections: Vec<Connection>,
}

#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "Connection", strict(unknown_attribute, unknown_element))]
pub struct Connection {
    #[xml(attr = "from")]
    pub from: String,
    #[xml(attr = "to")]
    pub to: String,
    /// Split fraction of the source outflow routed along this edge.
    /// A single unlabeled edge carries the full outflow.
    #[xml(attr = "fraction")]
    pub fraction: Option<f64>,
}

/// The physical carousel: every column instance and every stationary
/// hold-up vessel appearing in the schedule.
#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "Carousel", strict(unknown_attribute, unknown_element))]
pub struct Carousel {
    #[xml(attr = "nColumns")]
    pub n_columns: u32,
    #[xml(child = "Column")]
    pub columns: Vec<Column>,
    #[xml(child = "Junction")]
    pub junctions: Vec<Junction>,
}

#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "Column", strict(unknown_attribute, unknown_element))]
pub struct Column {
    #[xml(attr = "name")]
    pub name: String,
}

/// A stirred hold-up vessel. Volume 0 marks a pure routing node.
#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "Junction", strict(unknown_attribute, unknown_element))]
pub struct Junction {
    #[xml(attr = "name")]
    pub name: String,
    /// Vessel volume in m³.
    #[xml(attr = "volume")]
    pub volume: f64,
}

/// One `Stage` per switch interval of a full carousel cycle.
#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "Schedule", strict(unknown_attribute, unknown_element))]
pub struct Schedule {
    #[xml(child = "Stage")]
    pub stages: Vec<Stage>,
}

/// The concrete flow graph in effect on the half-open interval
/// [`start_time`, `end_time`).
#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "Stage", strict(unknown_attribute, unknown_element))]
pub struct Stage {
    #[xml(attr = "index")]
    pub index: u32,
    #[xml(attr = "startTime")]
    pub start_time: f64,
    #[xml(attr = "endTime")]
    pub end_time: f64,
    #[xml(child = "Flow")]
    pub flows: Vec<Flow>,
}

/// A directed stream between two physical instances, in m³/s.
#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead, hard_xml::XmlWrite)]
#[xml(tag = "Flow", strict(unknown_attribute, unknown_element))]
pub struct Flow {
    #[xml(attr = "from")]
    pub from: String,
    #[xml(attr = "to")]
    pub to: String,
    #[xml(attr = "rate")]
    pub rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use hard_xml::{XmlRead, XmlWrite};

    #[test]
    fn test_zone_round_trip() {
        let xml = r#"<Zone name="zone_I" nColumns="2" arrangement="serial" deadVolume="0.000000001"></Zone>"#;
        let zone = Zone::from_str(xml).unwrap();
        assert_eq!(zone.name, "zone_I");
        assert_eq!(zone.n_columns, 2);
        assert_eq!(zone.arrangement, "serial");
        assert_eq!(zone.dead_volume, Some(1e-9));
        assert!(zone.weights.is_empty());

        let written = zone.to_string().unwrap();
        let reparsed = Zone::from_str(&written).unwrap();
        assert_eq!(zone, reparsed);
    }

    #[test]
    fn test_version_gate() {
        let doc = CarouselProcess {
            format_version: "2.3.0".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            doc.check_version(),
            Err(crate::Error::UnsupportedVersion { .. })
        ));

        let doc = CarouselProcess {
            format_version: crate::FORMAT_VERSION.to_string(),
            ..Default::default()
        };
        doc.check_version().unwrap();
    }
}
