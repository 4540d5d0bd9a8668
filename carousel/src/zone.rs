//! Column-bearing zones of the carousel ring.

use crate::{network::Port, Error, FRACTION_TOLERANCE};

/// How the columns of a zone share the zone flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ZoneArrangement {
    /// The outlet of each column feeds the next; the full zone flow passes
    /// through every column.
    #[default]
    Serial,
    /// The zone flow is distributed over the columns and recombined.
    Parallel,
}

/// An ordered group of identical columns presenting a single inlet and a
/// single outlet port to the network.
///
/// A zone of one column behaves exactly like a bare column between the
/// zone's ports.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    name: String,
    n_columns: usize,
    arrangement: ZoneArrangement,
    weights: Option<Vec<f64>>,
    dead_volume: Option<f64>,
}

impl Zone {
    /// A zone of `n_columns` columns in series.
    pub fn serial(name: impl Into<String>, n_columns: usize) -> Result<Self, Error> {
        Self::with_arrangement(name.into(), n_columns, ZoneArrangement::Serial, None)
    }

    /// A zone of `n_columns` columns in parallel, flow divided equally.
    pub fn parallel(name: impl Into<String>, n_columns: usize) -> Result<Self, Error> {
        Self::with_arrangement(name.into(), n_columns, ZoneArrangement::Parallel, None)
    }

    /// A parallel zone with one flow weight per column. The weights must be
    /// positive and sum to 1.
    pub fn parallel_weighted(name: impl Into<String>, weights: Vec<f64>) -> Result<Self, Error> {
        let name = name.into();
        if let Some(weight) = weights.iter().find(|w| **w <= 0.0) {
            return Err(Error::FlowImbalance {
                unit: name,
                detail: format!("column weight {weight} is not positive"),
            });
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > FRACTION_TOLERANCE {
            return Err(Error::FlowImbalance {
                unit: name,
                detail: format!("column weights sum to {sum}, expected 1"),
            });
        }
        let n_columns = weights.len();
        Self::with_arrangement(name, n_columns, ZoneArrangement::Parallel, Some(weights))
    }

    fn with_arrangement(
        name: String,
        n_columns: usize,
        arrangement: ZoneArrangement,
        weights: Option<Vec<f64>>,
    ) -> Result<Self, Error> {
        if n_columns == 0 {
            return Err(Error::EmptyZone { zone: name });
        }
        Ok(Self {
            name,
            n_columns,
            arrangement,
            weights,
            dead_volume: None,
        })
    }

    /// Puts a hold-up vessel of `volume` m³ on the inlet line of each
    /// column slot, overriding any process-wide default.
    pub fn with_dead_volume(mut self, volume: f64) -> Self {
        self.dead_volume = Some(volume);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn n_columns(&self) -> usize {
        self.n_columns
    }

    pub fn arrangement(&self) -> ZoneArrangement {
        self.arrangement
    }

    /// Explicit parallel flow weights, if configured.
    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }

    pub fn dead_volume(&self) -> Option<f64> {
        self.dead_volume
    }

    /// The aggregate port upstream connections attach to.
    pub fn inlet_port(&self) -> Port {
        Port::inlet(&self.name)
    }

    /// The aggregate port downstream connections leave from.
    pub fn outlet_port(&self) -> Port {
        Port::outlet(&self.name)
    }

    /// Share of the zone flow seen by each column slot. All ones for a
    /// serial zone, the (explicit or equal) split for a parallel zone.
    pub fn column_weights(&self) -> Vec<f64> {
        match self.arrangement {
            ZoneArrangement::Serial => vec![1.0; self.n_columns],
            ZoneArrangement::Parallel => self
                .weights
                .clone()
                .unwrap_or_else(|| vec![1.0 / self.n_columns as f64; self.n_columns]),
        }
    }
}
