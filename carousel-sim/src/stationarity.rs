//! Cyclic-steady-state detection on solution tables.
//!
//! An SMB process never settles into a constant state; it settles into a
//! periodic one. The check compares the last simulated cycle against the
//! cycle before it, column by column, and reports the worst deviation.

use arrow::{
    array::{AsArray, Float64Array},
    datatypes::{DataType, Float64Type},
    record_batch::RecordBatch,
};
use carousel::schema::solution::TIME_COLUMN;

use crate::{interpolation::Lookup, Error};

/// Tolerances for declaring a solution cyclically stationary.
#[derive(Debug, Clone)]
pub struct StationarityOptions {
    /// Absolute tolerance on the cycle-to-cycle deviation.
    pub atol: f64,
    /// Relative tolerance, scaled by the peak magnitude of each column.
    pub rtol: f64,
}

impl Default for StationarityOptions {
    fn default() -> Self {
        Self {
            atol: 1e-6,
            rtol: 1e-3,
        }
    }
}

/// Worst cycle-to-cycle deviation of one solution column.
#[derive(Debug, Clone)]
pub struct CycleDeviation {
    pub column: String,
    pub max_deviation: f64,
    /// Peak magnitude over the last cycle, used for the relative tolerance.
    pub scale: f64,
}

impl CycleDeviation {
    pub fn is_stationary(&self, options: &StationarityOptions) -> bool {
        self.max_deviation <= options.atol + options.rtol * self.scale
    }
}

/// Compares the last cycle of `solution` against the one before it.
///
/// Every sample in the last cycle is matched against the linearly
/// interpolated value one `cycle_time` earlier. The table must span at
/// least two full cycles.
pub fn cycle_deviation(
    solution: &RecordBatch,
    cycle_time: f64,
) -> Result<Vec<CycleDeviation>, Error> {
    let time = float_column(solution, TIME_COLUMN)?;
    if time.len() < 2 {
        return Err(Error::ShortSolution {
            span: 0.0,
            cycle_time,
        });
    }

    let t_end = time.value(time.len() - 1);
    let span = t_end - time.value(0);
    if span < 2.0 * cycle_time {
        return Err(Error::ShortSolution { span, cycle_time });
    }

    let schema = solution.schema();
    let mut deviations = Vec::new();
    for field in schema.fields() {
        if field.name() == TIME_COLUMN {
            continue;
        }
        let values = float_column(solution, field.name())?;

        let mut max_deviation = 0.0f64;
        let mut scale = 0.0f64;
        for i in 0..time.len() {
            let t = time.value(i);
            if t < t_end - cycle_time {
                continue;
            }
            let current = values.value(i);
            let previous = Lookup::new(&time, t - cycle_time).interpolate(&values);
            max_deviation = max_deviation.max((current - previous).abs());
            scale = scale.max(current.abs());
        }

        log::debug!(
            "Column '{}': max cycle deviation {max_deviation:.3e}, scale {scale:.3e}",
            field.name()
        );

        deviations.push(CycleDeviation {
            column: field.name().clone(),
            max_deviation,
            scale,
        });
    }

    Ok(deviations)
}

/// True when every column passes the tolerance check.
pub fn is_stationary(deviations: &[CycleDeviation], options: &StationarityOptions) -> bool {
    deviations.iter().all(|d| d.is_stationary(options))
}

fn float_column(batch: &RecordBatch, name: &str) -> Result<Float64Array, Error> {
    let column = batch
        .column_by_name(name)
        .ok_or_else(|| Error::MissingColumn(name.to_string()))?;
    let cast = arrow::compute::cast(column, &DataType::Float64)?;
    Ok(cast.as_primitive::<Float64Type>().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::{
        array::ArrayRef,
        datatypes::{Field, Schema},
    };
    use std::sync::Arc;

    fn solution_table(time: Vec<f64>, columns: Vec<(&str, Vec<f64>)>) -> RecordBatch {
        let mut fields = vec![Field::new(TIME_COLUMN, DataType::Float64, false)];
        let mut arrays: Vec<ArrayRef> = vec![Arc::new(Float64Array::from(time))];
        for (name, values) in columns {
            fields.push(Field::new(name, DataType::Float64, false));
            arrays.push(Arc::new(Float64Array::from(values)));
        }
        RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).unwrap()
    }

    #[test]
    fn test_periodic_solution_is_stationary() {
        let cycle_time = 10.0;
        let time: Vec<f64> = (0..=160).map(|i| i as f64 * 0.125).collect();
        let values: Vec<f64> = time
            .iter()
            .map(|t| (2.0 * std::f64::consts::PI * t / cycle_time).sin())
            .collect();
        let batch = solution_table(time, vec![("raffinate.A", values)]);

        let deviations = cycle_deviation(&batch, cycle_time).unwrap();
        assert_eq!(deviations.len(), 1);
        assert!(deviations[0].max_deviation < 1e-12);
        assert!(is_stationary(&deviations, &StationarityOptions::default()));
    }

    #[test]
    fn test_drifting_solution_is_not_stationary() {
        let cycle_time = 10.0;
        let time: Vec<f64> = (0..=160).map(|i| i as f64 * 0.125).collect();
        let values: Vec<f64> = time.iter().map(|t| 0.1 * t).collect();
        let batch = solution_table(time, vec![("raffinate.A", values)]);

        let deviations = cycle_deviation(&batch, cycle_time).unwrap();
        assert!((deviations[0].max_deviation - 1.0).abs() < 1e-9);
        assert!(!is_stationary(&deviations, &StationarityOptions::default()));
    }

    #[test]
    fn test_short_solution_is_rejected() {
        let time: Vec<f64> = (0..=10).map(|i| i as f64).collect();
        let values = vec![0.0; 11];
        let batch = solution_table(time, vec![("raffinate.A", values)]);

        let err = cycle_deviation(&batch, 10.0).unwrap_err();
        assert!(matches!(err, Error::ShortSolution { .. }));
    }

    #[test]
    fn test_missing_time_column_is_an_error() {
        let no_time = RecordBatch::try_new(
            Arc::new(Schema::new(vec![Field::new(
                "raffinate.A",
                DataType::Float64,
                false,
            )])),
            vec![Arc::new(Float64Array::from(vec![0.0, 1.0])) as ArrayRef],
        )
        .unwrap();

        let err = cycle_deviation(&no_time, 10.0).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(name) if name == TIME_COLUMN));
    }
}
