//! Expected shape of the solution table a solver hands back.

use arrow::datatypes::{DataType, Field, Schema};

use crate::process::CarouselProcess;

/// Name of the time column in a solution table.
pub const TIME_COLUMN: &str = "time";

/// Column name carrying `component` concentration at `outlet`.
pub fn outlet_column(outlet: &str, component: &str) -> String {
    format!("{outlet}.{component}")
}

/// The Arrow schema of a conforming solution table: a time column in
/// seconds followed by one Float64 concentration column per outlet and
/// component, in document order.
pub fn solution_schema(doc: &CarouselProcess) -> Schema {
    let mut fields = vec![Field::new(TIME_COLUMN, DataType::Float64, false)];
    for outlet in &doc.units.outlets {
        for component in &doc.components.components {
            fields.push(Field::new(
                outlet_column(&outlet.name, &component.name),
                DataType::Float64,
                false,
            ));
        }
    }
    Schema::new(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{Component, Outlet};

    #[test]
    fn test_solution_schema() {
        let mut doc = CarouselProcess::default();
        doc.components.components = vec![
            Component {
                name: "A".to_string(),
            },
            Component {
                name: "B".to_string(),
            },
        ];
        doc.units.outlets = vec![
            Outlet {
                name: "extract".to_string(),
            },
            Outlet {
                name: "raffinate".to_string(),
            },
        ];

        let schema = solution_schema(&doc);
        let names: Vec<_> = schema.fields().iter().map(|f| f.name().clone()).collect();
        assert_eq!(
            names,
            [
                "time",
                "extract.A",
                "extract.B",
                "raffinate.A",
                "raffinate.B"
            ]
        );
    }
}
