//! Chemical component bookkeeping shared by every unit of a process.

/// An ordered set of named chemical components.
///
/// Every stream of a process carries one concentration value per component,
/// in this order. The order also fixes the column layout of solution tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentSystem {
    components: Vec<String>,
}

impl ComponentSystem {
    pub fn new<I>(components: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            components: components.into_iter().map(Into::into).collect(),
        }
    }

    pub fn n_components(&self) -> usize {
        self.components.len()
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Position of a component by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.components.iter().position(|c| c == name)
    }
}
