/// An interface for anything whose tunable
/// parameters can be overwritten by an optimizer design.
pub trait Phenotype {
    /// Returns the number of design variables
    /// the phenotype is parameterized by.
    fn design_len(&self) -> usize;

    /// Overwrites the phenotype's parameters
    /// with the passed design variables.
    ///
    /// # Panics
    /// Implementations should panic if
    /// `variables.len() != self.design_len()`.
    fn load_design(&mut self, variables: &[f64]);

    /// Returns the phenotype's current parameters
    /// as a design vector.
    fn to_design(&self) -> Vec<f64>;
}
