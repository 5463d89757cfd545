use serde::{Deserialize, Serialize};

use std::fmt;

/// A candidate solution: a fixed-length vector
/// of design variables and the fitness it scored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Design {
    variables: Box<[f64]>,
    fitness: f64,
}

impl Design {
    /// Returns a design with the passed variables
    /// and zero fitness.
    ///
    /// # Examples
    /// ```
    /// use neurodrive::Design;
    ///
    /// let design = Design::new(vec![0.1, 0.2]);
    /// assert_eq!(design.variables(), &[0.1, 0.2]);
    /// assert_eq!(design.fitness(), 0.0);
    /// ```
    pub fn new(variables: Vec<f64>) -> Design {
        Design {
            variables: variables.into_boxed_slice(),
            fitness: 0.0,
        }
    }

    /// Returns the design variables.
    pub fn variables(&self) -> &[f64] {
        &self.variables
    }

    /// Returns the fitness last assigned to the design.
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub(super) fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    pub(super) fn variables_mut(&mut self) -> &mut [f64] {
        &mut self.variables
    }
}

impl fmt::Display for Design {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
