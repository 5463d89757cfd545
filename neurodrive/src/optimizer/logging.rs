use super::{Design, GeneticOptimizer};

use serde::{Deserialize, Serialize};

use std::fmt;

/// How many designs each logged generation keeps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportingLevel {
    /// Every design of the generation.
    AllDesigns,
    /// The fittest design only.
    Champion,
    /// Statistics only.
    NoDesigns,
}

/// A snapshot of an optimizer's population.
#[derive(Clone, Debug)]
pub struct Log {
    pub generation_number: usize,
    pub generation_sample: GenerationMemberRecord,
    pub design_stats: Vec<(String, Stats)>,
}

impl Log {
    /// Returns the statistics recorded under `name`, if any.
    pub fn stat(&self, name: &str) -> Option<&Stats> {
        self.design_stats
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }
}

impl fmt::Display for Log {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "generation {}", self.generation_number)?;
        for (name, stats) in &self.design_stats {
            write!(f, "\n  {}: {}", name, stats)?;
        }
        Ok(())
    }
}

/// Summary statistics of a sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub maximum: f64,
    pub minimum: f64,
    pub mean: f64,
    pub median: f64,
}

impl Stats {
    /// Returns statistics about numbers in a sequence.
    ///
    /// # Panics
    /// Panics if the sequence is empty.
    ///
    /// # Examples
    /// ```
    /// use neurodrive::logging::Stats;
    ///
    /// let stats = Stats::from([-2.0, -1.0, 0.5, 1.0, 1.5].iter().copied());
    /// assert_eq!(stats.maximum, 1.5);
    /// assert_eq!(stats.minimum, -2.0);
    /// assert_eq!(stats.mean, 0.0);
    /// assert_eq!(stats.median, 0.5);
    ///
    /// let stats = Stats::from([4.0, 1.0, 3.0, 2.0].iter().copied());
    /// assert_eq!(stats.median, 2.5);
    /// ```
    pub fn from(data: impl Iterator<Item = f64>) -> Stats {
        let mut data: Vec<f64> = data.collect();
        assert!(!data.is_empty(), "statistics of an empty sequence");
        let mid = data.len() / 2;
        let (mut max, mut min, mut sum) = (f64::MIN, f64::MAX, 0.0);
        for d in &data {
            max = d.max(max);
            min = d.min(min);
            sum += d;
        }
        let mean = sum / data.len() as f64;
        let upper = *data.select_nth_unstable_by(mid, f64::total_cmp).1;
        let median = if data.len() % 2 == 0 {
            // Everything left of `mid` is now no greater than `upper`.
            let lower = data[..mid]
                .iter()
                .copied()
                .fold(f64::MIN, f64::max);
            (lower + upper) / 2.0
        } else {
            upper
        };
        Stats {
            maximum: max,
            minimum: min,
            mean,
            median,
        }
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "max {:.3}, min {:.3}, mean {:.3}, median {:.3}",
            self.maximum, self.minimum, self.mean, self.median
        )
    }
}

/// The designs kept from a logged generation,
/// depending on the [`ReportingLevel`].
#[derive(Clone, Debug)]
pub enum GenerationMemberRecord {
    /// Every design in the population.
    Designs(Vec<Design>),
    /// Only the population champion.
    Champion(Design),
    /// Empty.
    None,
}

/// Per-generation snapshots of an optimizer's population.
#[derive(Clone, Debug)]
pub struct EvolutionLogger {
    reporting_level: ReportingLevel,
    logs: Vec<Log>,
}

impl EvolutionLogger {
    /// Returns an empty logger keeping designs per `reporting_level`.
    ///
    /// # Examples
    /// ```
    /// use neurodrive::logging::{EvolutionLogger, ReportingLevel};
    ///
    /// let logger = EvolutionLogger::new(ReportingLevel::NoDesigns);
    /// assert_eq!(logger.iter().count(), 0);
    /// ```
    pub fn new(reporting_level: ReportingLevel) -> EvolutionLogger {
        EvolutionLogger {
            reporting_level,
            logs: vec![],
        }
    }

    /// Records the optimizer's current generation.
    ///
    /// `design_stat_extractor` maps every design to `N` values,
    /// which are summarized under the matching `stat_names`.
    ///
    /// # Examples
    /// ```
    /// use neurodrive::{GeneticOptimizer, OptimizerConfig};
    /// use neurodrive::logging::{EvolutionLogger, ReportingLevel};
    ///
    /// let mut logger = EvolutionLogger::new(ReportingLevel::Champion);
    /// let mut optimizer = GeneticOptimizer::new(3, 2, OptimizerConfig::default()).unwrap();
    /// for i in 0..3 {
    ///     optimizer.set_fitness(i, i as f64).unwrap();
    /// }
    ///
    /// logger.log(&optimizer, &|d| [d.fitness()], ["fitness"]);
    /// let fitness = logger.last().unwrap().stat("fitness").unwrap();
    /// assert_eq!(fitness.maximum, 2.0);
    /// assert_eq!(fitness.mean, 1.0);
    /// ```
    pub fn log<DSE, const N: usize>(
        &mut self,
        optimizer: &GeneticOptimizer,
        design_stat_extractor: &DSE,
        stat_names: [&str; N],
    ) where
        DSE: Fn(&Design) -> [f64; N],
    {
        let stats: Vec<[f64; N]> = optimizer.designs().map(design_stat_extractor).collect();
        let design_stats = stat_names
            .iter()
            .cloned()
            .map(String::from)
            .zip(unzip_n_vecs(stats.into_iter()))
            .map(|(name, data)| (name, Stats::from(data.into_iter())))
            .collect();
        self.logs.push(Log {
            generation_number: optimizer.generation(),
            generation_sample: match self.reporting_level {
                ReportingLevel::AllDesigns => {
                    GenerationMemberRecord::Designs(optimizer.designs().cloned().collect())
                }
                ReportingLevel::Champion => {
                    GenerationMemberRecord::Champion(optimizer.champion().clone())
                }
                ReportingLevel::NoDesigns => GenerationMemberRecord::None,
            },
            design_stats,
        })
    }

    /// Iterates over the logged generations, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Log> {
        self.logs.iter()
    }

    /// Returns the most recent snapshot.
    pub fn last(&self) -> Option<&Log> {
        self.logs.last()
    }

    /// Returns the logger's reporting level.
    pub fn reporting_level(&self) -> ReportingLevel {
        self.reporting_level
    }
}

fn unzip_n_vecs<T: Clone, const N: usize>(iter: impl Iterator<Item = [T; N]>) -> Vec<Vec<T>> {
    let mut vecs = vec![Vec::default(); N];
    for items in iter {
        for (vec, item) in vecs.iter_mut().zip(items) {
            vec.push(item);
        }
    }
    vecs
}
