//! Process-wide defaults used when building model entities
use std::sync::{LazyLock, RwLock};

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

pub struct Configuration {
    /// Default lower flux bound of a reversible reaction
    pub lower_bound: f64,
    /// Default upper flux bound of a reaction
    pub upper_bound: f64,
    /// Magnitude written in place of an infinite bound when exporting to JSON
    pub export_bound: f64,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            lower_bound: f64::NEG_INFINITY,
            upper_bound: f64::INFINITY,
            export_bound: 1000.,
        }
    }
}
