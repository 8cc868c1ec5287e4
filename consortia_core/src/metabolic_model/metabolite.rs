//! This module provides the metabolite struct representing a metabolite

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use super::Metadata;

/// Represents a metabolite
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metabolite {
    /// Used to identify the metabolite (must be unique)
    pub id: String,
    /// Human Readable name of the metabolite
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Which compartment the metabolite is in
    pub compartment: String,
    /// Metabolite annotations (formula, charge, database cross references, ...)
    #[builder(default = "Metadata::new()")]
    #[serde(default)]
    pub metadata: Metadata,
}

impl Metabolite {
    pub fn new(id: &str, name: Option<&str>, compartment: &str) -> Metabolite {
        Metabolite {
            id: id.to_string(),
            name: name.map(str::to_string),
            compartment: compartment.to_string(),
            metadata: Metadata::new(),
        }
    }
}
