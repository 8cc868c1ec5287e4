//! This module provides the Compartment struct
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use super::Metadata;

/// Represents a compartment (cytosol, periplasm, extracellular space, ...)
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compartment {
    /// Used to identify the compartment (must be unique)
    pub id: String,
    /// Human readable compartment name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Whether this compartment is the boundary facing the environment
    #[builder(default = "false")]
    pub external: bool,
    /// Compartment annotations
    #[builder(default = "Metadata::new()")]
    #[serde(default)]
    pub metadata: Metadata,
}

impl Compartment {
    pub fn new(id: &str, name: Option<&str>, external: bool) -> Compartment {
        Compartment {
            id: id.to_string(),
            name: name.map(str::to_string),
            external,
            metadata: Metadata::new(),
        }
    }
}
