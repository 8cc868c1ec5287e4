//! This module provides a struct for representing reactions
use derive_builder::Builder;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::gene::GprAssociation;
use super::Metadata;
use crate::configuration::CONFIGURATION;

/// Represents a reaction in the metabolic model
///
/// # Examples
/// ```rust
/// use consortia_core::metabolic_model::reaction::ReactionBuilder;
/// let rxn = ReactionBuilder::default()
///     .id("PGI".to_string())
///     .reversible(false)
///     .build()
///     .unwrap();
/// assert_eq!(rxn.lower_bound, 0.);
/// assert_eq!(rxn.upper_bound, f64::INFINITY);
/// ```
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    /// Used to identify the reaction
    pub id: String,
    /// Human-readable reaction name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Whether the reaction can carry flux in both directions
    #[builder(default = "true")]
    pub reversible: bool,
    /// Metabolite stoichiometry of the reaction, keyed by metabolite id
    #[builder(default = "IndexMap::new()")]
    pub stoichiometry: IndexMap<String, f64>,
    /// Lower flux bound
    #[builder(default = "self.default_lower_bound()")]
    pub lower_bound: f64,
    /// Upper flux bound
    #[builder(default = "CONFIGURATION.read().unwrap().upper_bound")]
    pub upper_bound: f64,
    /// Objective function coefficient
    #[builder(default = "0.")]
    pub objective: f64,
    /// Kind of reaction (see [`ReactionType`])
    #[builder(default = "ReactionType::Other")]
    pub reaction_type: ReactionType,
    /// Gene Protein Reaction association, None if no genetic requirement is known
    #[builder(default = "None")]
    pub gpr: Option<GprAssociation>,
    /// Reaction annotations
    #[builder(default = "Metadata::new()")]
    #[serde(default)]
    pub metadata: Metadata,
}

impl ReactionBuilder {
    /// Irreversible reactions only carry forward flux unless told otherwise
    fn default_lower_bound(&self) -> f64 {
        match self.reversible {
            Some(false) => 0.,
            _ => CONFIGURATION.read().unwrap().lower_bound,
        }
    }
}

impl Reaction {
    /// Whether the reaction exchanges a metabolite with the environment
    pub fn is_exchange(&self) -> bool {
        self.reaction_type == ReactionType::Exchange
    }

    /// Ids of the genes in the reaction's GPR association
    pub fn genes(&self) -> Vec<&str> {
        match self.gpr {
            Some(ref gpr) => gpr.genes(),
            None => Vec::new(),
        }
    }
}

/// The kind of a reaction
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionType {
    /// Catalysed conversion inside a single compartment
    Enzymatic,
    /// Movement of metabolites between compartments
    Transport,
    /// Boundary reaction exchanging a single metabolite with the environment
    Exchange,
    /// Boundary reaction draining an internal metabolite
    Sink,
    /// Anything else, or unknown
    #[default]
    Other,
}
