//! This module provides the Model struct for representing an entire metabolic model
use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use thiserror::Error;

use crate::metabolic_model::compartment::Compartment;
use crate::metabolic_model::gene::Gene;
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::reaction::Reaction;

/// Represents a Genome Scale Metabolic Model
///
/// Entities are kept in insertion order, and every insertion checks that the new entity's id
/// is unused and that everything it refers to is already part of the model.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    /// Id associated with the Model
    pub id: String,
    /// Map of compartment ids to Compartment Objects
    pub compartments: IndexMap<String, Compartment>,
    /// Map of metabolite ids to Metabolite Objects
    pub metabolites: IndexMap<String, Metabolite>,
    /// Map of gene ids to Gene Objects
    pub genes: IndexMap<String, Gene>,
    /// Map of reaction ids to Reaction Objects
    pub reactions: IndexMap<String, Reaction>,
    /// Id of the reaction representing growth of the organism
    pub biomass_reaction: Option<String>,
}

impl Model {
    pub fn new(id: &str) -> Self {
        Model {
            id: id.to_string(),
            compartments: IndexMap::new(),
            metabolites: IndexMap::new(),
            genes: IndexMap::new(),
            reactions: IndexMap::new(),
            biomass_reaction: None,
        }
    }

    // region Adding Entities
    /// Add a compartment to the model
    pub fn add_compartment(&mut self, compartment: Compartment) -> Result<(), ModelError> {
        if self.compartments.contains_key(&compartment.id) {
            return Err(ModelError::DuplicateId {
                kind: EntityKind::Compartment,
                id: compartment.id,
            });
        }
        self.compartments.insert(compartment.id.clone(), compartment);
        Ok(())
    }

    /// Add a metabolite to the model
    ///
    /// The metabolite's compartment must already be in the model.
    ///
    /// # Examples
    /// ```rust
    /// use consortia_core::metabolic_model::compartment::Compartment;
    /// use consortia_core::metabolic_model::metabolite::Metabolite;
    /// use consortia_core::metabolic_model::model::Model;
    /// let mut model = Model::new("e_coli");
    /// model.add_compartment(Compartment::new("c", Some("cytosol"), false)).unwrap();
    /// model.add_metabolite(Metabolite::new("atp_c", None, "c")).unwrap();
    /// assert!(model.add_metabolite(Metabolite::new("atp_m", None, "m")).is_err());
    /// ```
    pub fn add_metabolite(&mut self, metabolite: Metabolite) -> Result<(), ModelError> {
        if self.metabolites.contains_key(&metabolite.id) {
            return Err(ModelError::DuplicateId {
                kind: EntityKind::Metabolite,
                id: metabolite.id,
            });
        }
        if !self.compartments.contains_key(&metabolite.compartment) {
            return Err(ModelError::UnknownCompartment {
                compartment: metabolite.compartment,
                metabolite: metabolite.id,
            });
        }
        self.metabolites.insert(metabolite.id.clone(), metabolite);
        Ok(())
    }

    /// Add a gene to the model
    pub fn add_gene(&mut self, gene: Gene) -> Result<(), ModelError> {
        if self.genes.contains_key(&gene.id) {
            return Err(ModelError::DuplicateId {
                kind: EntityKind::Gene,
                id: gene.id,
            });
        }
        self.genes.insert(gene.id.clone(), gene);
        Ok(())
    }

    /// Add a reaction to the model
    ///
    /// Every metabolite in the stoichiometry and every gene of the GPR association must already
    /// be in the model.
    ///
    /// # Examples
    /// ```rust
    /// use consortia_core::metabolic_model::compartment::Compartment;
    /// use consortia_core::metabolic_model::metabolite::Metabolite;
    /// use consortia_core::metabolic_model::model::Model;
    /// use consortia_core::metabolic_model::reaction::ReactionBuilder;
    /// let mut model = Model::new("e_coli");
    /// model.add_compartment(Compartment::new("e", None, true)).unwrap();
    /// model.add_metabolite(Metabolite::new("glc_e", None, "e")).unwrap();
    /// let mut stoichiometry = indexmap::IndexMap::new();
    /// stoichiometry.insert("glc_e".to_string(), -1.);
    /// let new_reaction = ReactionBuilder::default()
    ///     .id("EX_glc_e".to_string())
    ///     .stoichiometry(stoichiometry)
    ///     .build()
    ///     .unwrap();
    /// model.add_reaction(new_reaction).unwrap();
    /// ```
    pub fn add_reaction(&mut self, reaction: Reaction) -> Result<(), ModelError> {
        if self.reactions.contains_key(&reaction.id) {
            return Err(ModelError::DuplicateId {
                kind: EntityKind::Reaction,
                id: reaction.id,
            });
        }
        if let Some(m_id) = reaction
            .stoichiometry
            .keys()
            .find(|m_id| !self.metabolites.contains_key(*m_id))
        {
            return Err(ModelError::UnknownMetabolite {
                metabolite: m_id.clone(),
                reaction: reaction.id,
            });
        }
        if let Some(g_id) = reaction
            .genes()
            .into_iter()
            .find(|g_id| !self.genes.contains_key(*g_id))
        {
            return Err(ModelError::UnknownGene {
                gene: g_id.to_string(),
                reaction: reaction.id.clone(),
            });
        }
        self.reactions.insert(reaction.id.clone(), reaction);
        Ok(())
    }

    /// Designate the reaction representing growth of the organism
    pub fn set_biomass_reaction(&mut self, reaction_id: &str) -> Result<(), ModelError> {
        if !self.reactions.contains_key(reaction_id) {
            return Err(ModelError::UnknownReaction(reaction_id.to_string()));
        }
        self.biomass_reaction = Some(reaction_id.to_string());
        Ok(())
    }
    // endregion Adding Entities

    // region Lookup
    pub fn get_compartment(&self, id: &str) -> Option<&Compartment> {
        self.compartments.get(id)
    }

    pub fn get_metabolite(&self, id: &str) -> Option<&Metabolite> {
        self.metabolites.get(id)
    }

    pub fn get_gene(&self, id: &str) -> Option<&Gene> {
        self.genes.get(id)
    }

    pub fn get_reaction(&self, id: &str) -> Option<&Reaction> {
        self.reactions.get(id)
    }

    pub fn contains_compartment(&self, id: &str) -> bool {
        self.compartments.contains_key(id)
    }

    pub fn contains_metabolite(&self, id: &str) -> bool {
        self.metabolites.contains_key(id)
    }

    pub fn contains_gene(&self, id: &str) -> bool {
        self.genes.contains_key(id)
    }

    pub fn contains_reaction(&self, id: &str) -> bool {
        self.reactions.contains_key(id)
    }
    // endregion Lookup

    // region Queries
    /// Map of reaction ids to their (non-zero) objective coefficients
    pub fn objective(&self) -> IndexMap<String, f64> {
        self.reactions
            .values()
            .filter(|r| r.objective != 0.)
            .map(|r| (r.id.clone(), r.objective))
            .collect()
    }

    /// Reactions exchanging metabolites with the environment
    pub fn exchange_reactions(&self) -> Vec<&Reaction> {
        self.reactions.values().filter(|r| r.is_exchange()).collect()
    }

    /// Ids of the compartments flagged as facing the environment
    pub fn external_compartments(&self) -> Vec<&str> {
        self.compartments
            .values()
            .filter(|c| c.external)
            .map(|c| c.id.as_str())
            .collect()
    }

    /// Guess which reaction represents growth
    ///
    /// Picks the first reaction with a non-zero objective coefficient, or failing that the
    /// first reaction whose id mentions "biomass".
    pub fn detect_biomass_reaction(&self) -> Option<&str> {
        self.reactions
            .values()
            .find(|r| r.objective != 0.)
            .or_else(|| {
                self.reactions
                    .values()
                    .find(|r| r.id.to_lowercase().contains("biomass"))
            })
            .map(|r| r.id.as_str())
    }
    // endregion Queries
}

/// Kinds of entities held by a [`Model`]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntityKind {
    Compartment,
    Metabolite,
    Gene,
    Reaction,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            EntityKind::Compartment => "compartment",
            EntityKind::Metabolite => "metabolite",
            EntityKind::Gene => "gene",
            EntityKind::Reaction => "reaction",
        };
        write!(f, "{}", kind)
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("A {kind} with id {id} is already in the model")]
    DuplicateId { kind: EntityKind, id: String },
    #[error("Metabolite {metabolite} is in compartment {compartment}, which is not in the model")]
    UnknownCompartment {
        compartment: String,
        metabolite: String,
    },
    #[error("Reaction {reaction} uses metabolite {metabolite}, which is not in the model")]
    UnknownMetabolite { metabolite: String, reaction: String },
    #[error("GPR of reaction {reaction} uses gene {gene}, which is not in the model")]
    UnknownGene { gene: String, reaction: String },
    #[error("Reaction {0} is not in the model")]
    UnknownReaction(String),
}

#[cfg(test)]
mod model_tests {
    use super::*;
    use crate::metabolic_model::gene::GprAssociation;
    use crate::metabolic_model::reaction::{ReactionBuilder, ReactionType};

    fn setup_model() -> Model {
        let mut model = Model::new("toy");
        model
            .add_compartment(Compartment::new("c", Some("cytosol"), false))
            .unwrap();
        model
            .add_compartment(Compartment::new("e", Some("extracellular"), true))
            .unwrap();
        model
            .add_metabolite(Metabolite::new("glc_e", Some("glucose"), "e"))
            .unwrap();
        model
            .add_metabolite(Metabolite::new("glc_c", Some("glucose"), "c"))
            .unwrap();
        model.add_gene(Gene::new("ptsG", None)).unwrap();
        model
    }

    fn stoichiometry(terms: &[(&str, f64)]) -> IndexMap<String, f64> {
        terms.iter().map(|(m, c)| (m.to_string(), *c)).collect()
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut model = setup_model();
        let err = model
            .add_metabolite(Metabolite::new("glc_c", None, "c"))
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateId {
                kind: EntityKind::Metabolite,
                id: "glc_c".to_string()
            }
        );
        assert!(model
            .add_compartment(Compartment::new("c", None, false))
            .is_err());
        assert!(model.add_gene(Gene::new("ptsG", None)).is_err());
        assert_eq!(model.metabolites.len(), 2);
    }

    #[test]
    fn dangling_references_are_rejected() {
        let mut model = setup_model();
        let rxn = ReactionBuilder::default()
            .id("GLCt".to_string())
            .stoichiometry(stoichiometry(&[("glc_e", -1.), ("glc_p", 1.)]))
            .build()
            .unwrap();
        assert!(matches!(
            model.add_reaction(rxn),
            Err(ModelError::UnknownMetabolite { .. })
        ));

        let rxn = ReactionBuilder::default()
            .id("GLCt".to_string())
            .stoichiometry(stoichiometry(&[("glc_e", -1.), ("glc_c", 1.)]))
            .gpr(Some("ptsG and crr".parse::<GprAssociation>().unwrap()))
            .build()
            .unwrap();
        assert_eq!(
            model.add_reaction(rxn),
            Err(ModelError::UnknownGene {
                gene: "crr".to_string(),
                reaction: "GLCt".to_string()
            })
        );
        assert!(model.reactions.is_empty());
        assert!(model.set_biomass_reaction("GLCt").is_err());
    }

    #[test]
    fn queries() {
        let mut model = setup_model();
        let exchange = ReactionBuilder::default()
            .id("EX_glc_e".to_string())
            .stoichiometry(stoichiometry(&[("glc_e", -1.)]))
            .reaction_type(ReactionType::Exchange)
            .build()
            .unwrap();
        let growth = ReactionBuilder::default()
            .id("Growth".to_string())
            .stoichiometry(stoichiometry(&[("glc_c", -10.)]))
            .objective(1.)
            .build()
            .unwrap();
        model.add_reaction(exchange).unwrap();
        model.add_reaction(growth).unwrap();

        assert_eq!(model.external_compartments(), vec!["e"]);
        assert_eq!(model.exchange_reactions().len(), 1);
        assert_eq!(model.objective().get("Growth"), Some(&1.));
        assert_eq!(model.detect_biomass_reaction(), Some("Growth"));
        assert!(model.contains_reaction("EX_glc_e"));
        assert!(model.get_gene("ptsG").is_some());
    }

    #[test]
    fn detect_biomass_by_name() {
        let mut model = setup_model();
        let rxn = ReactionBuilder::default()
            .id("BIOMASS_Ec_core".to_string())
            .stoichiometry(stoichiometry(&[("glc_c", -1.)]))
            .build()
            .unwrap();
        model.add_reaction(rxn).unwrap();
        assert_eq!(model.detect_biomass_reaction(), Some("BIOMASS_Ec_core"));
        model.set_biomass_reaction("BIOMASS_Ec_core").unwrap();
        assert_eq!(model.biomass_reaction.as_deref(), Some("BIOMASS_Ec_core"));
    }
}
