//! Merging of organism models into a single community model
use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, info};

use super::namespace::Namespace;
use super::{
    CommunityError, COMMUNITY_BIOMASS, COMMUNITY_GROWTH, EXCHANGE_PREFIX, EXTERNAL_COMPARTMENT,
    METABOLITE_PREFIX, TRANSPORT_SUFFIX,
};
use crate::metabolic_model::compartment::Compartment;
use crate::metabolic_model::gene::Gene;
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::reaction::{ReactionBuilder, ReactionType};

/// Map of (organism id, organism-local id) to the id of the entity in the merged model
pub type ProvenanceMap = IndexMap<(String, String), String>;

/// Result of merging a community: the merged model and where its entities came from
#[derive(Clone, Debug)]
pub struct MergedCommunity {
    pub model: Arc<Model>,
    pub reaction_map: ProvenanceMap,
    pub metabolite_map: ProvenanceMap,
}

/// Merge organism models into a single community model
///
/// Every organism entity is copied under its organism's [`Namespace`]. Metabolites are also
/// pooled, by their original id, into a shared external compartment, and each organism's
/// exchange reactions become transports between its own copy of the metabolite and the pool.
/// The biomass reaction of each organism feeds a community biomass metabolite, consumed by the
/// community growth reaction, which is the only objective of the merged model.
///
/// Organism ids are expected to be unique. Fails on the first inconsistency found, the partial
/// model is dropped.
pub fn merge_models<'a, I>(
    community_id: &str,
    organisms: I,
) -> Result<MergedCommunity, CommunityError>
where
    I: IntoIterator<Item = &'a Model>,
{
    let mut merger = Merger::new(community_id)?;
    for organism in organisms {
        merger.add_organism(organism)?;
    }
    merger.add_community_exchanges()?;
    Ok(merger.finish())
}

/// Merged model under construction
struct Merger {
    model: Model,
    reaction_map: ProvenanceMap,
    metabolite_map: ProvenanceMap,
    /// Ids of the pooled external metabolites, in creation order
    pooled: Vec<String>,
}

impl Merger {
    fn new(community_id: &str) -> Result<Self, CommunityError> {
        let mut merger = Merger {
            model: Model::new(community_id),
            reaction_map: ProvenanceMap::new(),
            metabolite_map: ProvenanceMap::new(),
            pooled: Vec::new(),
        };
        merger.add_community_biomass()?;
        Ok(merger)
    }

    /// Shared external compartment, community biomass metabolite and community growth
    fn add_community_biomass(&mut self) -> Result<(), CommunityError> {
        self.model.add_compartment(Compartment::new(
            EXTERNAL_COMPARTMENT,
            Some("extracellular environment"),
            true,
        ))?;
        self.model.add_metabolite(Metabolite::new(
            COMMUNITY_BIOMASS,
            Some("Total community biomass"),
            EXTERNAL_COMPARTMENT,
        ))?;
        let growth = ReactionBuilder::default()
            .id(COMMUNITY_GROWTH.to_string())
            .name(Some("Community growth rate".to_string()))
            .reversible(false)
            .stoichiometry(IndexMap::from([(COMMUNITY_BIOMASS.to_string(), -1.)]))
            .lower_bound(0.)
            .upper_bound(f64::INFINITY)
            .objective(1.)
            .build()?;
        self.model.add_reaction(growth)?;
        self.model.set_biomass_reaction(COMMUNITY_GROWTH)?;
        Ok(())
    }

    fn add_organism(&mut self, organism: &Model) -> Result<(), CommunityError> {
        debug!(
            "Merging organism {} into community {}",
            organism.id, self.model.id
        );
        let ns = Namespace::new(&organism.id);
        let external = self.merge_compartments(ns, organism)?;
        self.merge_metabolites(ns, organism, &external)?;
        self.merge_genes(ns, organism)?;
        self.merge_reactions(ns, organism)
    }

    /// Copy compartments under the namespace, returning the ids of the organism's external
    /// compartments
    ///
    /// Copies are never flagged external, the shared compartment is the only boundary left.
    fn merge_compartments<'m>(
        &mut self,
        ns: Namespace,
        organism: &'m Model,
    ) -> Result<Vec<&'m str>, CommunityError> {
        let mut external = Vec::new();
        for (c_id, comp) in &organism.compartments {
            if comp.external {
                external.push(c_id.as_str());
            }
            let mut new_comp = Compartment::new(&ns.rename(c_id), comp.name.as_deref(), false);
            new_comp.metadata = comp.metadata.clone();
            self.model.add_compartment(new_comp)?;
        }
        Ok(external)
    }

    /// Copy metabolites under the namespace, and pool them by original id
    ///
    /// The first organism to use an id creates the pooled metabolite, later ones reuse it.
    /// Pooling only looks at the id, not at the compartment the metabolite is in.
    fn merge_metabolites(
        &mut self,
        ns: Namespace,
        organism: &Model,
        external: &[&str],
    ) -> Result<(), CommunityError> {
        for (m_id, met) in &organism.metabolites {
            let new_id = ns.rename(m_id);
            let mut new_met = Metabolite::new(
                &new_id,
                met.name.as_deref(),
                &ns.rename(&met.compartment),
            );
            new_met.metadata = met.metadata.clone();
            self.model.add_metabolite(new_met)?;
            self.metabolite_map
                .insert((ns.organism_id().to_string(), m_id.clone()), new_id);

            if !self.model.contains_metabolite(m_id) {
                if !external.contains(&met.compartment.as_str()) {
                    debug!(
                        "Pooling metabolite {} of organism {}, although it is not external",
                        m_id,
                        ns.organism_id()
                    );
                }
                let mut pooled =
                    Metabolite::new(m_id, met.name.as_deref(), EXTERNAL_COMPARTMENT);
                pooled.metadata = met.metadata.clone();
                self.model.add_metabolite(pooled)?;
                self.pooled.push(m_id.clone());
            }
        }
        Ok(())
    }

    fn merge_genes(&mut self, ns: Namespace, organism: &Model) -> Result<(), CommunityError> {
        for (g_id, gene) in &organism.genes {
            let mut new_gene = Gene::new(&ns.rename(g_id), gene.name.as_deref());
            new_gene.metadata = gene.metadata.clone();
            self.model.add_gene(new_gene)?;
        }
        Ok(())
    }

    /// Copy reactions under the namespace
    ///
    /// Exchange reactions become reversible transports from the organism's copy of their
    /// metabolite to the pooled one, keeping only their type and metadata. The organism's
    /// biomass reaction additionally produces community biomass.
    fn merge_reactions(&mut self, ns: Namespace, organism: &Model) -> Result<(), CommunityError> {
        for (r_id, rxn) in &organism.reactions {
            let mut new_rxn = match rxn.reaction_type {
                ReactionType::Exchange => {
                    let mut metabolites = rxn.stoichiometry.keys();
                    let m_id = match (metabolites.next(), metabolites.next()) {
                        (Some(m_id), None) => m_id,
                        _ => {
                            return Err(CommunityError::MalformedExchange {
                                organism: organism.id.clone(),
                                reaction: r_id.clone(),
                                terms: rxn.stoichiometry.len(),
                            })
                        }
                    };
                    let stoichiometry =
                        IndexMap::from([(m_id.clone(), 1.), (ns.rename(m_id), -1.)]);
                    ReactionBuilder::default()
                        .id(ns.rename(r_id) + TRANSPORT_SUFFIX)
                        .reversible(true)
                        .stoichiometry(stoichiometry)
                        .reaction_type(ReactionType::Exchange)
                        .build()?
                }
                ReactionType::Enzymatic
                | ReactionType::Transport
                | ReactionType::Sink
                | ReactionType::Other => {
                    let mut stoichiometry: IndexMap<String, f64> = rxn
                        .stoichiometry
                        .iter()
                        .map(|(m_id, coeff)| (ns.rename(m_id), *coeff))
                        .collect();
                    if organism.biomass_reaction.as_deref() == Some(r_id.as_str()) {
                        stoichiometry.insert(COMMUNITY_BIOMASS.to_string(), 1.);
                    }
                    ReactionBuilder::default()
                        .id(ns.rename(r_id))
                        .name(rxn.name.clone())
                        .reversible(rxn.reversible)
                        .stoichiometry(stoichiometry)
                        .lower_bound(rxn.lower_bound)
                        .upper_bound(rxn.upper_bound)
                        .reaction_type(rxn.reaction_type)
                        .gpr(rxn.gpr.as_ref().map(|gpr| ns.rename_gpr(gpr)))
                        .build()?
                }
            };
            new_rxn.metadata = rxn.metadata.clone();
            self.reaction_map
                .insert((ns.organism_id().to_string(), r_id.clone()), new_rxn.id.clone());
            self.model.add_reaction(new_rxn)?;
        }
        Ok(())
    }

    /// One exchange with the environment per pooled metabolite
    fn add_community_exchanges(&mut self) -> Result<(), CommunityError> {
        for m_id in &self.pooled {
            let stripped = m_id.strip_prefix(METABOLITE_PREFIX).unwrap_or(m_id);
            let exchange = ReactionBuilder::default()
                .id(format!("{}{}", EXCHANGE_PREFIX, stripped))
                .reversible(true)
                .stoichiometry(IndexMap::from([(m_id.clone(), -1.)]))
                .reaction_type(ReactionType::Exchange)
                .build()?;
            self.model.add_reaction(exchange)?;
        }
        Ok(())
    }

    fn finish(self) -> MergedCommunity {
        info!(
            "Merged community {}: {} compartments, {} metabolites ({} pooled), {} genes, {} reactions",
            self.model.id,
            self.model.compartments.len(),
            self.model.metabolites.len(),
            self.pooled.len(),
            self.model.genes.len(),
            self.model.reactions.len()
        );
        MergedCommunity {
            model: Arc::new(self.model),
            reaction_map: self.reaction_map,
            metabolite_map: self.metabolite_map,
        }
    }
}
