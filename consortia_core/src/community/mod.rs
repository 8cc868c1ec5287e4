//! Module providing the Community struct, which combines several organism models into a single
//! community model.

use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, warn};
use thiserror::Error;

use crate::metabolic_model::model::{Model, ModelError};
use crate::metabolic_model::reaction::ReactionBuilderError;

pub mod merge;
pub mod namespace;

pub use merge::{merge_models, MergedCommunity, ProvenanceMap};

/// Id of the compartment shared by all organisms of the community
pub const EXTERNAL_COMPARTMENT: &str = "ext";
/// Id of the metabolite every organism's biomass reaction produces
pub const COMMUNITY_BIOMASS: &str = "community_biomass";
/// Id of the reaction consuming community biomass, the objective of the merged model
pub const COMMUNITY_GROWTH: &str = "community_growth";
/// Appended to the (renamed) id of an organism exchange reaction
pub const TRANSPORT_SUFFIX: &str = "_INT";
/// Prefix of the community exchange reactions
pub const EXCHANGE_PREFIX: &str = "R_EX_";
/// Metabolite id prefix dropped when naming community exchange reactions
pub const METABOLITE_PREFIX: &str = "M_";

/// A microbial community, made of uniquely identified organism models
///
/// The merged community model is built on first request and kept until the community is
/// invalidated, either explicitly with [`Community::invalidate`] or by editing an organism
/// through [`Community::organism_mut`]. Organism models are held behind an [`Arc`], so models
/// shared with the caller can't be changed behind the community's back.
///
/// # Examples
/// ```rust
/// use std::sync::Arc;
/// use consortia_core::community::Community;
/// use consortia_core::metabolic_model::model::Model;
/// let mut community = Community::new(
///     "consortium",
///     vec![Arc::new(Model::new("a")), Arc::new(Model::new("b"))],
///     false,
/// );
/// assert_eq!(community.size(), 2);
/// let merged = community.merged_model().unwrap();
/// assert!(merged.contains_reaction("community_growth"));
/// ```
#[derive(Clone, Debug)]
pub struct Community {
    /// Id of the community, also used as the id of the merged model
    pub id: String,
    organisms: IndexMap<String, Arc<Model>>,
    state: MergeState,
}

/// Whether the merged model has been built
#[derive(Clone, Debug)]
enum MergeState {
    Unbuilt,
    Built(MergedCommunity),
}

impl Community {
    /// Create a new community
    ///
    /// # Parameters
    /// - id: Id of the community
    /// - models: Organism models, only the first model with a given id is kept
    /// - copy_models: Whether to hold deep copies of the models instead of sharing them
    pub fn new(id: &str, models: Vec<Arc<Model>>, copy_models: bool) -> Community {
        let mut organisms: IndexMap<String, Arc<Model>> = IndexMap::new();
        for model in models {
            if organisms.contains_key(&model.id) {
                warn!(
                    "Model ids are not unique, repeated model {} will be discarded",
                    model.id
                );
                continue;
            }
            let model = if copy_models {
                Arc::new(Model::clone(&model))
            } else {
                model
            };
            organisms.insert(model.id.clone(), model);
        }
        Community {
            id: id.to_string(),
            organisms,
            state: MergeState::Unbuilt,
        }
    }

    /// Number of organisms in the community
    pub fn size(&self) -> usize {
        self.organisms.len()
    }

    /// Organism models, keyed by organism id
    pub fn organisms(&self) -> &IndexMap<String, Arc<Model>> {
        &self.organisms
    }

    pub fn organism(&self, id: &str) -> Option<&Arc<Model>> {
        self.organisms.get(id)
    }

    /// Mutable access to an organism model
    ///
    /// A model still shared with someone else is copied first. Any merged model built so far
    /// is discarded.
    pub fn organism_mut(&mut self, id: &str) -> Option<&mut Model> {
        if !self.organisms.contains_key(id) {
            return None;
        }
        self.invalidate();
        self.organisms.get_mut(id).map(Arc::make_mut)
    }

    /// The merged community model, built on first call
    ///
    /// Later calls return the same model until the community is invalidated. If merging
    /// fails nothing is kept, so a later call tries again.
    pub fn merged_model(&mut self) -> Result<Arc<Model>, CommunityError> {
        if let MergeState::Built(ref merged) = self.state {
            return Ok(Arc::clone(&merged.model));
        }
        let merged = merge_models(&self.id, self.organisms.values().map(|m| &**m))?;
        let model = Arc::clone(&merged.model);
        self.state = MergeState::Built(merged);
        Ok(model)
    }

    /// Map of (organism id, organism reaction id) to merged reaction id, None until merged
    pub fn reaction_map(&self) -> Option<&ProvenanceMap> {
        match self.state {
            MergeState::Built(ref merged) => Some(&merged.reaction_map),
            MergeState::Unbuilt => None,
        }
    }

    /// Map of (organism id, organism metabolite id) to merged metabolite id, None until merged
    pub fn metabolite_map(&self) -> Option<&ProvenanceMap> {
        match self.state {
            MergeState::Built(ref merged) => Some(&merged.metabolite_map),
            MergeState::Unbuilt => None,
        }
    }

    pub fn is_merged(&self) -> bool {
        matches!(self.state, MergeState::Built(_))
    }

    /// Drop the merged model, the next request rebuilds it
    pub fn invalidate(&mut self) {
        if self.is_merged() {
            debug!("Discarding merged model of community {}", self.id);
        }
        self.state = MergeState::Unbuilt;
    }
}

#[derive(Debug, Error)]
pub enum CommunityError {
    #[error("Exchange reaction {reaction} of organism {organism} has {terms} metabolites instead of one")]
    MalformedExchange {
        organism: String,
        reaction: String,
        terms: usize,
    },
    #[error("Inconsistent community model: {0}")]
    Model(#[from] ModelError),
    #[error("Unable to build reaction")]
    UnableToBuildReaction(#[from] ReactionBuilderError),
}
