//! Module providing JSON IO for Models, in the COBRA JSON layout
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::configuration::CONFIGURATION;
use crate::io::gpr_parse::{parse_gpr, GprParseError};
use crate::metabolic_model::compartment::Compartment;
use crate::metabolic_model::gene::Gene;
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::model::{Model, ModelError};
use crate::metabolic_model::reaction::{ReactionBuilder, ReactionBuilderError, ReactionType};
use crate::metabolic_model::Metadata;

// Metadata keys used for the JSON fields that have no dedicated entity attribute
const NOTES: &str = "notes";
const ANNOTATION: &str = "annotation";
const SUBSYSTEM: &str = "subsystem";
const FORMULA: &str = "FORMULA";
const CHARGE: &str = "CHARGE";

// region JSON Model
/// Represents a JSON serialized model, used for reading and writing models in json format
#[derive(Serialize, Deserialize)]
struct JsonModel {
    #[serde(default)]
    id: String,
    #[serde(default)]
    compartments: IndexMap<String, String>,
    metabolites: Vec<JsonMetabolite>,
    reactions: Vec<JsonReaction>,
    #[serde(default)]
    genes: Vec<JsonGene>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    biomass_reaction: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct JsonMetabolite {
    id: String,
    name: Option<String>,
    compartment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    charge: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    annotation: Option<Value>,
}

#[derive(Serialize, Deserialize)]
struct JsonReaction {
    id: String,
    name: Option<String>,
    metabolites: IndexMap<String, f64>,
    lower_bound: f64,
    upper_bound: f64,
    #[serde(default)]
    gene_reaction_rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    objective_coefficient: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subsystem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    annotation: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reversible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reaction_type: Option<ReactionType>,
}

#[derive(Serialize, Deserialize)]
struct JsonGene {
    id: String,
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    annotation: Option<Value>,
}
// endregion JSON Model

// region Conversions
/* Notes and annotations are not structured enough to be worth unpacking, so they are kept
as JSON strings in the metadata and parsed back when written out.
 */
fn store_value(metadata: &mut Metadata, key: &str, value: Option<Value>) {
    if let Some(v) = value {
        metadata.insert(key.to_string(), v.to_string());
    }
}

fn load_value(metadata: &Metadata, key: &str) -> Option<Value> {
    metadata
        .get(key)
        .map(|v| serde_json::from_str(v).unwrap_or_else(|_| Value::String(v.clone())))
}

fn finite_bound(bound: f64, export_bound: f64) -> f64 {
    if bound.is_infinite() {
        export_bound.copysign(bound)
    } else {
        bound
    }
}

impl From<JsonGene> for Gene {
    fn from(g: JsonGene) -> Self {
        let mut metadata = Metadata::new();
        store_value(&mut metadata, NOTES, g.notes);
        store_value(&mut metadata, ANNOTATION, g.annotation);
        Self {
            id: g.id,
            name: g.name,
            metadata,
        }
    }
}

impl From<JsonMetabolite> for Metabolite {
    fn from(m: JsonMetabolite) -> Self {
        let mut metadata = Metadata::new();
        if let Some(formula) = m.formula {
            metadata.insert(FORMULA.to_string(), formula);
        }
        if let Some(charge) = m.charge {
            metadata.insert(CHARGE.to_string(), charge.to_string());
        }
        store_value(&mut metadata, NOTES, m.notes);
        store_value(&mut metadata, ANNOTATION, m.annotation);
        Self {
            id: m.id,
            name: m.name,
            compartment: m.compartment,
            metadata,
        }
    }
}

impl From<&Gene> for JsonGene {
    fn from(g: &Gene) -> Self {
        Self {
            id: g.id.clone(),
            name: g.name.clone(),
            notes: load_value(&g.metadata, NOTES),
            annotation: load_value(&g.metadata, ANNOTATION),
        }
    }
}

impl From<&Metabolite> for JsonMetabolite {
    fn from(m: &Metabolite) -> Self {
        Self {
            id: m.id.clone(),
            name: m.name.clone(),
            compartment: m.compartment.clone(),
            charge: m.metadata.get(CHARGE).and_then(|c| c.parse().ok()),
            formula: m.metadata.get(FORMULA).cloned(),
            notes: load_value(&m.metadata, NOTES),
            annotation: load_value(&m.metadata, ANNOTATION),
        }
    }
}

/// Id of the biomass reaction of a JSON model
///
/// The explicit `biomass_reaction` field, otherwise the first reaction with a non-zero
/// objective coefficient, otherwise the first reaction whose id mentions biomass. Mirrors
/// [`Model::detect_biomass_reaction`], but runs before any reaction is built.
fn json_biomass_reaction(json_model: &JsonModel) -> Option<&str> {
    if let Some(ref r_id) = json_model.biomass_reaction {
        return Some(r_id.as_str());
    }
    json_model
        .reactions
        .iter()
        .find(|r| r.objective_coefficient.is_some_and(|c| c != 0.))
        .or_else(|| {
            json_model
                .reactions
                .iter()
                .find(|r| r.id.to_lowercase().contains("biomass"))
        })
        .map(|r| r.id.as_str())
}

/// Classify a reaction that does not state its type
///
/// Single metabolite reactions are boundary reactions: sinks and demands when named so,
/// exchanges otherwise. The biomass reaction and objective reactions are never boundary
/// reactions, whatever their shape.
fn infer_reaction_type(rxn: &JsonReaction, biomass: Option<&str>) -> ReactionType {
    if rxn.metabolites.len() != 1
        || rxn.objective_coefficient.is_some_and(|c| c != 0.)
        || biomass == Some(rxn.id.as_str())
    {
        return ReactionType::Other;
    }
    let id = rxn.id.trim_start_matches("R_");
    if id.starts_with("DM_") || id.starts_with("SK_") {
        ReactionType::Sink
    } else {
        ReactionType::Exchange
    }
}

impl Model {
    /// Read a model from a COBRA JSON file
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Model, JsonError> {
        let model_str = fs::read_to_string(path)?;
        Model::from_json_str(&model_str)
    }

    /// Parse a model from a COBRA JSON string
    ///
    /// Reactions with a single metabolite are treated as exchanges unless a `reaction_type`
    /// says otherwise or they are the biomass or an objective reaction, and the compartments
    /// their metabolites live in are flagged as external. Without an explicit
    /// `biomass_reaction`, the biomass reaction is detected with
    /// [`Model::detect_biomass_reaction`].
    ///
    /// The format only stores compartment names, so compartment metadata is not read, and is
    /// lost when writing.
    pub fn from_json_str(data: &str) -> Result<Model, JsonError> {
        let json_model = serde_json::from_str::<JsonModel>(data)?;
        Model::from_json(json_model)
    }

    /// Write the model to a COBRA JSON file
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), JsonError> {
        let model_string = self.to_json_string()?;
        fs::write(path, model_string)?;
        Ok(())
    }

    /// Serialize the model to a COBRA JSON string
    pub fn to_json_string(&self) -> Result<String, JsonError> {
        Ok(serde_json::to_string(&self.to_json())?)
    }

    fn from_json(json_model: JsonModel) -> Result<Self, JsonError> {
        let mut model = Model::new(&json_model.id);

        let biomass = json_biomass_reaction(&json_model);
        let reaction_types: Vec<ReactionType> = json_model
            .reactions
            .iter()
            .map(|r| r.reaction_type.unwrap_or_else(|| infer_reaction_type(r, biomass)))
            .collect();
        let metabolite_compartments: IndexMap<&str, &str> = json_model
            .metabolites
            .iter()
            .map(|m| (m.id.as_str(), m.compartment.as_str()))
            .collect();
        let mut external: Vec<&str> = Vec::new();
        for (rxn, rxn_type) in json_model.reactions.iter().zip(&reaction_types) {
            // Exchanges between two compartments don't tell which one faces the outside
            if *rxn_type != ReactionType::Exchange || rxn.metabolites.len() != 1 {
                continue;
            }
            for m_id in rxn.metabolites.keys() {
                if let Some(c_id) = metabolite_compartments.get(m_id.as_str()) {
                    external.push(*c_id);
                }
            }
        }

        // Compartments only referenced by metabolites still need to exist
        let mut compartments = json_model.compartments.clone();
        for c_id in metabolite_compartments.values() {
            if !compartments.contains_key(*c_id) {
                compartments.insert(c_id.to_string(), String::new());
            }
        }
        for (c_id, name) in compartments {
            let name = Some(name).filter(|n| !n.is_empty());
            let is_external = external.contains(&c_id.as_str());
            model.add_compartment(Compartment {
                id: c_id,
                name,
                external: is_external,
                metadata: Metadata::new(),
            })?;
        }

        json_model
            .metabolites
            .into_iter()
            .try_for_each(|m| model.add_metabolite(Metabolite::from(m)))?;
        json_model
            .genes
            .into_iter()
            .try_for_each(|g| model.add_gene(Gene::from(g)))?;

        for (rxn, rxn_type) in json_model.reactions.into_iter().zip(reaction_types) {
            let gpr = parse_gpr(&rxn.gene_reaction_rule)?;
            if let Some(ref association) = gpr {
                // Genes only mentioned in a rule are added on the fly
                for g_id in association.genes() {
                    if !model.contains_gene(g_id) {
                        model.add_gene(Gene::new(g_id, None))?;
                    }
                }
            }
            let mut metadata = Metadata::new();
            if let Some(subsystem) = rxn.subsystem {
                metadata.insert(SUBSYSTEM.to_string(), subsystem);
            }
            store_value(&mut metadata, NOTES, rxn.notes);
            store_value(&mut metadata, ANNOTATION, rxn.annotation);
            let new_reaction = ReactionBuilder::default()
                .id(rxn.id)
                .name(rxn.name)
                .reversible(rxn.reversible.unwrap_or(rxn.lower_bound < 0.))
                .stoichiometry(rxn.metabolites)
                .lower_bound(rxn.lower_bound)
                .upper_bound(rxn.upper_bound)
                .objective(rxn.objective_coefficient.unwrap_or(0.))
                .reaction_type(rxn_type)
                .gpr(gpr)
                .metadata(metadata)
                .build()?;
            model.add_reaction(new_reaction)?;
        }

        match json_model.biomass_reaction {
            Some(r_id) => model.set_biomass_reaction(&r_id)?,
            None => {
                model.biomass_reaction = model.detect_biomass_reaction().map(str::to_string)
            }
        }
        Ok(model)
    }

    fn to_json(&self) -> JsonModel {
        let export_bound = CONFIGURATION.read().unwrap().export_bound;
        let json_reactions = self
            .reactions
            .values()
            .map(|r| JsonReaction {
                id: r.id.clone(),
                name: r.name.clone(),
                metabolites: r.stoichiometry.clone(),
                lower_bound: finite_bound(r.lower_bound, export_bound),
                upper_bound: finite_bound(r.upper_bound, export_bound),
                gene_reaction_rule: r
                    .gpr
                    .as_ref()
                    .map(|rule| rule.to_string())
                    .unwrap_or_default(),
                objective_coefficient: Some(r.objective).filter(|c| *c != 0.),
                subsystem: r.metadata.get(SUBSYSTEM).cloned(),
                notes: load_value(&r.metadata, NOTES),
                annotation: load_value(&r.metadata, ANNOTATION),
                reversible: Some(r.reversible),
                reaction_type: Some(r.reaction_type),
            })
            .collect();

        JsonModel {
            id: self.id.clone(),
            compartments: self
                .compartments
                .values()
                .map(|c| (c.id.clone(), c.name.clone().unwrap_or_default()))
                .collect(),
            metabolites: self.metabolites.values().map(JsonMetabolite::from).collect(),
            reactions: json_reactions,
            genes: self.genes.values().map(JsonGene::from).collect(),
            biomass_reaction: self.biomass_reaction.clone(),
        }
    }
}

#[derive(Error, Debug)]
pub enum JsonError {
    #[error("Unable to parse a GPR rule during conversion from JSON")]
    GprParserError(#[from] GprParseError),
    #[error("Unable to build reaction")]
    UnableToBuildReaction(#[from] ReactionBuilderError),
    #[error("Inconsistent model: {0}")]
    InvalidModel(#[from] ModelError),
    #[error("Serde json parse error")]
    SerdeJsonParseError(#[from] serde_json::Error),
    #[error("Unable to read or write file")]
    Io(#[from] std::io::Error),
}

// endregion Conversions

#[cfg(test)]
mod json_tests {
    use super::*;

    const TOY_MODEL: &str = r#"{
"id": "toy",
"compartments": {"c": "cytosol", "e": "extracellular space"},
"metabolites": [
    {"id": "glc__D_e", "name": "D-Glucose", "compartment": "e", "charge": 0,
     "formula": "C6H12O6", "annotation": {"kegg.compound": ["C00031"]}},
    {"id": "glc__D_c", "name": "D-Glucose", "compartment": "c"},
    {"id": "atp_c", "name": "ATP", "compartment": "c"}
],
"reactions": [
    {"id": "EX_glc__D_e", "name": "D-Glucose exchange", "metabolites": {"glc__D_e": -1.0},
     "lower_bound": -10.0, "upper_bound": 1000.0, "gene_reaction_rule": ""},
    {"id": "GLCpts", "name": "D-glucose transport via PEP:Pyr PTS",
     "metabolites": {"glc__D_e": -1.0, "glc__D_c": 1.0},
     "lower_bound": 0.0, "upper_bound": 1000.0,
     "gene_reaction_rule": "(b2417 and b1101) or b1817", "subsystem": "Transport"},
    {"id": "DM_atp_c", "metabolites": {"atp_c": -1.0},
     "lower_bound": 0.0, "upper_bound": 1000.0, "gene_reaction_rule": ""},
    {"id": "Growth", "metabolites": {"glc__D_c": -1.0, "atp_c": -1.0},
     "lower_bound": 0.0, "upper_bound": 1000.0, "gene_reaction_rule": "",
     "objective_coefficient": 1.0}
],
"genes": [{"id": "b2417", "name": "crr"}]
}"#;

    #[test]
    fn json_metabolite() {
        let data = r#"{"id":"glc__D_e","name":"D-Glucose","compartment":"e","charge":0,
"formula":"C6H12O6","notes":{"original_bigg_ids":["glc_D_e"]}}"#;
        let met: JsonMetabolite = serde_json::from_str(data).unwrap();
        let model_met = Metabolite::from(met);
        assert_eq!(model_met.id, "glc__D_e");
        assert_eq!(model_met.name.unwrap(), "D-Glucose");
        assert_eq!(model_met.compartment, "e");
        assert_eq!(model_met.metadata.get(FORMULA).unwrap(), "C6H12O6");
        assert_eq!(model_met.metadata.get(CHARGE).unwrap(), "0");
        assert_eq!(
            model_met.metadata.get(NOTES).unwrap(),
            r#"{"original_bigg_ids":["glc_D_e"]}"#
        );
    }

    #[test]
    fn json_conversion() {
        let model = Model::from_json_str(TOY_MODEL).unwrap();
        assert_eq!(model.id, "toy");
        assert_eq!(model.external_compartments(), vec!["e"]);

        let exchange = model.get_reaction("EX_glc__D_e").unwrap();
        assert_eq!(exchange.reaction_type, ReactionType::Exchange);
        assert!(exchange.reversible);
        assert_eq!(
            model.get_reaction("DM_atp_c").unwrap().reaction_type,
            ReactionType::Sink
        );

        let transport = model.get_reaction("GLCpts").unwrap();
        assert!(!transport.reversible);
        assert_eq!(transport.reaction_type, ReactionType::Other);
        assert_eq!(
            transport.gpr.as_ref().unwrap().to_string(),
            "(b2417 and b1101) or b1817"
        );
        assert_eq!(transport.metadata.get(SUBSYSTEM).unwrap(), "Transport");

        // Genes only mentioned in rules are created
        assert_eq!(model.genes.len(), 3);
        assert_eq!(model.get_gene("b2417").unwrap().name.as_deref(), Some("crr"));

        assert_eq!(model.biomass_reaction.as_deref(), Some("Growth"));
        assert_eq!(model.objective().get("Growth"), Some(&1.));
    }

    #[test]
    fn explicit_fields_win() {
        let data = r#"{
"id": "toy",
"metabolites": [{"id": "o2_e", "name": "O2", "compartment": "e"}],
"reactions": [
    {"id": "O2t", "metabolites": {"o2_e": -1.0}, "lower_bound": -1000.0,
     "upper_bound": 1000.0, "reaction_type": "transport", "reversible": false}
],
"biomass_reaction": "O2t"
}"#;
        let model = Model::from_json_str(data).unwrap();
        let rxn = model.get_reaction("O2t").unwrap();
        assert_eq!(rxn.reaction_type, ReactionType::Transport);
        assert!(!rxn.reversible);
        // Compartment not listed in the compartments map, and not external
        assert!(!model.get_compartment("e").unwrap().external);
        assert_eq!(model.biomass_reaction.as_deref(), Some("O2t"));
    }

    #[test]
    fn invalid_models() {
        let unknown_metabolite = r#"{"id": "bad", "metabolites": [],
"reactions": [{"id": "R1", "metabolites": {"x": -1.0}, "lower_bound": 0.0, "upper_bound": 1.0}]}"#;
        assert!(matches!(
            Model::from_json_str(unknown_metabolite),
            Err(JsonError::InvalidModel(ModelError::UnknownMetabolite { .. }))
        ));
        let bad_rule = r#"{"id": "bad", "metabolites": [],
"reactions": [{"id": "R1", "metabolites": {}, "lower_bound": 0.0, "upper_bound": 1.0,
"gene_reaction_rule": "b1 and (b2"}]}"#;
        assert!(matches!(
            Model::from_json_str(bad_rule),
            Err(JsonError::GprParserError(_))
        ));
        assert!(matches!(
            Model::from_json_str("{"),
            Err(JsonError::SerdeJsonParseError(_))
        ));
    }

    #[test]
    fn single_term_growth_is_not_an_exchange() {
        let data = r#"{
"id": "acetate",
"compartments": {"c": "cytosol", "e": "extracellular"},
"metabolites": [{"id": "ac_e", "compartment": "e"}, {"id": "ac_c", "compartment": "c"}],
"reactions": [
    {"id": "EX_ac_e", "metabolites": {"ac_e": -1.0}, "lower_bound": 0.0, "upper_bound": 1000.0},
    {"id": "Growth", "metabolites": {"ac_c": -1.0}, "lower_bound": 0.0, "upper_bound": 1000.0,
     "objective_coefficient": 1.0}
]
}"#;
        let model = Model::from_json_str(data).unwrap();
        assert_eq!(model.biomass_reaction.as_deref(), Some("Growth"));
        assert_eq!(
            model.get_reaction("Growth").unwrap().reaction_type,
            ReactionType::Other
        );
        assert_eq!(
            model.get_reaction("EX_ac_e").unwrap().reaction_type,
            ReactionType::Exchange
        );
        assert_eq!(model.external_compartments(), vec!["e"]);
    }

    #[test]
    fn named_biomass_reaction_is_not_an_exchange() {
        let data = r#"{
"id": "named",
"metabolites": [{"id": "ac_e", "compartment": "e"}, {"id": "ac_c", "compartment": "c"}],
"reactions": [
    {"id": "EX_ac_e", "metabolites": {"ac_e": -1.0}, "lower_bound": 0.0, "upper_bound": 1000.0},
    {"id": "R_Biomass", "metabolites": {"ac_c": -1.0}, "lower_bound": 0.0, "upper_bound": 1000.0}
]
}"#;
        let model = Model::from_json_str(data).unwrap();
        assert_eq!(model.biomass_reaction.as_deref(), Some("R_Biomass"));
        assert_eq!(
            model.get_reaction("R_Biomass").unwrap().reaction_type,
            ReactionType::Other
        );
        assert_eq!(model.external_compartments(), vec!["e"]);
    }

    #[test]
    fn compartment_metadata_is_not_stored() {
        let mut model = Model::from_json_str(TOY_MODEL).unwrap();
        model
            .compartments
            .get_mut("c")
            .unwrap()
            .metadata
            .insert("sbo".to_string(), "SBO:0000290".to_string());
        let reread = Model::from_json_str(&model.to_json_string().unwrap()).unwrap();
        let compartment = reread.get_compartment("c").unwrap();
        assert_eq!(compartment.name.as_deref(), Some("cytosol"));
        assert!(compartment.metadata.is_empty());
    }

    #[test]
    fn round_trip() {
        let mut model = Model::from_json_str(TOY_MODEL).unwrap();
        model.reactions.get_mut("GLCpts").unwrap().upper_bound = f64::INFINITY;
        let json = model.to_json_string().unwrap();
        let reread = Model::from_json_str(&json).unwrap();
        assert_eq!(reread.get_reaction("GLCpts").unwrap().upper_bound, 1000.);
        assert_eq!(reread.metabolites, model.metabolites);
        assert_eq!(reread.genes, model.genes);
        assert_eq!(reread.compartments, model.compartments);
        assert_eq!(reread.biomass_reaction, model.biomass_reaction);
        assert_eq!(
            reread.get_reaction("GLCpts").unwrap().gpr,
            model.get_reaction("GLCpts").unwrap().gpr
        );
    }
}
