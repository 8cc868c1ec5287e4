//! This module provides the Gene struct, representing a gene, and the GprAssociation struct,
//! representing a gene protein reaction rule in disjunctive normal form
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use super::Metadata;
use crate::io::gpr_parse::{parse_gpr, GprParseError};

/// Structure Representing a Gene
#[derive(Builder, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    /// Used to identify the gene
    pub id: String,
    /// Human Readable Gene Name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Gene Annotations
    #[builder(default = "Metadata::new()")]
    #[serde(default)]
    pub metadata: Metadata,
}

impl Gene {
    pub fn new(id: &str, name: Option<&str>) -> Gene {
        Gene {
            id: id.to_string(),
            name: name.map(str::to_string),
            metadata: Metadata::new(),
        }
    }
}

impl Display for Gene {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// A protein (or protein complex), active only if all of its genes are present
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Protein {
    /// Ids of the genes encoding the protein, combined with AND
    pub genes: Vec<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Protein {
    pub fn new(genes: Vec<String>) -> Protein {
        Protein {
            genes,
            metadata: Metadata::new(),
        }
    }
}

impl Display for Protein {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.genes.join(" and "))
    }
}

/// Gene Protein Reaction association
///
/// Each protein is an alternative able to catalyse the reaction (isozymes are combined with
/// OR), so the rule is always held in disjunctive normal form.
///
/// # Examples
/// ```rust
/// use consortia_core::metabolic_model::gene::GprAssociation;
/// let gpr: GprAssociation = "(b0001 and b0002) or b0003".parse().unwrap();
/// assert_eq!(gpr.proteins.len(), 2);
/// assert_eq!(gpr.to_string(), "(b0001 and b0002) or b0003");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GprAssociation {
    /// Alternative proteins, combined with OR
    pub proteins: Vec<Protein>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl GprAssociation {
    pub fn new(proteins: Vec<Protein>) -> GprAssociation {
        GprAssociation {
            proteins,
            metadata: Metadata::new(),
        }
    }

    /// Ids of all genes referenced by the association, in first-seen order
    pub fn genes(&self) -> Vec<&str> {
        let mut genes: Vec<&str> = Vec::new();
        for gene in self.proteins.iter().flat_map(|p| p.genes.iter()) {
            if !genes.contains(&gene.as_str()) {
                genes.push(gene);
            }
        }
        genes
    }
}

impl Display for GprAssociation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.proteins.len() == 1 {
            return write!(f, "{}", self.proteins[0]);
        }
        let rule = self
            .proteins
            .iter()
            .map(|p| {
                if p.genes.len() > 1 {
                    format!("({})", p)
                } else {
                    p.to_string()
                }
            })
            .collect::<Vec<String>>()
            .join(" or ");
        write!(f, "{}", rule)
    }
}

impl FromStr for GprAssociation {
    type Err = GprParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_gpr(s)?.ok_or(GprParseError::EmptyRule)
    }
}
