//! Per-organism renaming of entity ids
use crate::metabolic_model::gene::{GprAssociation, Protein};

/// Suffixes entity ids with an organism id, so that entities of different organisms can't
/// collide once merged into a single model
///
/// # Examples
/// ```rust
/// use consortia_core::community::namespace::Namespace;
/// let ns = Namespace::new("ecoli");
/// assert_eq!(ns.rename("glc__D_e"), "glc__D_e_ecoli");
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Namespace<'a> {
    organism_id: &'a str,
}

impl<'a> Namespace<'a> {
    pub fn new(organism_id: &'a str) -> Self {
        Namespace { organism_id }
    }

    pub fn organism_id(&self) -> &'a str {
        self.organism_id
    }

    /// Id of an organism-local entity in the merged model
    pub fn rename(&self, id: &str) -> String {
        format!("{}_{}", id, self.organism_id)
    }

    /// Rebuild a GPR association with renamed genes
    ///
    /// Gene order inside each protein and protein order are kept, metadata is copied.
    pub fn rename_gpr(&self, gpr: &GprAssociation) -> GprAssociation {
        let proteins = gpr
            .proteins
            .iter()
            .map(|protein| Protein {
                genes: protein.genes.iter().map(|g| self.rename(g)).collect(),
                metadata: protein.metadata.clone(),
            })
            .collect();
        GprAssociation {
            proteins,
            metadata: gpr.metadata.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_gpr_keeps_structure() {
        let mut gpr: GprAssociation = "(g1 and g2) or g3".parse().unwrap();
        gpr.metadata
            .insert("confidence".to_string(), "4".to_string());
        gpr.proteins[1]
            .metadata
            .insert("ec".to_string(), "2.7.1.11".to_string());

        let renamed = Namespace::new("org").rename_gpr(&gpr);
        assert_eq!(renamed.to_string(), "(g1_org and g2_org) or g3_org");
        assert_eq!(renamed.metadata, gpr.metadata);
        assert_eq!(renamed.proteins[1].metadata, gpr.proteins[1].metadata);
        // The original is left untouched
        assert_eq!(gpr.to_string(), "(g1 and g2) or g3");
    }
}
