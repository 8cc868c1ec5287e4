//! Module providing the Model struct for representing a metabolic model, along with the
//! compartments, metabolites, genes and reactions it is made of.

use indexmap::IndexMap;

pub mod compartment;
pub mod gene;
pub mod metabolite;
pub mod model;
pub mod reaction;

/// Free-form key/value annotations attached to model entities
///
/// Nothing in this crate interprets the contents, they are only copied along.
pub type Metadata = IndexMap<String, String>;
