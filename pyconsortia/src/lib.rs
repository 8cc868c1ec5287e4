use std::collections::HashMap;
use std::sync::Arc;

use consortia_core::community::{Community, CommunityError, ProvenanceMap};
use consortia_core::io::json::JsonError;
use consortia_core::metabolic_model::model::Model;

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;

fn community_error(err: CommunityError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn json_error(err: JsonError) -> PyErr {
    match err {
        JsonError::Io(e) => PyIOError::new_err(e.to_string()),
        other => PyValueError::new_err(other.to_string()),
    }
}

fn to_dict(map: Option<&ProvenanceMap>) -> HashMap<(String, String), String> {
    map.map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default()
}

/// A microbial community built from organism models in COBRA JSON format
#[pyclass(name = "Community")]
struct PyCommunity {
    inner: Community,
}

#[pymethods]
impl PyCommunity {
    #[new]
    #[pyo3(signature = (community_id, paths, copy_models=false))]
    fn new(community_id: String, paths: Vec<String>, copy_models: bool) -> PyResult<Self> {
        let models = paths
            .iter()
            .map(|path| Model::read_json(path).map(Arc::new))
            .collect::<Result<Vec<Arc<Model>>, JsonError>>()
            .map_err(json_error)?;
        Ok(PyCommunity {
            inner: Community::new(&community_id, models, copy_models),
        })
    }

    #[getter]
    fn id(&self) -> String {
        self.inner.id.clone()
    }

    fn size(&self) -> usize {
        self.inner.size()
    }

    fn organism_ids(&self) -> Vec<String> {
        self.inner.organisms().keys().cloned().collect()
    }

    /// The merged community model, as a COBRA JSON string
    fn merged_model_json(&mut self) -> PyResult<String> {
        let merged = self.inner.merged_model().map_err(community_error)?;
        merged.to_json_string().map_err(json_error)
    }

    fn write_merged_model(&mut self, path: String) -> PyResult<()> {
        let merged = self.inner.merged_model().map_err(community_error)?;
        merged.write_json(path).map_err(json_error)
    }

    /// {(organism id, reaction id): merged reaction id}
    fn reaction_map(&mut self) -> PyResult<HashMap<(String, String), String>> {
        self.inner.merged_model().map_err(community_error)?;
        Ok(to_dict(self.inner.reaction_map()))
    }

    /// {(organism id, metabolite id): merged metabolite id}
    fn metabolite_map(&mut self) -> PyResult<HashMap<(String, String), String>> {
        self.inner.merged_model().map_err(community_error)?;
        Ok(to_dict(self.inner.metabolite_map()))
    }

    fn invalidate(&mut self) {
        self.inner.invalidate()
    }
}

/// A Python module implemented in Rust. The name of this function must match
/// the `lib.name` setting in the `Cargo.toml`, else Python will not be able to
/// import the module.
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyCommunity>()?;
    Ok(())
}
