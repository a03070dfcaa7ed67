use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{IoContext, Result, SdkUtilError};
use crate::types::{ReplacementSet, Value};
use crate::uri::format_path;
use crate::xml::escape;

/// A request file: URI templates to format and texts to escape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Batch {
    #[serde(default)]
    pub paths: Vec<PathRequest>,
    #[serde(default)]
    pub texts: Vec<TextRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathRequest {
    pub template: String,
    #[serde(default)]
    pub values: Option<Vec<Value>>,
    #[serde(default)]
    pub named: Option<HashMap<String, Value>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutput {
    pub paths: Vec<String>,
    pub texts: Vec<String>,
}

impl PathRequest {
    pub fn replacement_set(&self, index: usize) -> Result<ReplacementSet> {
        match (&self.values, &self.named) {
            (Some(_), Some(_)) => Err(SdkUtilError::BatchEntry {
                index,
                message: "use either `values` or `named`, not both".to_string(),
            }),
            (Some(values), None) => Ok(ReplacementSet::Positional(
                values.iter().cloned().map(Some).collect(),
            )),
            (None, Some(named)) => Ok(ReplacementSet::Named(
                named
                    .iter()
                    .map(|(key, value)| (key.clone(), Some(value.clone())))
                    .collect(),
            )),
            (None, None) => Ok(ReplacementSet::default()),
        }
    }
}

impl Batch {
    pub fn render(&self) -> Result<BatchOutput> {
        let paths = self
            .paths
            .iter()
            .enumerate()
            .map(|(index, request)| {
                let values = request.replacement_set(index)?;
                format_path(&request.template, &values)
            })
            .collect::<Result<Vec<_>>>()?;

        let texts = self
            .texts
            .iter()
            .map(|request| escape(&request.text))
            .collect();

        Ok(BatchOutput { paths, texts })
    }
}

pub fn parse_batch(content: &str, path: &Path) -> Result<Batch> {
    toml::from_str(content).map_err(|error| SdkUtilError::TomlParse {
        path: path.to_path_buf(),
        message: error.to_string(),
    })
}

pub fn load_batch(path: &Path) -> Result<Batch> {
    if !path.exists() {
        return Err(SdkUtilError::BatchNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path).io_context("reading request file", path)?;
    parse_batch(&content, path)
}
