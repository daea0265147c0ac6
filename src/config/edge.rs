use crate::edges::GradientOptions;
use crate::preprocess::PreprocessOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration of the `edge_map` tool.
#[derive(Debug, Deserialize)]
pub struct EdgeToolConfig {
    pub input: PathBuf,
    #[serde(default)]
    pub preprocess: PreprocessOptions,
    #[serde(default)]
    pub gradient: GradientOptions,
    pub output: EdgeOutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct EdgeOutputConfig {
    #[serde(rename = "magnitude_image")]
    pub magnitude_image: PathBuf,
    #[serde(rename = "edges_image")]
    pub edges_image: PathBuf,
    #[serde(rename = "edges_json")]
    pub edges_json: PathBuf,
}

pub fn load_config(path: &Path) -> Result<EdgeToolConfig, String> {
    super::load_json(path)
}
