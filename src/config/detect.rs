use crate::detector::DetectorParams;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration of the `detect_text` tool.
#[derive(Debug, Deserialize)]
pub struct DetectToolConfig {
    pub input: PathBuf,
    #[serde(default)]
    pub params: DetectorParams,
    pub output: DetectOutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct DetectOutputConfig {
    /// Full [`DetectionReport`](crate::DetectionReport) as JSON.
    #[serde(rename = "report_json")]
    pub report_json: PathBuf,
    /// Normalized stroke-width map.
    #[serde(default, rename = "stroke_width_image")]
    pub stroke_width_image: Option<PathBuf>,
    /// Binary mask of pixels belonging to valid components.
    #[serde(default, rename = "component_mask_image")]
    pub component_mask_image: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<DetectToolConfig, String> {
    super::load_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_document() {
        let json = r#"{
            "input": "page.png",
            "params": { "swt": { "rayLength": 32 } },
            "output": { "report_json": "out/report.json" }
        }"#;
        let config: DetectToolConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.input, PathBuf::from("page.png"));
        assert_eq!(config.params.swt.ray_length, 32);
        assert!(config.output.stroke_width_image.is_none());
    }
}
