use serde::Deserialize;

/// Sobel operator size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum SobelKernel {
    #[default]
    #[serde(alias = "sobel3")]
    Sobel3,
    #[serde(alias = "sobel5")]
    Sobel5,
}

/// Gradient stage parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GradientOptions {
    pub kernel: SobelKernel,
}
