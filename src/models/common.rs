use serde::{Deserialize, Serialize};

use super::image::{FilterChoice, Resolution};

/// Resolution label with its pixel hint, as listed to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolutionInfo {
    pub label: String,
    pub width: u32,
    pub height: u32,
}

impl From<Resolution> for ResolutionInfo {
    fn from(resolution: Resolution) -> Self {
        let (width, height) = resolution.dimensions();
        Self {
            label: resolution.as_str().to_string(),
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationOptions {
    pub resolutions: Vec<ResolutionInfo>,
    pub filters: Vec<String>,
}

impl GenerationOptions {
    pub fn available() -> Self {
        Self {
            resolutions: Resolution::ALL.into_iter().map(ResolutionInfo::from).collect(),
            filters: FilterChoice::ALL
                .iter()
                .map(|f| f.as_str().to_string())
                .collect(),
        }
    }
}
