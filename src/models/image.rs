use serde::{Deserialize, Serialize};
use std::fmt;

/// Named size label offered to users. The mapped pixel size is a hint only and
/// is never sent to the inference API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Resolution {
    Small,
    #[default]
    Medium,
    Large,
}

impl Resolution {
    pub const ALL: [Resolution; 3] = [Resolution::Small, Resolution::Medium, Resolution::Large];

    /// Unrecognised labels fall back to `Medium`.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Small" => Resolution::Small,
            "Large" => Resolution::Large,
            _ => Resolution::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Small => "Small",
            Resolution::Medium => "Medium",
            Resolution::Large => "Large",
        }
    }

    /// (width, height) in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Resolution::Small => (256, 256),
            Resolution::Medium => (512, 512),
            Resolution::Large => (1024, 1024),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterChoice {
    #[default]
    None,
    Blur,
    Sharpen,
    Grayscale,
}

impl FilterChoice {
    pub const ALL: [FilterChoice; 4] = [
        FilterChoice::None,
        FilterChoice::Blur,
        FilterChoice::Sharpen,
        FilterChoice::Grayscale,
    ];

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "None" => Some(FilterChoice::None),
            "Blur" => Some(FilterChoice::Blur),
            "Sharpen" => Some(FilterChoice::Sharpen),
            "Grayscale" => Some(FilterChoice::Grayscale),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterChoice::None => "None",
            FilterChoice::Blur => "Blur",
            FilterChoice::Sharpen => "Sharpen",
            FilterChoice::Grayscale => "Grayscale",
        }
    }
}

impl fmt::Display for FilterChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenerationRequest {
    pub prompt: String,
    pub resolution: Resolution,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, resolution: Resolution) -> Self {
        Self {
            prompt: prompt.into(),
            resolution,
        }
    }
}

/// JSON body the inference API sends instead of an image.
#[derive(Debug, Clone, Deserialize)]
pub struct InferenceErrorBody {
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    /// Informational only; whatever shape it arrives in never affects retrying.
    #[serde(default)]
    pub estimated_time: Option<serde_json::Value>,
}

impl InferenceErrorBody {
    /// The error text, rendering non-string values as JSON.
    pub fn error_text(&self) -> Option<String> {
        self.error.as_ref().map(|value| match value {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        })
    }

    /// Seconds the API expects the model to need, 0 when absent or unreadable.
    pub fn estimated_secs(&self) -> f64 {
        self.estimated_time
            .as_ref()
            .and_then(|value| match value {
                serde_json::Value::String(text) => text.trim().parse().ok(),
                other => other.as_f64(),
            })
            .unwrap_or(0.0)
    }

    pub fn is_loading(&self) -> bool {
        self.error_text()
            .map_or(false, |text| text.contains("loading"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolution_hints() {
        assert_eq!(Resolution::from_label("Small").dimensions(), (256, 256));
        assert_eq!(Resolution::from_label("Large").dimensions(), (1024, 1024));
        assert_eq!(Resolution::from_label("Huge"), Resolution::Medium);
        assert_eq!(Resolution::from_label("").dimensions(), (512, 512));
    }

    #[test]
    fn filter_labels() {
        assert_eq!(FilterChoice::from_label("Grayscale"), Some(FilterChoice::Grayscale));
        assert_eq!(FilterChoice::from_label("Sepia"), None);
        for filter in FilterChoice::ALL {
            assert_eq!(FilterChoice::from_label(filter.as_str()), Some(filter));
        }
    }

    #[test]
    fn loading_body_is_detected() {
        let body: InferenceErrorBody = serde_json::from_value(json!({
            "error": "Model stabilityai/stable-diffusion-2-1 is currently loading",
            "estimated_time": 20.5
        }))
        .unwrap();
        assert!(body.is_loading());
        assert_eq!(body.estimated_secs(), 20.5);

        let hard: InferenceErrorBody =
            serde_json::from_value(json!({ "error": "Authorization header is invalid" })).unwrap();
        assert!(!hard.is_loading());
        assert_eq!(hard.estimated_secs(), 0.0);
    }

    #[test]
    fn odd_estimates_do_not_break_parsing() {
        let quoted: InferenceErrorBody = serde_json::from_value(json!({
            "error": "Model is currently loading",
            "estimated_time": "20.5"
        }))
        .unwrap();
        assert!(quoted.is_loading());
        assert_eq!(quoted.estimated_secs(), 20.5);

        for estimate in [json!(null), json!("soon"), json!({ "secs": 3 })] {
            let body: InferenceErrorBody = serde_json::from_value(json!({
                "error": "Model is currently loading",
                "estimated_time": estimate
            }))
            .unwrap();
            assert!(body.is_loading());
            assert_eq!(body.estimated_secs(), 0.0);
        }
    }

    #[test]
    fn non_string_error_is_rendered() {
        let body: InferenceErrorBody =
            serde_json::from_value(json!({ "error": ["bad", "input"] })).unwrap();
        assert_eq!(body.error_text().as_deref(), Some(r#"["bad","input"]"#));
    }
}
