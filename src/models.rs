use serde::{Deserialize, Serialize};

/// Gender as accepted by the analyze endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// Validated request payload for the analyze endpoint.
///
/// Only produced by `HealthForm::validate`, so every value sent over the wire
/// is already inside the accepted ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthInput {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub height: f64,
    pub weight: f64,
}

/// Response envelope used by every backend endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

/// Body of a non-2xx response
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
}

/// `analysis` block of the analyze response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub bmi: f64,
    pub category: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub advice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdealWeightRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Recommendations {
    #[serde(default)]
    pub general: Option<String>,
    #[serde(default)]
    pub specific: Vec<String>,
}

/// `data` payload of a successful analyze response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisData {
    pub user_info: HealthInput,
    pub analysis: Analysis,
    #[serde(default)]
    pub ideal_weight: Option<IdealWeightRange>,
    #[serde(default)]
    pub recommendations: Option<Recommendations>,
}

pub const DEFAULT_CATEGORY_COLOR: &str = "#333333";

/// Analysis returned by the backend, flattened for display.
///
/// `bmi` and `category` are passed through verbatim; nothing here is computed
/// on the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub user_info: HealthInput,
    pub bmi: f64,
    pub category: String,
    pub color: String,
    pub advice: String,
    pub ideal_weight_range: Option<IdealWeightRange>,
    pub recommendations: Option<Recommendations>,
}

impl From<AnalysisData> for AnalysisResult {
    fn from(data: AnalysisData) -> Self {
        let advice = data
            .analysis
            .advice
            .clone()
            .or_else(|| {
                data.recommendations
                    .as_ref()
                    .and_then(|r| r.general.clone())
            })
            .unwrap_or_default();

        Self {
            user_info: data.user_info,
            bmi: data.analysis.bmi,
            category: data.analysis.category,
            color: data
                .analysis
                .color
                .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()),
            advice,
            ideal_weight_range: data.ideal_weight,
            recommendations: data.recommendations,
        }
    }
}

impl AnalysisResult {
    /// Best-effort reading of the backend's category label
    pub fn category_kind(&self) -> Option<BmiCategory> {
        BmiCategory::from_label(&self.category)
    }
}

/// Known BMI categories. Only used to recognise a backend label and to show
/// the reference legend, never to classify a BMI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_lowercase();
        match label.as_str() {
            "underweight" | "berat badan kurang" | "kurang" => Some(Self::Underweight),
            "normal" => Some(Self::Normal),
            "overweight" | "berat badan berlebih" | "berlebih" => Some(Self::Overweight),
            "obese" | "obesity" | "obesitas" => Some(Self::Obese),
            _ => None,
        }
    }

    /// Reference ranges shown next to a result
    pub fn range_label(&self) -> &'static str {
        match self {
            Self::Underweight => "< 18.5",
            Self::Normal => "18.5 - 24.9",
            Self::Overweight => "25.0 - 29.9",
            Self::Obese => ">= 30.0",
        }
    }

    pub fn all() -> [Self; 4] {
        [
            Self::Underweight,
            Self::Normal,
            Self::Overweight,
            Self::Obese,
        ]
    }
}

/// Response of `GET /health`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub version: Option<String>,
}

/// Entry of the recent records list
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecentRecord {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub bmi: f64,
    #[serde(default)]
    pub bmi_category: Option<String>,
}
