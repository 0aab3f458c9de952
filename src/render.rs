//! Fixed result template. Every value shown here comes from the backend's
//! answer; the only formatting applied is units and one-decimal BMI.

use std::fmt;

use crate::messages::{self, Locale};
use crate::models::{AnalysisResult, BmiCategory, Gender, RecentRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub bmi: String,
    pub category: String,
    pub color: String,
    pub height: String,
    pub weight: String,
    pub advice: String,
    pub specific_advice: Vec<String>,
    pub ideal_weight: Option<String>,
}

impl ResultView {
    pub fn new(result: &AnalysisResult, locale: Locale) -> Self {
        let info = &result.user_info;
        Self {
            name: info.name.clone(),
            age: format!("{} {}", info.age, messages::years(locale)),
            gender: gender_label(info.gender, locale).to_string(),
            bmi: format!("{:.1}", result.bmi),
            category: result.category.clone(),
            color: result.color.clone(),
            height: format!("{} cm", info.height),
            weight: format!("{} kg", info.weight),
            advice: result.advice.clone(),
            specific_advice: result
                .recommendations
                .as_ref()
                .map(|r| r.specific.clone())
                .unwrap_or_default(),
            ideal_weight: result
                .ideal_weight_range
                .as_ref()
                .map(|range| format!("{} - {} kg", range.min, range.max)),
        }
    }
}

impl fmt::Display for ResultView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({}, {})", self.name, self.age, self.gender)?;
        writeln!(f, "BMI: {}  [{}]", self.bmi, self.category)?;
        writeln!(f, "Height: {}  Weight: {}", self.height, self.weight)?;
        if !self.advice.is_empty() {
            writeln!(f, "Advice: {}", self.advice)?;
        }
        for item in &self.specific_advice {
            writeln!(f, "  - {item}")?;
        }
        if let Some(ideal) = &self.ideal_weight {
            writeln!(f, "Ideal weight: {ideal}")?;
        }
        Ok(())
    }
}

pub fn gender_label(gender: Gender, locale: Locale) -> &'static str {
    match (gender, locale) {
        (Gender::Male, Locale::En) => "Male",
        (Gender::Female, Locale::En) => "Female",
        (Gender::Male, Locale::Id) => "Laki-laki",
        (Gender::Female, Locale::Id) => "Perempuan",
    }
}

/// Reference table shown next to a result
pub fn category_legend(locale: Locale) -> String {
    BmiCategory::all()
        .iter()
        .map(|category| {
            let name = match (category, locale) {
                (BmiCategory::Underweight, Locale::En) => "Underweight",
                (BmiCategory::Underweight, Locale::Id) => "Kurang",
                (BmiCategory::Normal, _) => "Normal",
                (BmiCategory::Overweight, Locale::En) => "Overweight",
                (BmiCategory::Overweight, Locale::Id) => "Berlebih",
                (BmiCategory::Obese, Locale::En) => "Obese",
                (BmiCategory::Obese, Locale::Id) => "Obesitas",
            };
            format!("{name}: {}", category.range_label())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn record_line(record: &RecentRecord, locale: Locale) -> String {
    format!(
        "{} - {} {}, {} | BMI: {} {}",
        record.name,
        record.age,
        messages::years(locale),
        gender_label(record.gender, locale),
        record.bmi,
        record.bmi_category.as_deref().unwrap_or("")
    )
    .trim_end()
    .to_string()
}
