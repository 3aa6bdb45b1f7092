//! Filled-in report forms.

use super::template::ReportTemplate;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Finding recorded for a section nobody has looked at.
pub const NOT_ASSESSED: &str = "Not Assessed";

/// Impression line used when every assessed section is unremarkable.
pub const NO_ABNORMALITY: &str = "No acute abnormality identified.";

// Labels that never count as abnormal.
const UNREMARKABLE: &[&str] = &[NOT_ASSESSED, "Normal", "None"];

/// Side of the body examined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Region {
    #[default]
    Right,
    Left,
    Bilateral,
}

impl Region {
    /// Display name ("Right").
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Right => "Right",
            Region::Left => "Left",
            Region::Bilateral => "Bilateral",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "right" | "r" => Ok(Region::Right),
            "left" | "l" => Ok(Region::Left),
            "bilateral" | "both" => Ok(Region::Bilateral),
            other => Err(Error::Template(format!("unknown region: {}", other))),
        }
    }
}

/// Patient context printed in the report header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientInfo {
    pub name: String,
    pub id: String,
    pub age: String,
    pub sex: String,
    /// Study date, `YYYY-MM-DD`
    pub date: String,
    pub ref_physician: String,
}

impl PatientInfo {
    /// Empty patient info dated today.
    pub fn new() -> Self {
        Self {
            name: String::new(),
            id: String::new(),
            age: String::new(),
            sex: String::new(),
            date: chrono::Local::now().format("%Y-%m-%d").to_string(),
            ref_physician: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_age(mut self, age: impl Into<String>) -> Self {
        self.age = age.into();
        self
    }

    pub fn with_sex(mut self, sex: impl Into<String>) -> Self {
        self.sex = sex.into();
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    pub fn with_ref_physician(mut self, physician: impl Into<String>) -> Self {
        self.ref_physician = physician.into();
        self
    }
}

impl Default for PatientInfo {
    fn default() -> Self {
        Self::new()
    }
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

/// A template being filled in: one finding and one note per section.
#[derive(Debug, Clone)]
pub struct ReportForm {
    template: ReportTemplate,
    region: Region,
    patient: PatientInfo,
    findings: HashMap<String, String>,
    notes: HashMap<String, String>,
}

impl ReportForm {
    /// Start a form with every section set to [`NOT_ASSESSED`].
    pub fn new(template: ReportTemplate) -> Self {
        let findings = template
            .sections
            .iter()
            .map(|s| (s.id.clone(), NOT_ASSESSED.to_string()))
            .collect();
        Self {
            template,
            region: Region::default(),
            patient: PatientInfo::default(),
            findings,
            notes: HashMap::new(),
        }
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    pub fn with_patient(mut self, patient: PatientInfo) -> Self {
        self.patient = patient;
        self
    }

    pub fn template(&self) -> &ReportTemplate {
        &self.template
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn patient(&self) -> &PatientInfo {
        &self.patient
    }

    /// Select the finding label for a section.
    ///
    /// The label must be one of the section's options or [`NOT_ASSESSED`].
    pub fn select(&mut self, section_id: &str, label: &str) -> Result<()> {
        let section = self
            .template
            .section(section_id)
            .ok_or_else(|| Error::Template(format!("unknown section: {}", section_id)))?;
        if label != NOT_ASSESSED && section.option(label).is_none() {
            return Err(Error::Template(format!(
                "unknown finding {} for section {}",
                label, section_id
            )));
        }
        self.findings.insert(section_id.to_string(), label.to_string());
        Ok(())
    }

    /// Attach a free-text note to a section.
    pub fn note(&mut self, section_id: &str, note: &str) -> Result<()> {
        if self.template.section(section_id).is_none() {
            return Err(Error::Template(format!("unknown section: {}", section_id)));
        }
        self.notes.insert(section_id.to_string(), note.to_string());
        Ok(())
    }

    /// Selected label for a section.
    pub fn finding(&self, section_id: &str) -> Option<&str> {
        self.findings.get(section_id).map(String::as_str)
    }

    /// Labels of abnormal findings, in section order.
    pub fn abnormal_findings(&self) -> Vec<&str> {
        self.template
            .sections
            .iter()
            .filter_map(|s| self.finding(&s.id))
            .filter(|label| !UNREMARKABLE.contains(label))
            .collect()
    }

    /// Header, patient block, technique and findings.
    pub fn findings_text(&self) -> String {
        let template = &self.template;
        let patient = &self.patient;
        let mut text = format!(
            "{} REPORT - {} ({})\n\n",
            template.modality.to_uppercase(),
            template.title.to_uppercase(),
            self.region.as_str().to_uppercase()
        );

        text.push_str(&format!(
            "PATIENT: {} | ID: {}\n",
            or_default(&patient.name, "N/A"),
            or_default(&patient.id, "N/A")
        ));
        text.push_str(&format!(
            "AGE/SEX: {} / {}\n",
            or_default(&patient.age, "-"),
            or_default(&patient.sex, "-")
        ));
        text.push_str(&format!(
            "DATE: {} | REF: {}\n\n",
            patient.date,
            or_default(&patient.ref_physician, "N/A")
        ));

        if let Some(ref technique) = template.technique {
            let region = self.region.as_str().to_lowercase();
            text.push_str(&format!("TECHNIQUE:\n{}\n\n", technique.replace("{region}", &region)));
        }

        text.push_str("FINDINGS:\n");
        for section in &template.sections {
            let Some(label) = self.finding(&section.id) else { continue };
            if label == NOT_ASSESSED {
                continue;
            }
            let sentence = section
                .option(label)
                .map(|o| o.value.as_str())
                .unwrap_or(label);
            text.push_str(&format!("{}: {}", section.title, sentence));
            if let Some(note) = self.notes.get(&section.id).filter(|n| !n.trim().is_empty()) {
                text.push(' ');
                text.push_str(note);
            }
            text.push('\n');
        }
        text
    }

    /// Full report with an impression.
    ///
    /// Without an impression the abnormal finding labels are listed, or
    /// [`NO_ABNORMALITY`] when there are none.
    pub fn render(&self, impression: Option<&str>) -> String {
        let mut text = self.findings_text();
        text.push_str("\nIMPRESSION:\n");
        match impression.filter(|i| !i.trim().is_empty()) {
            Some(impression) => text.push_str(impression),
            None => {
                let abnormal = self.abnormal_findings();
                if abnormal.is_empty() {
                    text.push_str(NO_ABNORMALITY);
                } else {
                    text.push_str(&abnormal.join("\n"));
                }
            }
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ReportForm {
        ReportForm::new(ReportTemplate::mri_knee().unwrap())
            .with_patient(PatientInfo::new().with_name("Jane Roe").with_date("2024-03-01"))
    }

    #[test]
    fn test_region_parse() {
        assert_eq!("left".parse::<Region>().unwrap(), Region::Left);
        assert_eq!("Bilateral".parse::<Region>().unwrap(), Region::Bilateral);
        assert!("up".parse::<Region>().is_err());
    }

    #[test]
    fn test_defaults_to_not_assessed() {
        let form = form();
        assert_eq!(form.finding("menisci"), Some(NOT_ASSESSED));
        assert!(form.abnormal_findings().is_empty());
    }

    #[test]
    fn test_header_and_patient_block() {
        let text = form().with_region(Region::Left).findings_text();
        assert!(text.starts_with("MRI REPORT - MRI KNEE (LEFT)\n\n"));
        assert!(text.contains("PATIENT: Jane Roe | ID: N/A\n"));
        assert!(text.contains("AGE/SEX: - / -\n"));
        assert!(text.contains("DATE: 2024-03-01 | REF: N/A\n\n"));
        assert!(text.contains("TECHNIQUE:\nMultiplanar multisequence MRI of the left knee.\n\n"));
        assert!(text.ends_with("FINDINGS:\n"));
    }

    #[test]
    fn test_findings_use_option_value_and_note() {
        let mut form = form();
        form.select("menisci", "Tear").unwrap();
        form.note("menisci", "Posterior horn medial meniscus.").unwrap();
        form.select("ligaments", "Normal").unwrap();

        let text = form.findings_text();
        assert!(text.contains(
            "Menisci: Meniscal signal reaching the articular surface, in keeping with a tear. Posterior horn medial meniscus.\n"
        ));
        assert!(text.contains("Ligaments: Cruciate and collateral ligaments are intact.\n"));
        assert!(!text.contains("Bone & Marrow"));
    }

    #[test]
    fn test_impression_fallbacks() {
        let mut form = form();
        form.select("effusion", "None").unwrap();
        assert!(form.render(None).ends_with("IMPRESSION:\nNo acute abnormality identified."));

        form.select("menisci", "Tear").unwrap();
        form.select("effusion", "Small effusion").unwrap();
        assert!(form.render(Some("  ")).ends_with("IMPRESSION:\nTear\nSmall effusion"));
        assert!(form.render(Some("1. Meniscal tear.")).ends_with("IMPRESSION:\n1. Meniscal tear."));
    }

    #[test]
    fn test_unknown_selection_rejected() {
        let mut form = form();
        assert!(matches!(form.select("spine", "Normal"), Err(Error::Template(_))));
        assert!(matches!(form.select("menisci", "Broken"), Err(Error::Template(_))));
        assert!(matches!(form.note("spine", "x"), Err(Error::Template(_))));
    }
}
