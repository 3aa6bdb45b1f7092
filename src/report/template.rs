//! Report templates.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

const MRI_KNEE_JSON: &str = include_str!("../../templates/mri_knee.json");

/// Identifiers of the templates shipped with the crate.
pub const BUILTIN_TEMPLATES: &[&str] = &["mri_knee"];

/// A structured report template: an ordered list of anatomical sections,
/// each with selectable findings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTemplate {
    /// Template identifier
    pub id: String,

    /// Human-readable title ("MRI Knee")
    pub title: String,

    /// Imaging modality shown in the report header
    #[serde(default = "default_modality")]
    pub modality: String,

    /// Technique sentence; `{region}` is replaced with the lowercase region
    #[serde(default)]
    pub technique: Option<String>,

    /// Sections in report order
    pub sections: Vec<TemplateSection>,
}

fn default_modality() -> String {
    "MRI".to_string()
}

impl ReportTemplate {
    /// Parse and validate a template from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let template: Self = serde_json::from_str(json)
            .map_err(|e| Error::Template(format!("invalid template JSON: {}", e)))?;
        template.validate()?;
        Ok(template)
    }

    /// Load a template from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load a built-in template by identifier.
    pub fn builtin(id: &str) -> Result<Self> {
        match id {
            "mri_knee" => Self::from_json(MRI_KNEE_JSON),
            other => Err(Error::Template(format!("unknown template: {}", other))),
        }
    }

    /// The built-in MRI knee template.
    pub fn mri_knee() -> Result<Self> {
        Self::builtin("mri_knee")
    }

    /// Find a section by identifier.
    pub fn section(&self, id: &str) -> Option<&TemplateSection> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Check that the template has sections and that identifiers and
    /// option labels are unique.
    pub fn validate(&self) -> Result<()> {
        if self.sections.is_empty() {
            return Err(Error::Template(format!("template {} has no sections", self.id)));
        }
        let mut ids = HashSet::new();
        for section in &self.sections {
            if !ids.insert(section.id.as_str()) {
                return Err(Error::Template(format!("duplicate section id: {}", section.id)));
            }
            let mut labels = HashSet::new();
            for option in &section.options {
                if !labels.insert(option.label.as_str()) {
                    return Err(Error::Template(format!(
                        "duplicate option {} in section {}",
                        option.label, section.id
                    )));
                }
            }
        }
        Ok(())
    }
}

/// One anatomical section of a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSection {
    /// Section identifier
    pub id: String,

    /// Title printed before the finding
    pub title: String,

    /// Reading hint for the section
    #[serde(default)]
    pub description: String,

    /// Selectable findings
    #[serde(default)]
    pub options: Vec<FindingOption>,
}

impl TemplateSection {
    /// Find an option by its label.
    pub fn option(&self, label: &str) -> Option<&FindingOption> {
        self.options.iter().find(|o| o.label == label)
    }
}

/// A selectable finding: short label plus the sentence written into the
/// report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingOption {
    /// Short label ("Tear")
    pub label: String,

    /// Report sentence for the label
    pub value: String,
}
