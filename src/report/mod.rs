//! Structured radiology reports.
//!
//! A [`ReportTemplate`] lists anatomical sections with selectable
//! findings. A [`ReportForm`] records one finding and an optional note per
//! section and renders the plain-text report, ending in an impression
//! that is either supplied (typed or generated, see
//! [`crate::impression`]) or derived from the abnormal findings.
//!
//! ```
//! use webdocx::report::{ReportForm, ReportTemplate, Region};
//!
//! let mut form = ReportForm::new(ReportTemplate::mri_knee()?).with_region(Region::Left);
//! form.select("menisci", "Tear")?;
//! let report = form.render(None);
//! assert!(report.ends_with("IMPRESSION:\nTear"));
//! # Ok::<(), webdocx::Error>(())
//! ```

mod form;
mod template;

pub use form::{PatientInfo, Region, ReportForm, NOT_ASSESSED, NO_ABNORMALITY};
pub use template::{FindingOption, ReportTemplate, TemplateSection, BUILTIN_TEMPLATES};
