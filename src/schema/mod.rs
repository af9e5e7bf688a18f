//! Embedded rule books and observation templates

pub mod registry;
pub mod template;

pub use registry::RuleRegistry;
pub use template::{ObservationTemplates, TemplateError, TemplateValues};
