//! Core test-case types and the template projection.
//!
//! This crate defines the foundational types shared by the extraction
//! engine, the template registry and the CLI:
//!
//! - [`TestCase`] — the normalized five-field record (requirement, scenario,
//!   given, when, then).
//! - [`CaseField`] — identifiers for those fields, in the fixed field order.
//! - [`Template`] — a named column schema plus field-to-column aliases, with
//!   [`render`](Template::render) and [`apply_edit`](Template::apply_edit).
//! - [`CaseSet`] — a serializable bundle of cases with provenance.
//!
//! Validation ([`validate_template`]) separates fatal template problems from
//! tolerated ones such as aliased columns.
//!
//! # Example
//!
//! ```
//! use casegen_core::*;
//!
//! let template = Template::new("review", ["Scenario", "Expected"])
//!     .with_mapping(CaseField::Scenario, "Scenario")
//!     .with_mapping(CaseField::Then, "Expected");
//!
//! let mut cases = vec![
//!     TestCase::default()
//!         .with(CaseField::Scenario, "Checkout")
//!         .with(CaseField::Then, "order is created"),
//! ];
//!
//! assert_eq!(template.render(&cases).rows[0], vec!["Checkout", "order is created"]);
//! assert!(template.apply_edit(&mut cases, 0, 1, "order is paid"));
//! assert_eq!(cases[0].then, "order is paid");
//! assert!(validate_template(&template).is_empty());
//! ```

mod package;
mod template;
mod types;
mod validate;

pub use package::CaseSet;
pub use template::{RenderedTable, Template};
pub use types::*;
pub use validate::{TemplateIssue, validate_template};
