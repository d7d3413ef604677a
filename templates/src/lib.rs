//! Template registry and engine configuration.
//!
//! This crate owns the named [`Template`](casegen_core::Template)s a
//! session can project cases onto: the three built-ins, templates loaded
//! from YAML/JSON files, and custom templates created from a column list.
//! It also defines [`EngineConfig`], the YAML configuration shared by the
//! extraction engine and the CLI.
//!
//! # Quick start
//!
//! ```no_run
//! use casegen_templates::{EngineConfig, TemplateRegistry};
//!
//! let config = EngineConfig::load_or_default("casegen.yml").unwrap();
//!
//! let mut registry = TemplateRegistry::with_builtins();
//! for dir in &config.template_dirs {
//!     registry.extend_from_dir(dir).unwrap();
//! }
//!
//! let template = registry.require(&config.default_template).unwrap();
//! println!("{}", template.describe());
//! ```

mod config;
mod error;
mod registry;

pub use config::{ConverterCommand, ConverterConfig, EngineConfig, INPUT_PLACEHOLDER};
pub use error::{RegistryError, Result};
pub use registry::{
    DEFAULT_TEMPLATE, RegistryBuilder, RegistrySource, TemplateRegistry, builtin_templates,
    save_template,
};
