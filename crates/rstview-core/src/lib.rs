//! Named parser configurations and the rstview rendering pipeline.
//!
//! This crate provides:
//! - [`ConfigRegistry`]: named engine parameter sets, plus a process-wide
//!   instance filled by [`autodiscover`]
//! - [`Renderer`]: option resolution, security policy and writer selection
//! - [`Validator`]: renders with diagnostics captured through [`intercept`]
//!
//! # Quick Start
//!
//! ```
//! use rstview_core::{ConfigRegistry, Validator};
//! use rstview_engine::Options;
//!
//! let mut registry = ConfigRegistry::new();
//! registry.register("default", Options::new()).unwrap();
//!
//! let mut validator = Validator::new();
//! let (valid, _) = validator
//!     .validate(&registry, "Lorem **ipsum salace", "default")
//!     .unwrap();
//! assert!(!valid);
//! assert_eq!(
//!     validator.formatted_messages(),
//!     ["Line 1 : Inline strong start-string without end-string."]
//! );
//! ```

mod discover;
mod error;
mod html5;
mod intercept;
mod options;
mod registry;
mod render;
pub mod security;
mod validate;

pub use discover::{DiscoverySettings, autodiscover, discover, discover_file};
pub use error::{DiscoverError, RegistryError, RenderError};
pub use html5::SemanticHtml5Writer;
pub use intercept::{Diagnostic, Interception, intercept};
pub use options::{RenderOverrides, resolve_options};
pub use registry::{ConfigRegistry, global_registry, read_global, write_global};
pub use render::{DEFAULT_CONFIG, RenderRequest, Rendered, Renderer};
pub use validate::{Validator, format_message};
