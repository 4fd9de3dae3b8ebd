//! Per-call option resolution.
//!
//! Precedence, lowest first: the stored configuration, the silent flag, the
//! header level override, the security policy.

use rstview_engine::{MAX_REPORT_LEVEL, Options, Value};

use crate::error::RegistryError;
use crate::registry::ConfigRegistry;
use crate::security;

/// Caller overrides applied on top of a configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOverrides {
    /// Suppress diagnostics in the output and on the warning stream.
    pub silent: bool,
    /// Replace `initial_header_level`; `0` means no override.
    pub initial_header_level: Option<u8>,
}

/// Build the option set for one render of configuration `name`.
///
/// The result is an owned copy: changing it never affects the registry or
/// another call's options.
///
/// # Errors
///
/// Returns [`RegistryError::NotRegistered`] when `name` is unknown.
pub fn resolve_options(
    registry: &ConfigRegistry,
    name: &str,
    overrides: &RenderOverrides,
) -> Result<Options, RegistryError> {
    let mut options = registry.get_parameters(name)?.clone();

    if overrides.silent {
        options.insert("report_level".to_owned(), Value::from(MAX_REPORT_LEVEL));
    }
    if let Some(level) = overrides.initial_header_level.filter(|l| *l != 0) {
        options.insert("initial_header_level".to_owned(), Value::from(level));
    }
    security::apply(&mut options);

    tracing::debug!(
        configuration = %name,
        silent = overrides.silent,
        options = options.len(),
        "Resolved options"
    );
    Ok(options)
}
