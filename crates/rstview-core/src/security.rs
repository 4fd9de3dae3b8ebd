//! Parameters enforced on every render, whatever the configuration or caller
//! asks for.
//!
//! With `halt_level = 6` no diagnostic (the highest level is 4) can abort a
//! parse, and with `enable_exit = 0` the engine never requests a process exit.

use rstview_engine::{Options, Value};

/// Enforced parameters.
pub const SECURITY_POLICY: &[(&str, i64)] = &[("halt_level", 6), ("enable_exit", 0)];

/// Enforced parameters as an option set.
#[must_use]
pub fn policy_options() -> Options {
    SECURITY_POLICY
        .iter()
        .map(|(key, value)| ((*key).to_owned(), Value::Int(*value)))
        .collect()
}

/// Overwrite the enforced keys of `options` with the policy values.
pub fn apply(options: &mut Options) {
    options.extend(policy_options());
}
