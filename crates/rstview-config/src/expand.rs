//! `${VAR}` and `${VAR:-default}` expansion in configuration values.

use rstview_engine::{Options, Value};

use crate::ConfigError;

/// Expand environment references in `value`.
///
/// Only the braced forms are recognised; a bare `$VAR` is kept as written.
/// `field` names the configuration key in error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |name| -> Result<Option<String>, UnsetVar> {
        std::env::var(name).map(Some).map_err(|_| UnsetVar(name.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Expand every string value of a parameter set in place.
pub(crate) fn expand_options(options: &mut Options, section: &str) -> Result<(), ConfigError> {
    for (key, value) in options.iter_mut() {
        if let Value::Str(text) = value {
            *text = expand_env(text, &format!("{section}.{key}"))?;
        }
    }
    Ok(())
}

struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_plain_value_unchanged() {
        assert_eq!(
            expand_env("Line {lineno} : {message}", "parser.error_template").unwrap(),
            "Line {lineno} : {message}"
        );
        assert_eq!(expand_env("$HOME/apps", "discovery.apps").unwrap(), "$HOME/apps");
    }

    #[test]
    fn test_expands_set_variable() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("RSTVIEW_TEST_APPS_ROOT", "/srv/site");
        }
        let result = expand_env("${RSTVIEW_TEST_APPS_ROOT}/blog", "discovery.apps").unwrap();
        assert_eq!(result, "/srv/site/blog");
        unsafe {
            std::env::remove_var("RSTVIEW_TEST_APPS_ROOT");
        }
    }

    #[test]
    fn test_default_used_when_unset() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::remove_var("RSTVIEW_TEST_LANGUAGE");
        }
        let result = expand_env("${RSTVIEW_TEST_LANGUAGE:-fr}", "configurations.default.language_code")
            .unwrap();
        assert_eq!(result, "fr");
    }

    #[test]
    fn test_unset_variable_is_an_error() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::remove_var("RSTVIEW_TEST_MISSING");
        }
        let err = expand_env("${RSTVIEW_TEST_MISSING}", "discovery.root_configs").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let text = err.to_string();
        assert!(text.contains("RSTVIEW_TEST_MISSING"));
        assert!(text.contains("discovery.root_configs"));
    }

    #[test]
    fn test_expand_options_only_touches_strings() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("RSTVIEW_TEST_FOOTNOTES", "brackets");
        }
        let mut options: Options = [
            ("footnote_references".to_owned(), Value::from("${RSTVIEW_TEST_FOOTNOTES}")),
            ("initial_header_level".to_owned(), Value::Int(2)),
        ]
        .into_iter()
        .collect();
        expand_options(&mut options, "configurations.default").unwrap();
        assert_eq!(options["footnote_references"], Value::from("brackets"));
        assert_eq!(options["initial_header_level"], Value::Int(2));
        unsafe {
            std::env::remove_var("RSTVIEW_TEST_FOOTNOTES");
        }
    }
}
