//! Generated labels per language.

/// Labels the writers insert into the output.
#[derive(Debug)]
pub struct Labels {
    pub code: &'static str,
    admonitions: &'static [(&'static str, &'static str)],
}

impl Labels {
    /// Title shown for an admonition kind.
    #[must_use]
    pub fn admonition(&self, kind: &str) -> Option<&'static str> {
        self.admonitions
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, label)| *label)
    }
}

static EN: Labels = Labels {
    code: "en",
    admonitions: &[
        ("attention", "Attention!"),
        ("caution", "Caution!"),
        ("danger", "!DANGER!"),
        ("error", "Error"),
        ("hint", "Hint"),
        ("important", "Important"),
        ("note", "Note"),
        ("tip", "Tip"),
        ("warning", "Warning"),
    ],
};

static FR: Labels = Labels {
    code: "fr",
    admonitions: &[
        ("attention", "Attention!"),
        ("caution", "Avertissement!"),
        ("danger", "!DANGER!"),
        ("error", "Erreur"),
        ("hint", "Indication"),
        ("important", "Important"),
        ("note", "Note"),
        ("tip", "Astuce"),
        ("warning", "Avis"),
    ],
};

/// Admonition kinds with a dedicated directive.
pub const ADMONITION_KINDS: &[&str] = &[
    "attention",
    "caution",
    "danger",
    "error",
    "hint",
    "important",
    "note",
    "tip",
    "warning",
];

/// Labels for `code`, falling back to English.
#[must_use]
pub fn labels(code: &str) -> &'static Labels {
    match code {
        "en" => &EN,
        "fr" => &FR,
        _ => {
            tracing::debug!(language = %code, "No labels for language, using English");
            &EN
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(labels("en").admonition("note"), Some("Note"));
        assert_eq!(labels("fr").admonition("warning"), Some("Avis"));
        assert_eq!(labels("fr").admonition("custom"), None);
    }

    #[test]
    fn test_unknown_language_falls_back() {
        assert_eq!(labels("xx").code, "en");
    }

    #[test]
    fn test_every_kind_has_a_label() {
        for kind in ADMONITION_KINDS {
            assert!(labels("en").admonition(kind).is_some(), "{kind}");
            assert!(labels("fr").admonition(kind).is_some(), "{kind}");
        }
    }
}
