//! Prompt override configuration

use serde::{Deserialize, Serialize};

/// Replacement text for one built-in prompt
///
/// Unset fields keep the built-in text.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PromptOverride {
    /// System instruction template
    pub system: Option<String>,

    /// Human trigger text
    pub human: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_partial() {
        let toml = r#"
            system = "Plan {{ duration }} in {{ city }}"
        "#;
        let config: PromptOverride = toml::from_str(toml).unwrap();
        assert!(config.system.is_some());
        assert!(config.human.is_none());
    }

    #[test]
    fn test_reject_unknown_fields() {
        let result: Result<PromptOverride, _> = toml::from_str(r#"assistant = "hi""#);
        assert!(result.is_err());
    }
}
