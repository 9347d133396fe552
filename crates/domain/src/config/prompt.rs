use serde::{Deserialize, Serialize};

/// Prompt template settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptConfig {
    #[serde(default)]
    pub locale: PromptLocale,
}

/// Natural language the prompt templates (and hence the model's
/// explanations and comments) are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptLocale {
    #[default]
    Zh,
    En,
}
