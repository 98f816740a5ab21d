//! Default greeting template.

use serde::{Deserialize, Serialize};

/// Placeholder replaced by the record name.
pub const NAME_PLACEHOLDER: &str = "{name}";

const DEFAULT_TEMPLATE: &str = "Happy birthday, {name}! 🎉🥳";

/// Greeting used when a record has no custom message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GreetingTemplate(String);

impl GreetingTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Renders the greeting for `name`.
    ///
    /// Templates without a placeholder are returned unchanged.
    pub fn render(&self, name: &str) -> String {
        self.0.replace(NAME_PLACEHOLDER, name.trim())
    }
}

impl Default for GreetingTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

#[cfg(test)]
mod tests {
    use super::GreetingTemplate;

    #[test]
    fn render_substitutes_every_placeholder() {
        let template = GreetingTemplate::new("{name}, {name}!");
        assert_eq!(template.render(" Ana "), "Ana, Ana!");
    }

    #[test]
    fn default_mentions_name() {
        assert!(GreetingTemplate::default().render("Ana").contains("Ana"));
    }
}
