// Theme registry: eleven built-in renderers plus one swappable AI-generated slot.
// Rendering is synchronous; generated themes run in the sandbox and block.

pub mod builtin;
pub mod generated;
pub mod html;
pub mod sections;

use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::profile::ProfileDocument;
use crate::sandbox::SandboxError;

pub use builtin::BuiltinTheme;
pub use generated::GeneratedTheme;

/// Reserved key of the generated theme slot.
pub const GENERATED_KEY: &str = "ai-generated";

pub const DEFAULT_THEME_KEY: &str = "minimal";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Generated theme failed to render: {0}")]
    Sandbox(#[from] SandboxError),

    #[error("Profile could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid accent color '{0}': expected #rgb, #rgba, #rrggbb or #rrggbbaa")]
    InvalidAccent(String),
}

/// A theme turns a profile into an HTML fragment.
pub trait Theme: Send + Sync {
    fn key(&self) -> &str;
    fn render(&self, profile: &ProfileDocument) -> Result<String, RenderError>;
}

/// Process-wide theme lookup. Built-ins are fixed at construction; the
/// generated slot has a single writer (the generation pipeline).
pub struct ThemeRegistry {
    builtins: Vec<Arc<dyn Theme>>,
    default_index: usize,
    generated: RwLock<Option<Arc<GeneratedTheme>>>,
}

impl ThemeRegistry {
    /// Unknown `default_key`s fall back to `minimal`.
    pub fn new(default_key: &str) -> Self {
        let builtins: Vec<Arc<dyn Theme>> = BuiltinTheme::all()
            .into_iter()
            .map(|theme| Arc::new(theme) as Arc<dyn Theme>)
            .collect();

        let find = |key: &str| builtins.iter().position(|t| t.key() == key);
        let default_index = match find(default_key) {
            Some(index) => index,
            None => {
                warn!("Unknown default theme '{default_key}', using '{DEFAULT_THEME_KEY}'");
                find(DEFAULT_THEME_KEY).unwrap_or(0)
            }
        };

        Self {
            builtins,
            default_index,
            generated: RwLock::new(None),
        }
    }

    pub fn default_key(&self) -> &str {
        self.builtins[self.default_index].key()
    }

    /// Resolves `key` to a theme. Unknown keys, and the generated key while the
    /// slot is empty, resolve to the default theme.
    pub fn get(&self, key: &str) -> Arc<dyn Theme> {
        if key == GENERATED_KEY {
            if let Some(theme) = self.generated.read().as_ref() {
                return theme.clone();
            }
        }
        self.builtins
            .iter()
            .find(|theme| theme.key() == key)
            .unwrap_or(&self.builtins[self.default_index])
            .clone()
    }

    /// Built-in keys in registry order, then the generated key when live.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.builtins.iter().map(|t| t.key().to_string()).collect();
        if self.generated.read().is_some() {
            keys.push(GENERATED_KEY.to_string());
        }
        keys
    }

    /// Replaces the generated slot with a fully built theme.
    pub fn install_generated(&self, theme: GeneratedTheme) {
        let name = theme.component_name().to_string();
        let job_id = theme.job_id;
        let previous = self.generated.write().replace(Arc::new(theme));
        info!(
            "Installed generated theme {name} (job {job_id}), replaced: {}",
            previous.is_some()
        );
    }

    pub fn generated(&self) -> Option<Arc<GeneratedTheme>> {
        self.generated.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::sanitize::SanitizedSource;
    use crate::sandbox::{compile, SandboxLimits};
    use serde_json::json;
    use uuid::Uuid;

    fn full_profile() -> ProfileDocument {
        serde_json::from_value(json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "summary": "Analyst of engines.",
            "contact": {"email": "ada@example.com", "phone": "+44 20 0000", "address": {"city": "London"}},
            "links": [{"name": "Notes", "url": "https://example.com/notes"}],
            "work_experiences": [{
                "job_title": "Analyst",
                "employer": "Analytical Engine Co.",
                "date": {"start": "1842", "ongoing": true},
                "bullets": ["Wrote the first program"]
            }],
            "education": [{"degree": "Private tutoring", "school_name": "Home", "majors": ["Mathematics"]}],
            "extra_experiences": [{"name": "Note G", "role": "Author", "type": "project"}],
            "skills": [{"name": "Mathematics", "category": "Science", "level": "expert"}],
            "custom_sections": [{"name": "Honors", "elements": [{"name": "Ada Lovelace Day"}]}]
        }))
        .unwrap()
    }

    fn generated_theme(name: &str) -> GeneratedTheme {
        let code = format!(
            "function {name}({{ profile }}) {{ return <p className=\"ai\">{{profile.first_name}} by {name}</p>; }}"
        );
        let limits = SandboxLimits::default();
        let component = compile(&code, name, &limits).unwrap();
        GeneratedTheme::new(
            Uuid::new_v4(),
            SanitizedSource {
                code,
                component_name: name.to_string(),
            },
            component,
            limits,
        )
    }

    #[test]
    fn test_every_builtin_renders_full_and_empty_profiles() {
        let registry = ThemeRegistry::new(DEFAULT_THEME_KEY);
        let full = full_profile();
        let empty = ProfileDocument::default();

        for key in registry.keys() {
            let theme = registry.get(&key);
            assert_eq!(theme.key(), key);

            let html = theme.render(&full).unwrap();
            assert!(html.contains("Ada Lovelace"), "{key}");
            assert!(html.contains("Analytical Engine Co."), "{key}");
            assert!(html.contains("1842 – Present"), "{key}");

            let html = theme.render(&empty).unwrap();
            assert!(html.starts_with(&format!("<div class=\"theme theme-{key}\">")), "{key}");
            assert!(!html.contains("<section"), "{key}");
        }
    }

    #[test]
    fn test_unknown_key_renders_like_default() {
        let registry = ThemeRegistry::new(DEFAULT_THEME_KEY);
        let profile = full_profile();

        let unknown = registry.get("does-not-exist").render(&profile).unwrap();
        let default = registry.get(DEFAULT_THEME_KEY).render(&profile).unwrap();
        assert_eq!(unknown, default);
    }

    #[test]
    fn test_configured_default_key() {
        assert_eq!(ThemeRegistry::new("terminal").default_key(), "terminal");
        assert_eq!(ThemeRegistry::new("nope").default_key(), DEFAULT_THEME_KEY);

        let registry = ThemeRegistry::new("book");
        assert_eq!(registry.get("").key(), "book");
    }

    #[test]
    fn test_generated_slot_falls_back_until_installed() {
        let registry = ThemeRegistry::new(DEFAULT_THEME_KEY);
        assert_eq!(registry.get(GENERATED_KEY).key(), DEFAULT_THEME_KEY);
        assert!(!registry.keys().contains(&GENERATED_KEY.to_string()));
        assert!(registry.generated().is_none());

        registry.install_generated(generated_theme("Wave"));
        assert_eq!(registry.keys().last().map(String::as_str), Some(GENERATED_KEY));

        let html = registry.get(GENERATED_KEY).render(&full_profile()).unwrap();
        assert_eq!(html, "<p class=\"ai\">Ada by Wave</p>");
    }

    #[test]
    fn test_install_replaces_previous_generated_theme() {
        let registry = ThemeRegistry::new(DEFAULT_THEME_KEY);
        registry.install_generated(generated_theme("First"));
        registry.install_generated(generated_theme("Second"));

        let live = registry.generated().unwrap();
        assert_eq!(live.component_name(), "Second");
        assert_eq!(live.source().component_name, "Second");
        assert_eq!(registry.keys().len(), 12);
    }
}
