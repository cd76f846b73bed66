//! Rendering: resolves a theme, renders a profile and wraps the result with
//! the currently published accent color.

pub mod accent;
pub mod handlers;

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

use crate::models::profile::ProfileDocument;
use crate::themes::{html::escape_html, RenderError, ThemeRegistry};

pub use accent::AccentChannel;

#[derive(Debug, Clone, Serialize)]
pub struct RenderedPortfolio {
    /// Key of the theme that actually rendered, after fallback.
    pub theme: String,
    pub accent: String,
    pub html: String,
}

/// Subscribes to the accent channel; every render reads the latest color.
#[derive(Clone)]
pub struct Renderer {
    registry: Arc<ThemeRegistry>,
    accent: watch::Receiver<String>,
}

impl Renderer {
    pub fn new(registry: Arc<ThemeRegistry>, accent: &AccentChannel) -> Self {
        Self {
            registry,
            accent: accent.subscribe(),
        }
    }

    /// Renders `profile` with `theme_key` (default theme when `None` or unknown)
    /// into an accent-scoped fragment. May block on a generated theme.
    pub fn render(
        &self,
        theme_key: Option<&str>,
        profile: &ProfileDocument,
    ) -> Result<RenderedPortfolio, RenderError> {
        let theme = self
            .registry
            .get(theme_key.unwrap_or(self.registry.default_key()));
        let accent = self.accent.borrow().clone();

        let body = theme.render(profile)?;
        debug!("Rendered theme {} ({} bytes)", theme.key(), body.len());

        Ok(RenderedPortfolio {
            theme: theme.key().to_string(),
            html: format!("<div class=\"folio\" style=\"--accent:{accent}\">{body}</div>"),
            accent,
        })
    }

    /// Full HTML document around [`Renderer::render`].
    pub fn render_page(
        &self,
        theme_key: Option<&str>,
        profile: &ProfileDocument,
    ) -> Result<RenderedPortfolio, RenderError> {
        let mut rendered = self.render(theme_key, profile)?;
        let name = profile.full_name();
        let title = if name.is_empty() {
            "Portfolio".to_string()
        } else {
            format!("{} · Portfolio", escape_html(&name))
        };
        rendered.html = format!(
            "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\"><meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"><title>{title}</title><style>:root{{--accent:{accent}}}body{{margin:0}}</style></head><body>{html}</body></html>",
            accent = rendered.accent,
            html = rendered.html
        );
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::themes::DEFAULT_THEME_KEY;

    fn renderer() -> (Renderer, AccentChannel) {
        let accent = AccentChannel::new("#6366f1").unwrap();
        let renderer = Renderer::new(Arc::new(ThemeRegistry::new(DEFAULT_THEME_KEY)), &accent);
        (renderer, accent)
    }

    #[test]
    fn test_render_uses_published_accent() {
        let (renderer, accent) = renderer();
        let profile = ProfileDocument::default();

        let before = renderer.render(Some("retro"), &profile).unwrap();
        assert!(before.html.starts_with("<div class=\"folio\" style=\"--accent:#6366f1\">"));

        accent.publish("#ff0000").unwrap();
        let after = renderer.render(Some("retro"), &profile).unwrap();
        assert_eq!(after.accent, "#ff0000");
        assert!(after.html.contains("--accent:#ff0000"));
    }

    #[test]
    fn test_render_reports_resolved_theme() {
        let (renderer, _accent) = renderer();
        let profile = ProfileDocument::default();

        assert_eq!(renderer.render(None, &profile).unwrap().theme, "minimal");
        assert_eq!(renderer.render(Some("nope"), &profile).unwrap().theme, "minimal");
        assert_eq!(renderer.render(Some("hacker"), &profile).unwrap().theme, "hacker");
    }

    #[test]
    fn test_render_page_is_a_document() {
        let (renderer, _accent) = renderer();
        let profile: ProfileDocument =
            serde_json::from_value(serde_json::json!({"first_name": "Alan", "last_name": "Turing"}))
                .unwrap();
        let page = renderer.render_page(Some("book"), &profile).unwrap();
        assert!(page.html.starts_with("<!DOCTYPE html>"));
        assert!(page.html.contains("<title>Alan Turing · Portfolio</title>"));
        assert!(page.html.contains(":root{--accent:#6366f1}"));
        assert!(page.html.contains("theme-book"));
    }
}
