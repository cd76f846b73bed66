// Accent color publish/subscribe. The control surface publishes; renderers
// read the latest value at render time.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::sync::watch;
use tracing::info;

use crate::themes::RenderError;

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").unwrap()
});

#[derive(Clone)]
pub struct AccentChannel {
    tx: Arc<watch::Sender<String>>,
}

impl AccentChannel {
    pub fn new(initial: &str) -> Result<Self, RenderError> {
        let color = normalize(initial)?;
        let (tx, _rx) = watch::channel(color);
        Ok(Self { tx: Arc::new(tx) })
    }

    pub fn current(&self) -> String {
        self.tx.borrow().clone()
    }

    /// Validates and publishes `color`, returning the normalized value.
    pub fn publish(&self, color: &str) -> Result<String, RenderError> {
        let color = normalize(color)?;
        let previous = self.tx.send_replace(color.clone());
        if previous != color {
            info!("Accent color changed {previous} -> {color}");
        }
        Ok(color)
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }
}

fn normalize(color: &str) -> Result<String, RenderError> {
    let color = color.trim();
    if HEX_COLOR.is_match(color) {
        Ok(color.to_ascii_lowercase())
    } else {
        Err(RenderError::InvalidAccent(color.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_hex_forms() {
        let accent = AccentChannel::new("#6366F1").unwrap();
        assert_eq!(accent.current(), "#6366f1");
        for color in ["#abc", "#abcd", "#a1b2c3", "#a1b2c3d4"] {
            assert_eq!(accent.publish(color).unwrap(), color);
        }
    }

    #[test]
    fn test_rejects_css_injection() {
        let accent = AccentChannel::new("#6366f1").unwrap();
        for color in ["red", "#12345", "#6366f1;}body{display:none", "", "url(x)"] {
            assert!(matches!(
                accent.publish(color),
                Err(RenderError::InvalidAccent(_))
            ));
        }
        assert_eq!(accent.current(), "#6366f1");
    }

    #[tokio::test]
    async fn test_subscribers_observe_published_color() {
        let accent = AccentChannel::new("#000").unwrap();
        let mut rx = accent.subscribe();

        accent.publish("#fff").unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), "#fff");
    }
}
