use std::sync::Arc;

use crate::config::Config;
use crate::generation::ThemeGenerator;
use crate::profiles::ProfileStore;
use crate::render::{AccentChannel, Renderer};
use crate::themes::ThemeRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub registry: Arc<ThemeRegistry>,
    /// Single-job generation pipeline; writes the registry's generated slot.
    pub generator: Arc<ThemeGenerator>,
    pub renderer: Renderer,
    pub accent: AccentChannel,
    pub profiles: Arc<ProfileStore>,
}
