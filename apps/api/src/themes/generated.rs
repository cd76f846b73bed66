use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::generation::sanitize::SanitizedSource;
use crate::models::profile::ProfileDocument;
use crate::sandbox::{CompiledComponent, SandboxLimits};

use super::{RenderError, Theme, GENERATED_KEY};

/// The live AI theme: compiled component plus the cleaned source it came from.
#[derive(Debug, Clone)]
pub struct GeneratedTheme {
    pub job_id: Uuid,
    pub created_at: DateTime<Utc>,
    source: SanitizedSource,
    component: CompiledComponent,
    limits: SandboxLimits,
}

impl GeneratedTheme {
    pub fn new(
        job_id: Uuid,
        source: SanitizedSource,
        component: CompiledComponent,
        limits: SandboxLimits,
    ) -> Self {
        Self {
            job_id,
            created_at: Utc::now(),
            source,
            component,
            limits,
        }
    }

    pub fn source(&self) -> &SanitizedSource {
        &self.source
    }

    pub fn component_name(&self) -> &str {
        self.component.name()
    }
}

impl Theme for GeneratedTheme {
    fn key(&self) -> &str {
        GENERATED_KEY
    }

    /// Blocks for up to the sandbox timeout; call from a blocking context.
    fn render(&self, profile: &ProfileDocument) -> Result<String, RenderError> {
        let profile_json = serde_json::to_string(profile)?;
        Ok(self.component.render(&profile_json, &self.limits)?)
    }
}
