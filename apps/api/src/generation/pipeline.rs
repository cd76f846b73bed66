//! ThemeGenerator: prompt in, live `ai-generated` theme out.
//!
//! Stages: precondition → requesting → validating → sanitizing → compiling →
//! registration. Each stage failure is a `GenerationError` tagged with its
//! stage; none of them touch the registry. One job runs at a time; the job
//! slot is released by a drop guard so timeouts, cancellation, errors and
//! dropped requests all clear `busy` and leave a terminal outcome behind.
//! Cancellation is honored at any stage before registration.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::{watch, Notify};
use tracing::{info, warn};
use uuid::Uuid;

use crate::generation::error::{GenerationError, GenerationStage};
use crate::generation::sanitize::{sanitize, SanitizedSource};
use crate::llm_client::prompts::{theme_request, THEME_HOUSE_STYLE};
use crate::llm_client::{parse_reply, LlmClient};
use crate::sandbox::{compile, SandboxLimits};
use crate::themes::{GeneratedTheme, ThemeRegistry, GENERATED_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    Idle,
    Requesting,
    Validating,
    Sanitizing,
    Compiling,
}

impl JobPhase {
    fn stage(self) -> GenerationStage {
        match self {
            JobPhase::Idle => GenerationStage::Precondition,
            JobPhase::Requesting => GenerationStage::Requesting,
            JobPhase::Validating => GenerationStage::Validating,
            JobPhase::Sanitizing => GenerationStage::Sanitizing,
            JobPhase::Compiling => GenerationStage::Compiling,
        }
    }
}

/// Terminal state of the most recent job.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobOutcome {
    Ready {
        job_id: Uuid,
        component_name: String,
        finished_at: DateTime<Utc>,
    },
    Failed {
        job_id: Uuid,
        stage: GenerationStage,
        kind: &'static str,
        message: String,
        finished_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationStatus {
    pub busy: bool,
    pub phase: JobPhase,
    pub job_id: Option<Uuid>,
    pub last_outcome: Option<JobOutcome>,
}

/// Successful generation: cleaned source and the slot it was installed in.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedSource {
    pub code: String,
    pub component_name: String,
    pub theme: &'static str,
}

struct ActiveJob {
    id: Uuid,
    cancel: Arc<Notify>,
    cancelled: bool,
    /// Set once the job is about to register; cancelling is no longer possible.
    committed: bool,
}

pub struct ThemeGenerator {
    llm: Option<LlmClient>,
    registry: Arc<ThemeRegistry>,
    limits: SandboxLimits,
    job: Mutex<Option<ActiveJob>>,
    phase: watch::Sender<JobPhase>,
    last_outcome: Mutex<Option<JobOutcome>>,
}

/// Holds the single job slot; releasing it resets the phase to idle.
/// A guard dropped before an outcome was recorded (the request future was
/// abandoned) records the job as cancelled.
struct JobGuard<'a> {
    generator: &'a ThemeGenerator,
    id: Uuid,
    cancel: Arc<Notify>,
    recorded: bool,
}

impl Drop for JobGuard<'_> {
    fn drop(&mut self) {
        if !self.recorded {
            let phase = *self.generator.phase.borrow();
            warn!("Generation job {} dropped during {:?}", self.id, phase);
            let cancelled = GenerationError::Cancelled;
            *self.generator.last_outcome.lock() = Some(JobOutcome::Failed {
                job_id: self.id,
                stage: phase.stage(),
                kind: cancelled.kind(),
                message: cancelled.to_string(),
                finished_at: Utc::now(),
            });
        }
        self.generator.job.lock().take();
        self.generator.phase.send_replace(JobPhase::Idle);
    }
}

impl ThemeGenerator {
    /// `llm` is `None` when no API key is configured; every request then
    /// fails with `MissingCredential`.
    pub fn new(llm: Option<LlmClient>, registry: Arc<ThemeRegistry>, limits: SandboxLimits) -> Self {
        let (phase, _) = watch::channel(JobPhase::Idle);
        Self {
            llm,
            registry,
            limits,
            job: Mutex::new(None),
            phase,
            last_outcome: Mutex::new(None),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.llm.is_some()
    }

    pub fn status(&self) -> GenerationStatus {
        let job_id = self.job.lock().as_ref().map(|job| job.id);
        GenerationStatus {
            busy: job_id.is_some(),
            phase: *self.phase.borrow(),
            job_id,
            last_outcome: self.last_outcome.lock().clone(),
        }
    }

    #[cfg(test)]
    pub fn subscribe_phase(&self) -> watch::Receiver<JobPhase> {
        self.phase.subscribe()
    }

    /// Cancels the in-flight job. Returns whether a job was running and had
    /// not yet started registering its theme; a `true` answer guarantees the
    /// job ends as `Cancelled`.
    pub fn cancel(&self) -> bool {
        match self.job.lock().as_mut() {
            Some(job) if !job.committed => {
                info!("Cancelling generation job {}", job.id);
                job.cancelled = true;
                job.cancel.notify_one();
                true
            }
            _ => false,
        }
    }

    /// Runs one generation job end to end.
    ///
    /// Precondition failures (`EmptyPrompt`, `MissingCredential`, `Busy`) are
    /// returned without starting a job; every other outcome is recorded.
    pub async fn generate(&self, prompt: &str) -> Result<GeneratedSource, GenerationError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(GenerationError::EmptyPrompt);
        }
        let llm = self.llm.as_ref().ok_or(GenerationError::MissingCredential)?;
        let mut guard = self.begin()?;

        info!("Generation job {} started (model: {})", guard.id, llm.model());
        let result = self.run(llm, prompt, &guard).await;

        let finished_at = Utc::now();
        let outcome = match &result {
            Ok(source) => {
                info!("Generation job {} ready: {}", guard.id, source.component_name);
                JobOutcome::Ready {
                    job_id: guard.id,
                    component_name: source.component_name.clone(),
                    finished_at,
                }
            }
            Err(e) => {
                // a cancellation is reported against the stage it interrupted
                let stage = match e {
                    GenerationError::Cancelled => self.phase.borrow().stage(),
                    _ => e.stage(),
                };
                warn!("Generation job {} failed at {:?}: {e}", guard.id, stage);
                JobOutcome::Failed {
                    job_id: guard.id,
                    stage,
                    kind: e.kind(),
                    message: e.to_string(),
                    finished_at,
                }
            }
        };
        *self.last_outcome.lock() = Some(outcome);
        guard.recorded = true;

        result
    }

    fn begin(&self) -> Result<JobGuard<'_>, GenerationError> {
        let mut slot = self.job.lock();
        if slot.is_some() {
            return Err(GenerationError::Busy);
        }
        let id = Uuid::new_v4();
        let cancel = Arc::new(Notify::new());
        *slot = Some(ActiveJob {
            id,
            cancel: cancel.clone(),
            cancelled: false,
            committed: false,
        });
        Ok(JobGuard {
            generator: self,
            id,
            cancel,
            recorded: false,
        })
    }

    /// Moves to `phase` unless the job has been cancelled.
    fn enter(&self, phase: JobPhase) -> Result<(), GenerationError> {
        self.ensure_not_cancelled()?;
        self.phase.send_replace(phase);
        Ok(())
    }

    fn ensure_not_cancelled(&self) -> Result<(), GenerationError> {
        match self.job.lock().as_ref() {
            Some(job) if job.cancelled => Err(GenerationError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Last cancellation point: after this, `cancel` reports `false`.
    fn commit(&self) -> Result<(), GenerationError> {
        let mut slot = self.job.lock();
        match slot.as_mut() {
            Some(job) if job.cancelled => Err(GenerationError::Cancelled),
            Some(job) => {
                job.committed = true;
                Ok(())
            }
            None => Ok(()),
        }
    }

    async fn run(
        &self,
        llm: &LlmClient,
        prompt: &str,
        job: &JobGuard<'_>,
    ) -> Result<GeneratedSource, GenerationError> {
        self.enter(JobPhase::Requesting)?;
        let request = llm.build_request(THEME_HOUSE_STYLE, &theme_request(prompt));
        let reply = tokio::select! {
            reply = llm.send(&request) => reply?,
            _ = job.cancel.notified() => return Err(GenerationError::Cancelled),
        };

        self.enter(JobPhase::Validating)?;
        let content = parse_reply(&reply)?;

        self.enter(JobPhase::Sanitizing)?;
        let source = sanitize(&content)?;

        self.enter(JobPhase::Compiling)?;
        let component = {
            let code = source.code.clone();
            let name = source.component_name.clone();
            let limits = self.limits.clone();
            tokio::task::spawn_blocking(move || compile(&code, &name, &limits))
                .await
                .map_err(|e| GenerationError::TranspileError(format!("compile task failed: {e}")))??
        };

        self.commit()?;
        let SanitizedSource {
            code,
            component_name,
        } = source.clone();
        self.registry.install_generated(GeneratedTheme::new(
            job.id,
            source,
            component,
            self.limits.clone(),
        ));

        Ok(GeneratedSource {
            code,
            component_name,
            theme: GENERATED_KEY,
        })
    }
}
