//! The state of one installer run.
//!
//! An [`InstallationSession`] is created at process start and passed by
//! `&mut` through the mode controller. Each component records what it
//! decided here so later components never repeat the work. Nothing is
//! persisted.

mod phase;

pub use phase::{InstallMode, Phase};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

use crate::build::BuildSpec;
use crate::locator::HostConfigLocation;
use crate::materialize::DeploymentTarget;
use crate::platform::OsProfile;
use crate::requirements::DependencyCheckResult;

/// Severity of an outcome-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeLevel {
    Info,
    Warning,
    Error,
}

/// One line of the outcome log.
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeEntry {
    pub phase: Phase,
    pub level: OutcomeLevel,
    pub message: String,
}

/// Everything decided during one run.
#[derive(Debug, Clone)]
pub struct InstallationSession {
    /// Requested mode.
    pub mode: InstallMode,
    /// Host profile, set during PROBE.
    pub profile: Option<OsProfile>,
    /// Home Assistant config directory, development only.
    pub host_config: Option<HostConfigLocation>,
    /// Dependency results in check order.
    pub results: Vec<DependencyCheckResult>,
    /// False once a hard-required tool is unresolved.
    pub can_proceed: bool,
    /// Where the add-on was deployed, development only.
    pub deployment: Option<DeploymentTarget>,
    /// The container build that was run, development only.
    pub build: Option<BuildSpec>,
    /// Current controller phase.
    pub phase: Phase,
    /// Outcome log.
    pub log: Vec<OutcomeEntry>,
    started_at: DateTime<Utc>,
}

impl InstallationSession {
    pub fn new(mode: InstallMode) -> Self {
        Self {
            mode,
            profile: None,
            host_config: None,
            results: Vec::new(),
            can_proceed: true,
            deployment: None,
            build: None,
            phase: Phase::Init,
            log: Vec::new(),
            started_at: Utc::now(),
        }
    }

    /// Move to the next phase for this session's mode.
    pub fn advance(&mut self) -> Phase {
        let next = self.phase.next(self.mode);
        tracing::info!("Phase {} -> {}", self.phase, next);
        self.phase = next;
        next
    }

    /// Enter FAILED. There is no way back out.
    pub fn fail(&mut self) {
        tracing::info!("Phase {} -> {}", self.phase, Phase::Failed);
        self.phase = Phase::Failed;
    }

    /// Append an entry for the current phase.
    pub fn record(&mut self, level: OutcomeLevel, message: impl Into<String>) {
        self.log.push(OutcomeEntry {
            phase: self.phase,
            level,
            message: message.into(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.record(OutcomeLevel::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.record(OutcomeLevel::Warning, message);
    }

    /// Log entries at a given level.
    pub fn entries(&self, level: OutcomeLevel) -> impl Iterator<Item = &OutcomeEntry> {
        self.log.iter().filter(move |e| e.level == level)
    }

    /// Time since the session started.
    pub fn elapsed(&self) -> Duration {
        Utc::now()
            .signed_duration_since(self.started_at)
            .to_std()
            .unwrap_or_default()
    }
}
