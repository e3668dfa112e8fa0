//! Explicit stage machines for backup and restore.
//!
//! Stages only move forward: the tracker asks the current stage for its
//! successor, so no stage can be skipped or re-entered. Any failure ends the
//! run in `FAILED`.

use serde::Serialize;
use std::fmt;

use crate::error::StoreError;

/// A stage in a linear operation.
pub trait Stage: Copy + PartialEq + fmt::Debug + fmt::Display {
    /// Stage entered first.
    const FIRST: Self;
    const FAILED: Self;

    /// Successor stage, or `None` for terminal stages.
    fn next(self) -> Option<Self>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackupStage {
    Connected,
    Queried,
    SchemaInferred,
    ArtifactWritten,
    Success,
    Failed,
}

impl Stage for BackupStage {
    const FIRST: Self = Self::Connected;
    const FAILED: Self = Self::Failed;

    fn next(self) -> Option<Self> {
        match self {
            Self::Connected => Some(Self::Queried),
            Self::Queried => Some(Self::SchemaInferred),
            Self::SchemaInferred => Some(Self::ArtifactWritten),
            Self::ArtifactWritten => Some(Self::Success),
            Self::Success | Self::Failed => None,
        }
    }
}

impl fmt::Display for BackupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connected => "CONNECTED",
            Self::Queried => "QUERIED",
            Self::SchemaInferred => "SCHEMA_INFERRED",
            Self::ArtifactWritten => "ARTIFACT_WRITTEN",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RestoreStage {
    ArtifactSelected,
    IdentityExtracted,
    TableEnsured,
    RecordsDecoded,
    Loaded,
    Success,
    Failed,
}

impl Stage for RestoreStage {
    const FIRST: Self = Self::ArtifactSelected;
    const FAILED: Self = Self::Failed;

    fn next(self) -> Option<Self> {
        match self {
            Self::ArtifactSelected => Some(Self::IdentityExtracted),
            Self::IdentityExtracted => Some(Self::TableEnsured),
            Self::TableEnsured => Some(Self::RecordsDecoded),
            Self::RecordsDecoded => Some(Self::Loaded),
            Self::Loaded => Some(Self::Success),
            Self::Success | Self::Failed => None,
        }
    }
}

impl fmt::Display for RestoreStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ArtifactSelected => "ARTIFACT_SELECTED",
            Self::IdentityExtracted => "IDENTITY_EXTRACTED",
            Self::TableEnsured => "TABLE_ENSURED",
            Self::RecordsDecoded => "RECORDS_DECODED",
            Self::Loaded => "LOADED",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        })
    }
}

/// Records and logs the stages an operation passes through.
#[derive(Debug)]
pub struct StageTracker<S: Stage> {
    operation: &'static str,
    visited: Vec<S>,
}

impl<S: Stage> StageTracker<S> {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            visited: Vec::new(),
        }
    }

    pub fn current(&self) -> Option<S> {
        self.visited.last().copied()
    }

    /// The stage the operation is working towards.
    pub fn pending(&self) -> Option<S> {
        match self.current() {
            None => Some(S::FIRST),
            Some(stage) => stage.next(),
        }
    }

    /// Enter the next stage. Terminal trackers stay where they are.
    pub fn advance(&mut self) -> Option<S> {
        let stage = self.pending()?;
        tracing::debug!(operation = self.operation, stage = %stage, "Stage reached");
        self.visited.push(stage);
        Some(stage)
    }

    /// Move to `FAILED`, logging which stage was not reached.
    pub fn fail(&mut self, error: &StoreError) {
        let failed_stage = self
            .pending()
            .map_or_else(|| "none".to_string(), |s| s.to_string());
        tracing::error!(
            operation = self.operation,
            failed_stage = %failed_stage,
            kind = %error.kind(),
            error = %error,
            "Operation failed"
        );
        self.visited.push(S::FAILED);
    }

    pub fn visited(&self) -> &[S] {
        &self.visited
    }

    pub fn into_visited(self) -> Vec<S> {
        self.visited
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabvault_core::CoreError;

    #[test]
    fn test_backup_stages_run_in_order() {
        let mut tracker = StageTracker::<BackupStage>::new("backup");
        while tracker.advance().is_some() {}

        assert_eq!(
            tracker.visited(),
            &[
                BackupStage::Connected,
                BackupStage::Queried,
                BackupStage::SchemaInferred,
                BackupStage::ArtifactWritten,
                BackupStage::Success,
            ]
        );
        assert_eq!(tracker.advance(), None);
    }

    #[test]
    fn test_failure_is_terminal() {
        let mut tracker = StageTracker::<RestoreStage>::new("restore");
        tracker.advance();
        assert_eq!(tracker.pending(), Some(RestoreStage::IdentityExtracted));

        tracker.fail(
            &CoreError::InvalidArtifactName {
                name: "jobs.avro".into(),
            }
            .into(),
        );
        assert_eq!(tracker.current(), Some(RestoreStage::Failed));
        assert_eq!(tracker.advance(), None);
        assert_eq!(
            tracker.into_visited(),
            vec![RestoreStage::ArtifactSelected, RestoreStage::Failed]
        );
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(RestoreStage::TableEnsured.to_string(), "TABLE_ENSURED");
        assert_eq!(
            serde_json::to_string(&BackupStage::SchemaInferred).unwrap(),
            r#""SCHEMA_INFERRED""#
        );
    }
}
