//! Linear workflow progress.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Workflow steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    Ingested,
    Grouped,
    SuggestionsFetched,
    BulkAdded,
    Executed,
}

impl WorkflowStage {
    pub const ALL: [WorkflowStage; 5] = [
        WorkflowStage::Ingested,
        WorkflowStage::Grouped,
        WorkflowStage::SuggestionsFetched,
        WorkflowStage::BulkAdded,
        WorkflowStage::Executed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStage::Ingested => "ingested",
            WorkflowStage::Grouped => "grouped",
            WorkflowStage::SuggestionsFetched => "suggestions_fetched",
            WorkflowStage::BulkAdded => "bulk_added",
            WorkflowStage::Executed => "executed",
        }
    }

    /// One-based step number.
    pub fn step(&self) -> usize {
        *self as usize + 1
    }

    pub fn label(&self) -> &'static str {
        match self {
            WorkflowStage::Ingested => "Upload DRP",
            WorkflowStage::Grouped => "Group by domain",
            WorkflowStage::SuggestionsFetched => "Review suggestions",
            WorkflowStage::BulkAdded => "Add to study",
            WorkflowStage::Executed => "Execute",
        }
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Furthest stage reached in a session. Never moves backward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    stage: Option<WorkflowStage>,
}

impl Progress {
    pub fn stage(&self) -> Option<WorkflowStage> {
        self.stage
    }

    /// Move to `stage`. Returns false, leaving progress unchanged, when
    /// `stage` is not ahead of the current one.
    pub fn advance_to(&mut self, stage: WorkflowStage) -> bool {
        if self.stage.is_some_and(|current| stage <= current) {
            debug!(current = ?self.stage, requested = %stage, "ignoring non-forward progress");
            return false;
        }
        debug!(stage = %stage, "workflow advanced");
        self.stage = Some(stage);
        true
    }

    pub fn is_complete(&self, stage: WorkflowStage) -> bool {
        self.stage.is_some_and(|current| stage <= current)
    }

    /// Completed share of the workflow, from 0.0 to 1.0.
    pub fn fraction(&self) -> f32 {
        let done = self.stage.map_or(0, |s| s.step());
        done as f32 / WorkflowStage::ALL.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_regresses() {
        let mut progress = Progress::default();
        assert_eq!(progress.stage(), None);
        assert!(progress.advance_to(WorkflowStage::Ingested));
        assert!(progress.advance_to(WorkflowStage::BulkAdded));
        assert!(!progress.advance_to(WorkflowStage::Grouped));
        assert!(!progress.advance_to(WorkflowStage::BulkAdded));
        assert_eq!(progress.stage(), Some(WorkflowStage::BulkAdded));
        assert!(progress.is_complete(WorkflowStage::SuggestionsFetched));
        assert!(!progress.is_complete(WorkflowStage::Executed));
    }

    #[test]
    fn fraction_and_steps() {
        let mut progress = Progress::default();
        assert_eq!(progress.fraction(), 0.0);
        progress.advance_to(WorkflowStage::Executed);
        assert_eq!(progress.fraction(), 1.0);
        assert_eq!(WorkflowStage::Grouped.step(), 2);
    }
}
