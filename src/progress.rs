//! Analysis progress
//!
//! Progress is a finite-state machine advanced by real milestones of the
//! request (prepared, sent, response received), never by a timer. The
//! analyzing stage is indeterminate: the backend reports no partial progress.
//!
//! ```text
//! Idle -> Preparing -> Uploading -> Analyzing -> Completed
//!             \            \            \
//!              +------------+------------+-> Failed
//! ```
//!
//! `Reset` returns any stage to `Idle`, which is how a new analysis starts.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    /// Reading files, building the request
    Preparing,
    /// Request body in flight
    Uploading,
    /// Waiting on the backend
    Analyzing,
    Completed,
    Failed,
}

impl Stage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Completed | Stage::Failed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Idle => "Waiting",
            Stage::Preparing => "Preparing conversation",
            Stage::Uploading => "Uploading",
            Stage::Analyzing => "Analyzing",
            Stage::Completed => "Done",
            Stage::Failed => "Failed",
        }
    }
}

/// Checklist steps, in order
pub const CHECKLIST: [Stage; 4] = [
    Stage::Preparing,
    Stage::Uploading,
    Stage::Analyzing,
    Stage::Completed,
];

/// Events reported by the client as a request advances
#[derive(Debug, Clone, PartialEq)]
pub enum Milestone {
    Started,
    Prepared,
    Sent,
    Received,
    Failed(String),
    Reset,
}

#[derive(Error, Debug, PartialEq)]
#[error("Milestone {milestone:?} is not valid in stage {stage:?}")]
pub struct ProgressError {
    pub stage: Stage,
    pub milestone: Milestone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Done,
    Active,
    Pending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisProgress {
    stage: Stage,
    failure: Option<String>,
    /// Furthest non-terminal stage reached, for the checklist after a failure
    reached: Stage,
}

impl Default for AnalysisProgress {
    fn default() -> Self {
        Self {
            stage: Stage::Idle,
            failure: None,
            reached: Stage::Idle,
        }
    }
}

impl AnalysisProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Apply a milestone, rejecting out-of-order events
    pub fn advance(&mut self, milestone: Milestone) -> Result<Stage, ProgressError> {
        let next = match (self.stage, &milestone) {
            (_, Milestone::Reset) => Some(Stage::Idle),
            (Stage::Idle, Milestone::Started) => Some(Stage::Preparing),
            (Stage::Preparing, Milestone::Prepared) => Some(Stage::Uploading),
            (Stage::Uploading, Milestone::Sent) => Some(Stage::Analyzing),
            (Stage::Analyzing, Milestone::Received) => Some(Stage::Completed),
            (stage, Milestone::Failed(_)) if !stage.is_terminal() && stage != Stage::Idle => {
                Some(Stage::Failed)
            }
            _ => None,
        };

        let Some(next) = next else {
            return Err(ProgressError {
                stage: self.stage,
                milestone,
            });
        };

        match milestone {
            Milestone::Reset => {
                self.failure = None;
                self.reached = Stage::Idle;
            }
            Milestone::Failed(reason) => self.failure = Some(reason),
            _ => self.reached = next,
        }
        self.stage = next;
        Ok(next)
    }

    /// Fraction done, `None` while the backend is working
    pub fn fraction(&self) -> Option<f32> {
        match self.stage {
            Stage::Idle => Some(0.0),
            Stage::Preparing => Some(0.1),
            Stage::Uploading => Some(0.3),
            Stage::Analyzing => None,
            Stage::Completed => Some(1.0),
            Stage::Failed => None,
        }
    }

    /// State of every checklist step
    pub fn checklist(&self) -> Vec<(Stage, StepState)> {
        let position = |stage: Stage| CHECKLIST.iter().position(|s| *s == stage);
        let reached = position(self.reached);

        CHECKLIST
            .iter()
            .enumerate()
            .map(|(i, step)| {
                let state = match (self.stage, reached) {
                    (Stage::Completed, _) => StepState::Done,
                    (_, None) => StepState::Pending,
                    (Stage::Failed, Some(r)) if i < r => StepState::Done,
                    (Stage::Failed, Some(_)) => StepState::Pending,
                    (_, Some(r)) if i < r => StepState::Done,
                    (_, Some(r)) if i == r => StepState::Active,
                    _ => StepState::Pending,
                };
                (*step, state)
            })
            .collect()
    }
}

/// Publishes progress snapshots to any number of watchers
///
/// Owned by whoever starts the analysis. Clones share one channel; once the
/// last clone is dropped, receivers see it close and nothing can update a
/// screen that is gone.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    tx: Arc<watch::Sender<AnalysisProgress>>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AnalysisProgress::new());
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<AnalysisProgress> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> AnalysisProgress {
        self.tx.borrow().clone()
    }

    /// Apply a milestone; invalid ones are logged and dropped
    pub fn report(&self, milestone: Milestone) {
        let mut rejected = None;
        self.tx.send_if_modified(|progress| match progress.advance(milestone.clone()) {
            Ok(_) => true,
            Err(e) => {
                rejected = Some(e);
                false
            }
        });

        if let Some(e) = rejected {
            tracing::warn!(error = %e, "Ignoring progress milestone");
        }
    }

    /// Prepare for a new analysis
    pub fn restart(&self) {
        self.report(Milestone::Reset);
        self.report(Milestone::Started);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut progress = AnalysisProgress::new();
        assert_eq!(progress.advance(Milestone::Started).unwrap(), Stage::Preparing);
        assert_eq!(progress.advance(Milestone::Prepared).unwrap(), Stage::Uploading);
        assert_eq!(progress.advance(Milestone::Sent).unwrap(), Stage::Analyzing);
        assert_eq!(progress.fraction(), None);
        assert_eq!(progress.advance(Milestone::Received).unwrap(), Stage::Completed);
        assert_eq!(progress.fraction(), Some(1.0));
        assert!(progress
            .checklist()
            .iter()
            .all(|(_, state)| *state == StepState::Done));
    }

    #[test]
    fn test_out_of_order_rejected() {
        let mut progress = AnalysisProgress::new();
        let err = progress.advance(Milestone::Received).unwrap_err();
        assert_eq!(err.stage, Stage::Idle);

        progress.advance(Milestone::Started).unwrap();
        assert!(progress.advance(Milestone::Sent).is_err());
        assert_eq!(progress.stage(), Stage::Preparing);
    }

    #[test]
    fn test_failure_keeps_reason_and_reset_clears() {
        let mut progress = AnalysisProgress::new();
        progress.advance(Milestone::Started).unwrap();
        progress.advance(Milestone::Prepared).unwrap();
        progress
            .advance(Milestone::Failed("connection refused".into()))
            .unwrap();

        assert_eq!(progress.stage(), Stage::Failed);
        assert_eq!(progress.failure(), Some("connection refused"));
        assert!(progress.advance(Milestone::Received).is_err());

        let checklist = progress.checklist();
        assert_eq!(checklist[0], (Stage::Preparing, StepState::Done));
        assert_eq!(checklist[1], (Stage::Uploading, StepState::Pending));

        progress.advance(Milestone::Reset).unwrap();
        assert_eq!(progress, AnalysisProgress::new());
    }

    #[test]
    fn test_checklist_marks_active_step() {
        let mut progress = AnalysisProgress::new();
        progress.advance(Milestone::Started).unwrap();
        progress.advance(Milestone::Prepared).unwrap();

        let states: Vec<_> = progress.checklist().into_iter().map(|(_, s)| s).collect();
        assert_eq!(
            states,
            vec![
                StepState::Done,
                StepState::Active,
                StepState::Pending,
                StepState::Pending
            ]
        );
    }

    #[tokio::test]
    async fn test_tracker_publishes_snapshots() {
        let tracker = ProgressTracker::new();
        let mut rx = tracker.subscribe();

        tracker.restart();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().stage(), Stage::Preparing);

        tracker.report(Milestone::Received);
        assert!(!rx.has_changed().unwrap());

        drop(tracker);
        assert!(rx.changed().await.is_err());
    }
}
