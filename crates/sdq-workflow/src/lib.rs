//! Scenario workflow state.
//!
//! A [`Session`] takes a DRP batch through grouping, backend suggestions and
//! study assembly, tracking [`Progress`] that only moves forward. The
//! [`LiveEditor`] regenerates text and code while a description is edited
//! and drops backend responses that a newer edit has superseded.

pub mod error;
pub mod group;
pub mod live;
pub mod progress;
pub mod recommend;
pub mod session;
pub mod study;
pub mod view;

pub use error::{Result, WorkflowError};
pub use group::group_by_domain;
pub use live::{LiveEdit, LiveEditor, LiveState, RemoteOutcome, RequestToken, UpdateSource};
pub use progress::{Progress, WorkflowStage};
pub use recommend::{Recommendation, SearchFilter, recommend, search};
pub use session::{ScenarioEdit, Session};
pub use study::{StudyScenario, local_suggestion};
pub use view::{Badge, BadgeKind, ScenarioView};
