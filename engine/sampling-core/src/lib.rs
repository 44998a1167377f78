//! Core types and collaborator contracts for statistical path sampling.
//!
//! An execution engine walks a branching program one sampled path at a time.
//! At every decision point it offers a set of eligible choices; at the end of
//! the path it reports an outcome class. This crate holds everything the
//! engine and the sampling core need to agree on:
//!
//! - `Path` / `DecisionTrace`: the choices taken so far (with branching widths)
//! - `DecisionPoint`: a live decision handle the strategy selects a choice on
//! - `ExecutionContext`: read-only view of the running path
//! - `RewardFunction` / `PathQuantifier`: injected reward and path-volume
//! - `SamplingResult`: best result per outcome class
//! - `TerminationStrategy`: clean stop condition, checked once per sample
//! - `AnalysisObserver`: run-level event sink (`SampleStatistics` included)

pub mod context;
pub mod decision;
pub mod error;
pub mod observer;
pub mod outcome;
pub mod path;
pub mod result;
pub mod snapshot;
pub mod statistics;
pub mod termination;

// Re-export main types for convenience
pub use context::{DepthReward, ExecutionContext, PathQuantifier, RewardFunction, UnitVolume};
pub use decision::{DecisionKind, DecisionPoint};
pub use error::CoreError;
pub use observer::{AnalysisObserver, SampleEvent};
pub use outcome::OutcomeClass;
pub use path::{Choice, DecisionTrace, Path, PathStep, ROOT_CHOICE};
pub use result::{BestResult, SamplingResult};
pub use snapshot::StateSnapshot;
pub use statistics::{SampleStatistics, SampleStatisticsSnapshot};
pub use termination::{SampleSizeTermination, TerminationStrategy};
