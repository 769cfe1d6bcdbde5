//! GearForge Search Engine
//!
//! This crate provides the loadout search:
//! - Candidate pools and the immutable search snapshot
//! - Level-ordered enumeration with incremental stat accumulation
//! - Illegal set tracking
//! - Top-K result tracking
//! - Termination conditions
//! - Partitioning, worker threads and the orchestrator
//! - Event system for monitoring

pub mod event;
pub mod illegal_set;
pub mod level;
pub mod message;
pub mod orchestrator;
pub mod partition;
pub mod pool;
pub mod snapshot;
pub mod stats;
pub mod termination;
pub mod top_k;
pub mod worker;

pub use event::{
    CountingSearchListener, LoggingSearchListener, SearchEventSupport, SearchListener,
    SearchProgress,
};
pub use illegal_set::IllegalSetTracker;
pub use level::{Dimension, LevelEnumerator, LevelVisitor};
pub use message::{WorkItem, WorkerCommand, WorkerEvent};
pub use orchestrator::{GearSearch, SearchOutcome, SearchResult};
pub use partition::{plan_partitions, Partition, PartitionTarget};
pub use pool::{item_allowed, item_heuristic, ItemPools};
pub use snapshot::{SearchRequest, SearchSnapshot, DEFAULT_CHARACTER_LEVEL};
pub use stats::{SearchStatistics, WorkerStats};
pub use termination::{
    search_termination, ExternalTermination, LeafCountTermination, OrTermination,
    SearchTermination, Termination, TerminationScope, TimeTermination,
};
pub use top_k::{CandidateResult, TopK, TOP_K};
pub use worker::{PartitionReport, WorkerEngine};
