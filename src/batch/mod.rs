//! Batch Coordinator and Result Persistence (components C7/C8, §4.8/§4.9).

mod dispatch;

pub mod coordinator;
pub mod engine;
pub mod store;

#[cfg(feature = "parallel")]
pub mod parallel;

pub use coordinator::{BatchOptions, BatchSummary, Selector};
pub use engine::AuditEngine;
pub use store::{AuditResultStore, InMemoryResultStore, Page, PagedResults, ResultFilter};
