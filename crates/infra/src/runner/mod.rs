//! Scheduled agent execution.
//!
//! Runs happen on a dedicated thread; failures are isolated per clinic and
//! never reach request handling.

pub mod daily;
pub mod sink;

pub use daily::{DailyAgentRunner, DailyAgentRunnerHandle, RunWindow, SweepSummary, sweep};
pub use sink::{AgentReportSink, InMemoryAgentReportSink, LogReportSink};
