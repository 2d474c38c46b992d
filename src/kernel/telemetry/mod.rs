//! Turn-taking instrumentation.
//!
//! # SAFETY INVARIANT
//! Telemetry is a READ-ONLY side-effect layer.
//! It must **NEVER** be read inside decision logic (Reactor, Executor, Interpreter).
//! It exists solely for observability and verification.
//!
//! # PRIVACY INVARIANT
//! Telemetry events must **NEVER** contain user content (utterances, queries, result text).
//! Only tickets, phases, kinds and counts are allowed.

pub mod event;
pub mod metrics;
pub mod recorder;
