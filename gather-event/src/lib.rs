//! Multiplexing of suspend-style processors.
//!
//! This crate feeds one shared input sequence to
//! many processors built with `gather-task`, and
//! merges their output into one sequence of
//! events tagged by processor.
//!
//! Every processor gets its own relay over the
//! same logical feed, ended by one sentinel
//! shared across the run. The feed starts with
//! a priming tick, so that processors emitting
//! before reading anything get to do so first,
//! and ends with the sentinel:
//!
//! - For each tick, the live processors are
//!   advanced one by one in registration order.
//! - Each processor runs until it asks for its
//!   next token or returns, and everything it
//!   emitted meanwhile is yielded before the
//!   next processor runs.
//! - A processor that returned is never fed
//!   again, not even the sentinel.
//!
//! The resulting order is total and deterministic.
//! Processors are `!Send`, holding `Rc` state and
//! boxed as `LocalBoxFuture`, so a run always
//! executes on the calling thread.

#[doc(hidden)]
pub mod mux;
#[rustfmt::skip]
pub use mux::{
    Event, Fault, Gather, Processor,
    Run, RunError, multiplex,
};

pub mod config;
pub use config::{Config, FaultPolicy};

#[doc(hidden)]
#[cfg(test)]
pub(crate) mod testutil;
