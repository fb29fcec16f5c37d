//! Cooperative stream processing.
//!
//! A handful of independent processors consume
//! one shared input feed, each producing its own
//! output at its own cadence, all interleaved on
//! the calling thread:
//!
//! ```
//! use gather::prelude::*;
//! use gather::task::{Emitter, Relay, adapt};
//!
//! async fn shout(mut input: Relay<String>, output: Emitter<String>) -> anyhow::Result<()> {
//!     while let Some(line) = input.next().await {
//!         output.emit(line.to_uppercase());
//!     }
//!     Ok(())
//! }
//!
//! async fn count(mut input: Relay<String>, output: Emitter<String>) -> anyhow::Result<()> {
//!     let mut n = 0;
//!     while input.next().await.is_some() {
//!         n += 1;
//!     }
//!     output.emit(n.to_string());
//!     Ok(())
//! }
//!
//! let inputs = vec!["hi".to_string(), "there".to_string()];
//! let events: Vec<_> = gather::multiplex([adapt(shout), adapt(count)], inputs)
//!     .map(|event| {
//!         let event = event.unwrap();
//!         (event.processor, event.payload)
//!     })
//!     .collect();
//! assert_eq!(
//!     events,
//!     vec![
//!         (0, "HI".to_string()),
//!         (0, "THERE".to_string()),
//!         (1, "2".to_string()),
//!     ],
//! );
//! ```
//!
//! The same processor body can also be pulled
//! over a plain sequence without a multiplexer:
//!
//! ```
//! # use gather::prelude::*;
//! # use gather::task::{Emitter, Relay, adapt};
//! # async fn shout(mut input: Relay<String>, output: Emitter<String>) -> anyhow::Result<()> {
//! #     while let Some(line) = input.next().await {
//! #         output.emit(line.to_uppercase());
//! #     }
//! #     Ok(())
//! # }
//! let out: Vec<String> = adapt(shout)
//!     .drain(vec!["quiet".to_string()])
//!     .map(Result::unwrap)
//!     .collect();
//! assert_eq!(out, vec!["QUIET"]);
//! ```

pub use gather_event as event;
pub use gather_task as task;

pub use gather_event::{Config, Event, FaultPolicy, Gather, Run, RunError, multiplex};
pub use gather_task::{Adapted, Emitter, Relay, adapt};

pub mod prelude {
    //! Prelude to making life easy for processor
    //! authors.
    //!
    //! See [`gather_task::prelude`].
    pub use gather_task::prelude::*;
}
