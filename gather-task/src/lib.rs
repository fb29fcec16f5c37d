//! Suspend-style processors and their drivers.
//!
//! A processor is an async body consuming a
//! shared feed of input tokens and emitting its
//! own output tokens at its own cadence: none,
//! one or many outputs per input, and possibly
//! returning before the input is exhausted.
//!
//! The body only ever suspends to ask for its
//! next input token. That makes it a plain state
//! machine from the driver's point of view, which
//! we advance by hand instead of handing it to an
//! async runtime:
//!
//! - The `Slot` is the suspension primitive, a
//!   single rendezvous between a body awaiting a
//!   value and the driver delivering it.
//! - The `Relay` turns the slot into the input
//!   stream of the body, ended by a per-run
//!   `Sentinel`.
//! - The `Process` is one running body, stepped
//!   one tick at a time.
//! - The `Adapted` wrapper lets a body written
//!   once be driven either by pushing tokens
//!   into a process, or by pulling output out of
//!   a plain iterator.
//!
//! Everything happens on the calling thread.

pub mod suspend;
pub use suspend::{NextToken, Slot};

#[doc(hidden)]
pub mod relay;
#[rustfmt::skip]
pub use relay::{
    Delivery, Feeder,
    Relay, Sentinel,
};

#[doc(hidden)]
pub mod process;
#[rustfmt::skip]
pub use process::{
    Advance, Emitter, Outcome,
    Process, State, Tick,
};

#[doc(hidden)]
pub mod adapter;
#[rustfmt::skip]
pub use adapter::{
    Adapted, Drain, Driven,
    ProcessorBody, Source, adapt,
};

#[doc(hidden)]
pub mod error;
pub use error::Error;

pub mod prelude {
    //! Prelude for processor authors.
    //!
    //! Imports the stream extension trait so that
    //! `input.next().await` works on a relay, then
    //! clobbers the name. The types still need to
    //! be imported explicitly.
    pub use futures::StreamExt as _;
}
