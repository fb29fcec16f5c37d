//! Processor instances and their state machine.
//!
//! A processor body is an ordinary future that
//! suspends only when it asks its relay for the
//! next input token. The [`Process`] wraps that
//! future together with the driver side of the
//! relay and the output buffer, and advances it
//! one delivery at a time.
//!
//! This is the manual-stepping half of the
//! crate. Most callers reach it through the
//! bridging adapter or the multiplexer instead
//! of constructing it directly.

use crate::error::Error;
use crate::relay::Feeder;
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use futures::task::noop_waker_ref;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::task::{Context, Poll};

/// Output side handed to a processor body.
///
/// Emitting never suspends: values are queued
/// and collected by the driver after each step,
/// in the order they were emitted.
pub struct Emitter<U> {
    queue: Rc<RefCell<VecDeque<U>>>,
}

impl<U> Clone for Emitter<U> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
        }
    }
}

impl<U> Emitter<U> {
    pub(crate) fn new() -> Self {
        Self {
            queue: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    pub fn emit(&self, value: U) {
        self.queue.borrow_mut().push_back(value);
    }

    fn drain(&self) -> Vec<U> {
        self.queue.borrow_mut().drain(..).collect()
    }
}

/// One element of the feed a process is driven by.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tick<T> {
    /// Let the process run up to its first input
    /// request without delivering anything.
    Prime,
    Token(T),
    /// Deliver the relay's sentinel.
    End,
}

/// Suspension state of a process.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum State {
    /// Created but never polled.
    Ready,

    /// Suspended on its relay, waiting for
    /// the next delivery.
    Awaiting,

    /// Completed, failed, or dropped out by
    /// protocol violation. It will never be
    /// polled again.
    Terminated,
}

/// How a single step ended.
#[derive(Debug)]
pub enum Outcome {
    Awaiting,
    Terminated,
    Failed(Error),
}

/// Result of advancing a process by one tick.
///
/// The events emitted during the step are kept
/// even when the step fails, so that output
/// produced before a failure stays valid.
#[derive(Debug)]
pub struct Advance<U> {
    pub events: Vec<U>,
    pub outcome: Outcome,
}

impl<U> Advance<U> {
    fn idle(outcome: Outcome) -> Self {
        Self {
            events: Vec::new(),
            outcome,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self.outcome, Outcome::Awaiting)
    }

    /// Split the step into its events and the
    /// failure, if any.
    pub fn into_result(self) -> (Vec<U>, Result<bool, Error>) {
        let live = match self.outcome {
            Outcome::Awaiting => Ok(true),
            Outcome::Terminated => Ok(false),
            Outcome::Failed(error) => Err(error),
        };
        (self.events, live)
    }
}

/// Runtime instance of one processor.
pub struct Process<T, U> {
    future: Option<LocalBoxFuture<'static, anyhow::Result<()>>>,
    feeder: Feeder<T>,
    output: Emitter<U>,
    state: State,
    ended: bool,
}

impl<T, U> Process<T, U> {
    pub(crate) fn new(
        future: LocalBoxFuture<'static, anyhow::Result<()>>,
        feeder: Feeder<T>,
        output: Emitter<U>,
    ) -> Self {
        Self {
            future: Some(future),
            feeder,
            output,
            state: State::Ready,
            ended: false,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_live(&self) -> bool {
        self.state != State::Terminated
    }

    /// Advance the process by one tick.
    ///
    /// A process that has not been started is
    /// primed before any token is delivered, and
    /// priming an already started process does
    /// nothing. Ticks sent to a terminated
    /// process are ignored.
    pub fn advance(&mut self, tick: Tick<T>) -> Advance<U> {
        if self.state == State::Terminated {
            return Advance::idle(Outcome::Terminated);
        }
        if self.state == State::Ready {
            let outcome = self.poll();
            if self.state == State::Terminated {
                // XXX: a process terminating while being
                // primed never sees the tick, which is the
                // same as terminating before it.
                return self.collect(outcome);
            }
        }

        match tick {
            Tick::Prime => return self.collect(Outcome::Awaiting),
            Tick::Token(token) => self.feeder.token(token),
            Tick::End => {
                self.ended = true;
                self.feeder.end();
            }
        }
        let outcome = self.poll();
        self.collect(outcome)
    }

    /// Run the process up to its first input request.
    pub fn start(&mut self) -> Advance<U> {
        self.advance(Tick::Prime)
    }

    pub fn push(&mut self, token: T) -> Advance<U> {
        self.advance(Tick::Token(token))
    }

    /// Deliver the end of input.
    pub fn finish(&mut self) -> Advance<U> {
        self.advance(Tick::End)
    }

    fn collect(&self, outcome: Outcome) -> Advance<U> {
        Advance {
            events: self.output.drain(),
            outcome,
        }
    }

    fn poll(&mut self) -> Outcome {
        let Some(future) = self.future.as_mut() else {
            return Outcome::Terminated;
        };
        let mut cx = Context::from_waker(noop_waker_ref());
        let outcome = match future.poll_unpin(&mut cx) {
            Poll::Ready(Ok(())) => Outcome::Terminated,
            Poll::Ready(Err(err)) => Outcome::Failed(Error::Failed(err)),
            Poll::Pending if self.ended => Outcome::Failed(Error::Unterminated),
            Poll::Pending if self.feeder.is_awaiting() => Outcome::Awaiting,
            Poll::Pending => Outcome::Failed(Error::ForeignSuspension),
        };
        match outcome {
            Outcome::Awaiting => self.state = State::Awaiting,
            _ => {
                self.state = State::Terminated;
                self.future = None;
            }
        }
        outcome
    }
}
