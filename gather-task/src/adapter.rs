//! Bridging adapter between calling conventions.
//!
//! A processor body is written once, in push
//! style: it awaits tokens from a [`Relay`] and
//! emits values through an [`Emitter`]. The
//! [`Adapted`] wrapper lets the same body be
//! driven two ways, selected by the kind of
//! [`Source`] it is called with:
//!
//! - A suspend-driven [`Relay`] is passed through
//!   unchanged, and the caller pushes tokens into
//!   the resulting [`Process`] one at a time.
//! - A plain iterator is wrapped into a relay whose
//!   every suspension is answered immediately, and
//!   the result is unwrapped into an ordinary lazy
//!   iterator, the [`Drain`].
//!
//! Both ways produce the same output in the same
//! order. The choice is a calling convention only.

use crate::error::Error;
use crate::process::{Emitter, Outcome, Process, State, Tick};
use crate::relay::{Relay, Sentinel};
use futures::future::LocalBoxFuture;
use std::collections::VecDeque;
use std::rc::Rc;

/// Processor body trait that is dyn-compatible.
///
/// A bare AsyncFn(Relay, Emitter) is not
/// dyn-compatible, but processors of different
/// bodies must be stored side by side, so we pay
/// the price of boxing the futures.
pub trait ProcessorBody<T, U> {
    fn call_boxed(
        &self,
        input: Relay<T>,
        output: Emitter<U>,
    ) -> LocalBoxFuture<'static, anyhow::Result<()>>;
}

struct Body<F> {
    f: Rc<F>,
}

impl<T, U, F> ProcessorBody<T, U> for Body<F>
where
    F: AsyncFn(Relay<T>, Emitter<U>) -> anyhow::Result<()> + 'static,
    T: 'static,
    U: 'static,
{
    fn call_boxed(
        &self,
        input: Relay<T>,
        output: Emitter<U>,
    ) -> LocalBoxFuture<'static, anyhow::Result<()>> {
        // The outer future owns a handle to the body,
        // so the call future may borrow it freely.
        let f = self.f.clone();
        Box::pin(async move { (f)(input, output).await })
    }
}

/// Input argument of an adapted processor.
pub enum Source<T> {
    /// Ready-made sequence that never suspends.
    Plain(Box<dyn Iterator<Item = T>>),

    /// Live feed driven by suspension.
    Suspended(Relay<T>),
}

impl<T> Source<T> {
    pub fn plain<I>(iterable: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Source::Plain(Box::new(iterable.into_iter()))
    }
}

impl<T> From<Relay<T>> for Source<T> {
    fn from(relay: Relay<T>) -> Self {
        Source::Suspended(relay)
    }
}

impl<T: 'static> From<Vec<T>> for Source<T> {
    fn from(tokens: Vec<T>) -> Self {
        Source::plain(tokens)
    }
}

/// Output of an adapted processor, matching
/// the kind of [`Source`] it was called with.
pub enum Driven<T, U> {
    Plain(Drain<T, U, Box<dyn Iterator<Item = T>>>),
    Suspended(Process<T, U>),
}

impl<T, U> Driven<T, U> {
    pub fn is_suspended(&self) -> bool {
        matches!(self, Driven::Suspended(_))
    }
}

/// Processor body adapted for both calling conventions.
pub struct Adapted<T, U> {
    body: Rc<dyn ProcessorBody<T, U>>,
}

impl<T, U> Clone for Adapted<T, U> {
    fn clone(&self) -> Self {
        Self {
            body: self.body.clone(),
        }
    }
}

/// Adapt a push-style processor body.
///
/// The body may be an `async fn` item or an
/// async closure taking the input relay and
/// the output emitter.
pub fn adapt<T, U, F>(body: F) -> Adapted<T, U>
where
    F: AsyncFn(Relay<T>, Emitter<U>) -> anyhow::Result<()> + 'static,
    T: 'static,
    U: 'static,
{
    Adapted {
        body: Rc::new(Body { f: Rc::new(body) }),
    }
}

impl<T, U> Adapted<T, U>
where
    T: 'static,
    U: 'static,
{
    /// Invoke the processor on either kind of input.
    pub fn call<S>(&self, source: S) -> Driven<T, U>
    where
        S: Into<Source<T>>,
    {
        match source.into() {
            Source::Suspended(relay) => Driven::Suspended(self.process(relay)),
            Source::Plain(iterator) => Driven::Plain(self.drain(iterator)),
        }
    }

    /// Instantiate the processor over a live relay.
    ///
    /// Nothing runs until the returned process is
    /// advanced by its driver.
    pub fn process(&self, relay: Relay<T>) -> Process<T, U> {
        let feeder = relay.feeder();
        let output = Emitter::new();
        let future = self.body.call_boxed(relay, output.clone());
        Process::new(future, feeder, output)
    }

    /// Run the processor over a plain sequence,
    /// as a lazy iterator of its output.
    pub fn drain<I>(&self, input: I) -> Drain<T, U, I::IntoIter>
    where
        I: IntoIterator<Item = T>,
    {
        Drain {
            process: self.process(Relay::new(Sentinel::new())),
            input: input.into_iter(),
            pending: VecDeque::new(),
            error: None,
        }
    }
}

/// Synchronous unwrapping of a processor.
///
/// Each call to `next` yields buffered output
/// first, and only when the buffer is empty
/// advances the processor by one step, pulling
/// one input element if the processor asks for
/// it. Input is no longer pulled once the
/// processor terminates.
pub struct Drain<T, U, I> {
    process: Process<T, U>,
    input: I,
    pending: VecDeque<U>,
    error: Option<Error>,
}

impl<T, U, I> Iterator for Drain<T, U, I>
where
    I: Iterator<Item = T>,
{
    type Item = Result<U, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(value) = self.pending.pop_front() {
                return Some(Ok(value));
            }
            if let Some(error) = self.error.take() {
                return Some(Err(error));
            }
            let tick = match self.process.state() {
                State::Terminated => return None,
                State::Ready => Tick::Prime,
                State::Awaiting => match self.input.next() {
                    Some(token) => Tick::Token(token),
                    None => Tick::End,
                },
            };
            let advance = self.process.advance(tick);
            self.pending.extend(advance.events);
            if let Outcome::Failed(error) = advance.outcome {
                self.error = Some(error);
            }
        }
    }
}
