use crate::suspend::Slot;
use futures::Stream;
use futures::stream::FusedStream;
use std::fmt;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

/// End-of-input marker scoped to one run.
///
/// Sentinels are compared by identity: each
/// call to [`Sentinel::new`] allocates a fresh
/// marker, and only clones of that marker are
/// considered the same sentinel.
#[derive(Clone)]
pub struct Sentinel {
    marker: Rc<()>,
}

impl Sentinel {
    pub fn new() -> Self {
        Self {
            marker: Rc::new(()),
        }
    }

    /// Whether both are the very same marker.
    pub fn is(&self, other: &Sentinel) -> bool {
        Rc::ptr_eq(&self.marker, &other.marker)
    }
}

impl Default for Sentinel {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sentinel({:p})", Rc::as_ptr(&self.marker))
    }
}

/// Value handed to a processor suspended on input.
#[derive(Debug)]
pub enum Delivery<T> {
    Token(T),
    End(Sentinel),
}

/// Suspend-driven input sequence.
///
/// Every element is obtained by one suspension
/// on the underlying slot, and the sequence ends
/// the first time the relay's own sentinel is
/// delivered. The sentinel itself is never
/// yielded, and the relay is fused afterwards.
///
/// Processors consume it through the
/// [`futures::StreamExt`] methods, typically
/// `while let Some(token) = input.next().await`.
pub struct Relay<T> {
    slot: Slot<Delivery<T>>,
    sentinel: Sentinel,
    done: bool,
}

impl<T> Relay<T> {
    pub fn new(sentinel: Sentinel) -> Self {
        Self {
            slot: Slot::new(),
            sentinel,
            done: false,
        }
    }

    /// Fetch the driver side of this relay.
    pub fn feeder(&self) -> Feeder<T> {
        Feeder {
            slot: self.slot.clone(),
            sentinel: self.sentinel.clone(),
        }
    }

    pub fn sentinel(&self) -> &Sentinel {
        &self.sentinel
    }
}

impl<T> Stream for Relay<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        match this.slot.poll_take() {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Delivery::Token(token)) => Poll::Ready(Some(token)),
            Poll::Ready(Delivery::End(sentinel)) => {
                assert!(
                    sentinel.is(&this.sentinel),
                    "Relay received a sentinel from another run.",
                );
                this.done = true;
                Poll::Ready(None)
            }
        }
    }
}

impl<T> FusedStream for Relay<T> {
    fn is_terminated(&self) -> bool {
        self.done
    }
}

/// Driver side of a [`Relay`].
pub struct Feeder<T> {
    slot: Slot<Delivery<T>>,
    sentinel: Sentinel,
}

impl<T> Feeder<T> {
    /// Whether the relay is suspended waiting
    /// for the next delivery.
    pub fn is_awaiting(&self) -> bool {
        self.slot.is_awaiting()
    }

    pub fn token(&self, token: T) {
        self.slot.deliver(Delivery::Token(token));
    }

    /// Deliver the relay's sentinel.
    pub fn end(&self) {
        self.slot.deliver(Delivery::End(self.sentinel.clone()));
    }

    pub fn sentinel(&self) -> &Sentinel {
        &self.sentinel
    }
}
