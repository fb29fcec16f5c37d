//! The suspension primitive.
//!
//! A processor asks for its next input by
//! awaiting [`Slot::next`]. The returned
//! future is pending exactly once: the first
//! poll marks the slot as awaiting and yields
//! control back to the driver, the driver then
//! deposits a value with [`Slot::deliver`] and
//! polls the processor again, which resolves
//! the future with exactly that value.
//!
//! No waker is ever registered. The driver is
//! the sole resumer of the processor, and it
//! always polls synchronously after delivery.

use std::cell::RefCell;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

enum State<V> {
    Idle,
    Awaiting,
    Delivered(V),
}

/// Rendezvous between one processor and its driver.
///
/// Cloning the slot shares the same rendezvous,
/// which is how the processor side and the
/// driver side are connected.
pub struct Slot<V> {
    state: Rc<RefCell<State<V>>>,
}

impl<V> Clone for Slot<V> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<V> Default for Slot<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Slot<V> {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(State::Idle)),
        }
    }

    /// Await the next value from the driver.
    ///
    /// Each call creates a fresh one-shot
    /// suspension point, so the slot can be
    /// awaited repeatedly over its lifetime.
    pub fn next(&self) -> NextToken<'_, V> {
        NextToken { slot: self }
    }

    /// Whether the processor is suspended on
    /// this slot, waiting for a delivery.
    pub fn is_awaiting(&self) -> bool {
        matches!(*self.state.borrow(), State::Awaiting)
    }

    /// Deposit the value the suspended processor
    /// resumes with on its next poll.
    ///
    /// Delivering to a slot nobody is waiting on
    /// would silently overwrite or strand the
    /// value, so it is treated as a driver bug.
    pub fn deliver(&self, value: V) {
        let mut state = self.state.borrow_mut();
        assert!(
            matches!(*state, State::Awaiting),
            "Delivering to a slot that is not awaiting.",
        );
        *state = State::Delivered(value);
    }

    pub(crate) fn poll_take(&self) -> Poll<V> {
        let mut state = self.state.borrow_mut();
        match std::mem::replace(&mut *state, State::Idle) {
            State::Delivered(value) => Poll::Ready(value),
            State::Idle | State::Awaiting => {
                *state = State::Awaiting;
                Poll::Pending
            }
        }
    }
}

/// Slot::next future object.
pub struct NextToken<'a, V> {
    slot: &'a Slot<V>,
}

impl<'a, V> Future for NextToken<'a, V> {
    type Output = V;

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.slot.poll_take()
    }
}
