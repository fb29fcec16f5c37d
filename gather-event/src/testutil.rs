use crate::{Event, RunError};
use gather_task::prelude::*;
use gather_task::{Adapted, Emitter, Relay, adapt};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Metadata, Subscriber};

type Out = anyhow::Result<()>;

/// Emits the username and password of every
/// `user:password` line, then the total count.
pub(crate) async fn count_passwords(
    mut input: Relay<String>,
    output: Emitter<String>,
) -> anyhow::Result<()> {
    let mut count = 0usize;
    while let Some(line) = input.next().await {
        let Some((first, last)) = line.split_once(':') else {
            continue;
        };
        if last.contains(':') {
            continue;
        }
        let (Some(user), Some(password)) = (
            first.split_whitespace().last(),
            last.split_whitespace().next(),
        ) else {
            continue;
        };
        output.emit(format!("Username: {}", user));
        output.emit(format!("Password: {}", password));
        count += 1;
    }
    output.emit("Total number of passwords:".to_string());
    output.emit(count.to_string());
    Ok(())
}

/// Greets before reading anything, reports every
/// line ending with `!`, and leaves on `Goodbye!`.
pub(crate) async fn exclaim(
    mut input: Relay<String>,
    output: Emitter<String>,
) -> anyhow::Result<()> {
    output.emit("Hello world!".to_string());
    while let Some(line) = input.next().await {
        if line.ends_with('!') {
            output.emit(format!("Someone yelled {:?}", line));
        }
        if line == "Goodbye!" {
            return Ok(());
        }
    }
    Ok(())
}

/// Records every token it receives, and emits
/// nothing.
pub(crate) struct Recorder {
    seen: Rc<RefCell<Vec<Option<String>>>>,
}

impl Recorder {
    pub(crate) fn new() -> Self {
        Self {
            seen: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Body that logs each token, and `None` when
    /// it observes the end of input.
    pub(crate) fn body(&self) -> Adapted<String, String> {
        let seen = self.seen.clone();
        adapt(async move |mut input: Relay<String>, _output: Emitter<String>| -> Out {
            while let Some(line) = input.next().await {
                seen.borrow_mut().push(Some(line));
            }
            seen.borrow_mut().push(None);
            Ok(())
        })
    }

    pub(crate) fn seen(&self) -> Vec<Option<String>> {
        self.seen.borrow().clone()
    }
}

pub(crate) fn lines(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|line| line.to_string()).collect()
}

pub(crate) fn collect<I>(run: I) -> Vec<(usize, String)>
where
    I: Iterator<Item = Result<Event<String>, RunError>>,
{
    run.map(|event| {
        let event = event.unwrap();
        (event.processor, event.payload)
    })
    .collect()
}

pub(crate) fn owned(events: &[(usize, &str)]) -> Vec<(usize, String)> {
    events
        .iter()
        .map(|(index, payload)| (*index, payload.to_string()))
        .collect()
}

/// Subscriber keeping the message of every event
/// dispatched while it is the default.
#[derive(Clone, Default)]
pub(crate) struct LogCapture {
    messages: Arc<Mutex<Vec<String>>>,
    next_id: Arc<AtomicU64>,
}

impl LogCapture {
    /// Run the closure with this capture installed
    /// on the current thread.
    pub(crate) fn scoped<R>(&self, f: impl FnOnce() -> R) -> R {
        tracing::subscriber::with_default(self.clone(), f)
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

struct MessageVisitor<'a>(&'a mut Option<String>);

impl Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            *self.0 = Some(format!("{:?}", value));
        }
    }
}

impl Subscriber for LogCapture {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        Id::from_u64(self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &tracing::Event<'_>) {
        let mut message = None;
        event.record(&mut MessageVisitor(&mut message));
        if let Some(message) = message {
            self.messages.lock().unwrap().push(message);
        }
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}
