use crate::config::{Config, FaultPolicy};
use gather_task::{Adapted, Error, Outcome, Process, Relay, Sentinel, Tick};
use std::collections::VecDeque;

/// Processor descriptor.
///
/// Pairs an adapted processor body with the
/// name it is reported under. The index the
/// processor is registered at is its identity
/// within a run.
pub struct Processor<T, U> {
    name: String,
    body: Adapted<T, U>,
}

impl<T, U> Processor<T, U> {
    pub fn new(name: impl Into<String>, body: Adapted<T, U>) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &Adapted<T, U> {
        &self.body
    }
}

/// Output event of a multiplexed run.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Event<U> {
    /// Registration index of the emitting processor.
    pub processor: usize,
    pub payload: U,
}

/// Failure that aborted a multiplexed run.
#[derive(Debug, thiserror::Error)]
#[error("processor #{index} `{name}` aborted the run: {source}")]
pub struct RunError {
    pub index: usize,
    pub name: String,
    pub source: Error,
}

/// Failure isolated by [`FaultPolicy::Isolate`].
#[derive(Debug)]
pub struct Fault {
    pub index: usize,
    pub name: String,
    pub error: Error,
}

/// Processor multiplexer.
///
/// This object feeds one shared input sequence to
/// every registered processor and merges what
/// they emit into one sequence of events. To use,
/// register the processors first, then iterate
/// over a [`Run`] created by `run`.
///
/// The multiplexer itself is immutable during a
/// run, and can be reused for many runs. Each run
/// instantiates the processors afresh.
pub struct Gather<T, U> {
    processors: Vec<Processor<T, U>>,
    config: Config,
}

impl<T, U> Default for Gather<T, U> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl<T, U> Gather<T, U> {
    pub fn new(config: Config) -> Self {
        Self {
            processors: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register a processor, returning its index.
    pub fn register(&mut self, name: impl Into<String>, body: Adapted<T, U>) -> usize {
        self.processors.push(Processor::new(name, body));
        self.processors.len() - 1
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.processors.get(index).map(Processor::name)
    }

    pub fn processors(&self) -> &[Processor<T, U>] {
        &self.processors
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}

impl<T, U> Gather<T, U>
where
    T: Clone + 'static,
    U: 'static,
{
    /// Start a run over the input sequence.
    ///
    /// The run is lazy: input is pulled and the
    /// processors are advanced only as the
    /// returned iterator is consumed.
    pub fn run<I>(&self, inputs: I) -> Run<T, U, I::IntoIter>
    where
        I: IntoIterator<Item = T>,
    {
        let sentinel = Sentinel::new();
        let instances: Vec<_> = self
            .processors
            .iter()
            .map(|p| Instance {
                name: p.name.clone(),
                process: p.body.process(Relay::new(sentinel.clone())),
            })
            .collect();
        let cursor = instances.len();
        Run {
            sentinel,
            instances,
            feed: Feed {
                inputs: inputs.into_iter(),
                stage: Stage::Prime,
            },
            tick: None,
            position: 0,
            cursor,
            pending: VecDeque::new(),
            error: None,
            policy: self.config.fault_policy,
            faults: Vec::new(),
            done: false,
        }
    }
}

/// Multiplex processors over one input sequence.
///
/// This is the shorthand of registering the
/// processors into a default [`Gather`] under
/// their positional names and starting a run.
pub fn multiplex<T, U, P, I>(processors: P, inputs: I) -> Run<T, U, I::IntoIter>
where
    T: Clone + 'static,
    U: 'static,
    P: IntoIterator<Item = Adapted<T, U>>,
    I: IntoIterator<Item = T>,
{
    let mut gather = Gather::default();
    for (index, body) in processors.into_iter().enumerate() {
        gather.register(format!("processor-{}", index), body);
    }
    gather.run(inputs)
}

enum Stage {
    Prime,
    Tokens,
    End,
    Done,
}

/// The effective feed of a run: one leading
/// priming tick, then the inputs, then the end.
struct Feed<I> {
    inputs: I,
    stage: Stage,
}

impl<T, I> Iterator for Feed<I>
where
    I: Iterator<Item = T>,
{
    type Item = Tick<T>;

    fn next(&mut self) -> Option<Tick<T>> {
        loop {
            match self.stage {
                Stage::Prime => {
                    self.stage = Stage::Tokens;
                    return Some(Tick::Prime);
                }
                Stage::Tokens => match self.inputs.next() {
                    Some(token) => return Some(Tick::Token(token)),
                    None => self.stage = Stage::End,
                },
                Stage::End => {
                    self.stage = Stage::Done;
                    return Some(Tick::End);
                }
                Stage::Done => return None,
            }
        }
    }
}

fn tick_kind<T>(tick: &Tick<T>) -> &'static str {
    match tick {
        Tick::Prime => "prime",
        Tick::Token(_) => "token",
        Tick::End => "end",
    }
}

struct Instance<T, U> {
    name: String,
    process: Process<T, U>,
}

/// One multiplexed run.
///
/// Events are yielded ordered by input position
/// first, then by processor registration order,
/// then in the order each processor emitted
/// them. A processor that terminates is skipped
/// for the rest of the run, and the run ends once
/// the end of input has reached every processor
/// still live, or as soon as none is live.
pub struct Run<T, U, I> {
    sentinel: Sentinel,
    instances: Vec<Instance<T, U>>,
    feed: Feed<I>,
    tick: Option<Tick<T>>,
    position: usize,
    cursor: usize,
    pending: VecDeque<Event<U>>,
    error: Option<RunError>,
    policy: FaultPolicy,
    faults: Vec<Fault>,
    done: bool,
}

impl<T, U, I> Run<T, U, I> {
    /// The end-of-input marker of this run.
    pub fn sentinel(&self) -> &Sentinel {
        &self.sentinel
    }

    /// Failures isolated so far.
    pub fn faults(&self) -> &[Fault] {
        &self.faults
    }

    pub fn is_live(&self, index: usize) -> bool {
        self.instances
            .get(index)
            .is_some_and(|instance| instance.process.is_live())
    }

    fn finish(&mut self) {
        self.done = true;
        self.tick = None;
        if self.error.is_some() {
            return;
        }
        tracing::debug!(
            ticks = self.position,
            faults = self.faults.len(),
            "multiplexed run finished"
        );
    }
}

impl<T, U, I> Run<T, U, I>
where
    T: Clone,
{
    fn step(&mut self, index: usize) {
        let Some(tick) = self.tick.as_ref() else {
            return;
        };
        let instance = &mut self.instances[index];
        if !instance.process.is_live() {
            return;
        }
        tracing::trace!(
            processor = %instance.name,
            index,
            position = self.position,
            tick = tick_kind(tick),
            "advancing processor"
        );
        let advance = instance.process.advance(tick.clone());
        self.pending.extend(advance.events.into_iter().map(|payload| Event {
            processor: index,
            payload,
        }));
        match advance.outcome {
            Outcome::Awaiting => {}
            Outcome::Terminated => {
                tracing::debug!(processor = %instance.name, index, "processor terminated");
            }
            Outcome::Failed(error) => {
                let name = instance.name.clone();
                match self.policy {
                    FaultPolicy::Abort => {
                        tracing::error!(
                            processor = %name,
                            index,
                            %error,
                            "processor aborted the run"
                        );
                        self.error = Some(RunError {
                            index,
                            name,
                            source: error,
                        });
                        self.finish();
                    }
                    FaultPolicy::Isolate => {
                        tracing::warn!(
                            processor = %name,
                            index,
                            %error,
                            "processor fault isolated"
                        );
                        self.faults.push(Fault { index, name, error });
                    }
                }
            }
        }
    }
}

impl<T, U, I> Iterator for Run<T, U, I>
where
    T: Clone,
    I: Iterator<Item = T>,
{
    type Item = Result<Event<U>, RunError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(Ok(event));
            }
            if let Some(error) = self.error.take() {
                return Some(Err(error));
            }
            if self.done {
                return None;
            }
            if self.cursor < self.instances.len() {
                let index = self.cursor;
                self.cursor += 1;
                self.step(index);
                continue;
            }
            // Every processor has seen the current tick.
            if !self.instances.iter().any(|i| i.process.is_live()) {
                self.finish();
                continue;
            }
            match self.feed.next() {
                Some(tick) => {
                    self.tick = Some(tick);
                    self.position += 1;
                    self.cursor = 0;
                }
                None => self.finish(),
            }
        }
    }
}
