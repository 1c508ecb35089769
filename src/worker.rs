//! Execution of render requests off the UI thread.
//!
//! A [`RenderWorker`] owns one thread per chart. Requests go in through a
//! FIFO channel; before serving one, the worker drains the queue and keeps
//! only the newest, so a burst of seeks costs a single provider call. Results
//! come back through a second channel that the chart drains on its own
//! thread.

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::dispatch::{DispatchOutcome, request_renders};
use crate::error::ChartError;
use crate::provider::{RenderFilter, RenderProvider};
use crate::time::TimeRange;

/// Where render requests run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecutionMode {
    /// On the calling thread, during the tick.
    Inline,
    /// On a dedicated worker thread per chart.
    #[default]
    Background,
}

/// One request to the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest<K> {
    /// Ticket from the chart's redraw state.
    pub ticket: u64,
    /// Key the request was made for.
    pub key: K,
    /// Range to render.
    pub range: TimeRange,
    /// Sampling resolution.
    pub resolution: i64,
    /// Optional filter.
    pub filter: Option<RenderFilter>,
}

/// Provider answer to a [`RenderRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderResult<K> {
    /// Ticket of the request.
    pub ticket: u64,
    /// Key of the request.
    pub key: K,
    /// What the provider returned.
    pub outcome: DispatchOutcome,
}

fn serve<K>(provider: &dyn RenderProvider, request: RenderRequest<K>) -> RenderResult<K> {
    let outcome = request_renders(
        provider,
        request.range,
        request.resolution,
        request.filter.as_ref(),
    );
    RenderResult {
        ticket: request.ticket,
        key: request.key,
        outcome,
    }
}

/// Background thread serving render requests for one chart.
pub struct RenderWorker<K> {
    name: String,
    requests: Option<Sender<RenderRequest<K>>>,
    results: Receiver<RenderResult<K>>,
    handle: Option<JoinHandle<()>>,
}

impl<K: Send + 'static> RenderWorker<K> {
    /// Start a worker thread for `provider`.
    pub fn spawn(provider: Arc<dyn RenderProvider>) -> Result<Self, ChartError> {
        let name = format!("render-{}", provider.provider_name());
        let (request_tx, request_rx) = crossbeam_channel::unbounded::<RenderRequest<K>>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || run(provider, request_rx, result_tx))
            .map_err(|source| ChartError::WorkerSpawn {
                provider: name.clone(),
                source,
            })?;
        log::debug!("{name}: worker started");
        Ok(Self {
            name,
            requests: Some(request_tx),
            results: result_rx,
            handle: Some(handle),
        })
    }

    /// Queue a request. Returns false once the worker has shut down.
    pub fn submit(&self, request: RenderRequest<K>) -> bool {
        match &self.requests {
            Some(requests) => requests.send(request).is_ok(),
            None => false,
        }
    }

    /// Next delivered result, without blocking.
    pub fn try_recv(&self) -> Option<RenderResult<K>> {
        self.results.try_recv().ok()
    }

    /// Next delivered result, waiting up to `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<RenderResult<K>> {
        match self.results.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Close the request channel and let the thread exit on its own.
    ///
    /// Never blocks: a request still being served finishes in the
    /// background and its result is dropped.
    pub fn shutdown(&mut self) {
        self.requests.take();
        if self.handle.take().is_some() {
            log::debug!("{}: worker detached", self.name);
        }
    }

    /// Close the request channel and wait for the thread to exit.
    ///
    /// Blocks for as long as the current provider call takes.
    pub fn join(&mut self) {
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("{}: worker panicked", self.name);
            } else {
                log::debug!("{}: worker stopped", self.name);
            }
        }
    }
}

impl<K> Drop for RenderWorker<K> {
    fn drop(&mut self) {
        self.requests.take();
    }
}

fn run<K>(
    provider: Arc<dyn RenderProvider>,
    requests: Receiver<RenderRequest<K>>,
    results: Sender<RenderResult<K>>,
) {
    while let Ok(mut request) = requests.recv() {
        for newer in requests.try_iter() {
            log::trace!(
                "{}: request {} superseded by {}",
                provider.provider_name(),
                request.ticket,
                newer.ticket
            );
            request = newer;
        }
        if results.send(serve(provider.as_ref(), request)).is_err() {
            break;
        }
    }
}

/// Runs a chart's requests according to its [`ExecutionMode`].
pub(crate) enum Executor<K> {
    Inline {
        provider: Arc<dyn RenderProvider>,
        results: VecDeque<RenderResult<K>>,
    },
    Background(RenderWorker<K>),
    Disposed,
}

impl<K: Send + 'static> Executor<K> {
    pub(crate) fn new(
        mode: ExecutionMode,
        provider: Arc<dyn RenderProvider>,
    ) -> Result<Self, ChartError> {
        Ok(match mode {
            ExecutionMode::Inline => Self::Inline {
                provider,
                results: VecDeque::new(),
            },
            ExecutionMode::Background => Self::Background(RenderWorker::spawn(provider)?),
        })
    }

    pub(crate) fn is_background(&self) -> bool {
        matches!(self, Self::Background(_))
    }

    /// Hand a request over. Inline requests are served before returning.
    pub(crate) fn submit(&mut self, request: RenderRequest<K>) -> bool {
        match self {
            Self::Inline { provider, results } => {
                results.push_back(serve(provider.as_ref(), request));
                true
            }
            Self::Background(worker) => worker.submit(request),
            Self::Disposed => false,
        }
    }

    /// Every result delivered so far, in request order.
    pub(crate) fn drain(&mut self) -> Vec<RenderResult<K>> {
        match self {
            Self::Inline { results, .. } => results.drain(..).collect(),
            Self::Background(worker) => std::iter::from_fn(|| worker.try_recv()).collect(),
            Self::Disposed => Vec::new(),
        }
    }

    /// Wait up to `timeout` for the next result. Inline results are already
    /// queued, so this never blocks for them.
    pub(crate) fn wait(&mut self, timeout: Duration) -> Option<RenderResult<K>> {
        match self {
            Self::Inline { results, .. } => results.pop_front(),
            Self::Background(worker) => worker.recv_timeout(timeout),
            Self::Disposed => None,
        }
    }

    pub(crate) fn dispose(&mut self) {
        if let Self::Background(worker) = self {
            worker.shutdown();
        }
        *self = Self::Disposed;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::provider::testing::StubProvider;

    fn request(ticket: u64, start: i64) -> RenderRequest<u64> {
        RenderRequest {
            ticket,
            key: ticket,
            range: TimeRange::new(start, start + 100),
            resolution: 1,
            filter: None,
        }
    }

    #[test]
    fn inline_executor_serves_immediately() {
        let provider = Arc::new(StubProvider::new(&["cpu"]));
        let mut executor = Executor::new(ExecutionMode::Inline, provider.clone()).expect("inline");
        assert!(executor.submit(request(1, 0)));
        assert_eq!(provider.calls(), 1);
        let results = executor.drain();
        assert_eq!(results.len(), 1);
        assert!(results[0].outcome.is_painted());
        assert!(executor.drain().is_empty());
    }

    #[test]
    fn worker_supersedes_queued_requests() {
        let (gate_tx, gate_rx) = crossbeam_channel::unbounded();
        let (entered_tx, entered_rx) = crossbeam_channel::unbounded();
        let provider = Arc::new(
            StubProvider::new(&["cpu"])
                .gated(gate_rx)
                .with_entry_signal(entered_tx),
        );
        let worker = RenderWorker::spawn(provider.clone()).expect("spawn worker");

        assert!(worker.submit(request(1, 0)));
        entered_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("worker picked up the first request");
        assert!(worker.submit(request(2, 100)));
        assert!(worker.submit(request(3, 200)));
        gate_tx.send(()).expect("gate open");
        gate_tx.send(()).expect("gate open");

        let first = worker.recv_timeout(Duration::from_secs(5)).expect("first result");
        let second = worker.recv_timeout(Duration::from_secs(5)).expect("second result");
        assert_eq!(first.ticket, 1);
        assert_eq!(second.ticket, 3);
        assert_eq!(provider.calls(), 2);
        let ranges: Vec<_> = provider.requests().iter().map(|request| request.range).collect();
        assert_eq!(ranges, [TimeRange::new(0, 100), TimeRange::new(200, 300)]);
    }

    #[test]
    fn shutdown_rejects_new_requests() {
        let provider = Arc::new(StubProvider::new(&["cpu"]));
        let mut worker = RenderWorker::<u64>::spawn(provider).expect("spawn worker");
        worker.shutdown();
        assert!(!worker.submit(request(1, 0)));
        assert!(worker.try_recv().is_none());
    }

    #[test]
    fn join_waits_for_the_thread() {
        let provider = Arc::new(StubProvider::new(&["cpu"]));
        let mut worker = RenderWorker::<u64>::spawn(provider.clone()).expect("spawn worker");
        assert!(worker.submit(request(1, 0)));
        worker.join();
        assert_eq!(provider.calls(), 1);
        assert!(!worker.submit(request(2, 0)));
    }

    #[test]
    fn dispose_does_not_wait_for_a_busy_provider() {
        let (gate_tx, gate_rx) = crossbeam_channel::unbounded();
        let (entered_tx, entered_rx) = crossbeam_channel::unbounded();
        let provider = Arc::new(
            StubProvider::new(&["cpu"])
                .gated(gate_rx)
                .with_entry_signal(entered_tx),
        );
        let mut executor =
            Executor::new(ExecutionMode::Background, provider.clone()).expect("spawn worker");
        assert!(executor.submit(request(1, 0)));
        entered_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("worker picked up the request");

        let started = Instant::now();
        executor.dispose();
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(executor.drain().is_empty());

        gate_tx.send(()).expect("gate open");
    }

    #[test]
    fn disposed_executor_drops_requests() {
        let provider = Arc::new(StubProvider::new(&["cpu"]));
        let mut executor =
            Executor::new(ExecutionMode::Background, provider.clone()).expect("spawn worker");
        assert!(executor.is_background());
        executor.dispose();
        assert!(!executor.submit(request(1, 0)));
        assert!(executor.drain().is_empty());
        assert_eq!(provider.calls(), 0);
    }
}
