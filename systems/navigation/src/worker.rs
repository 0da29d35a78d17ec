//! Background execution of path queries.
//!
//! A [`PathWorker`] owns a pool of threads that receive
//! [`PathRequestMessage`] values over a channel and answer with
//! [`PathResponseMessage`] values on another. Requests own their obstacle
//! snapshot, so nothing mutable is shared with the pool. Responses arrive in
//! completion order and must be correlated by [`RequestId`].

use std::{
    collections::HashMap,
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use maze_arena_core::{
    AgentId, Footprint, PathRequestMessage, PathResponseMessage, RequestId, WorldPoint,
};
use thiserror::Error;
use tracing::debug;

use crate::{find_path, PathOptions};

/// Failures surfaced by the worker boundary.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// A worker thread could not be started.
    #[error("failed to spawn path worker thread: {0}")]
    Spawn(#[from] std::io::Error),
    /// Every worker thread has stopped.
    #[error("path worker pool has shut down")]
    Disconnected,
    /// No response arrived within the allotted time.
    #[error("timed out waiting for a path response")]
    Timeout,
}

/// Answers a single request with the same planner used on the calling thread.
#[must_use]
pub fn handle_request(request: &PathRequestMessage) -> PathResponseMessage {
    let options = PathOptions::from(request.opts);
    PathResponseMessage {
        id: request.id,
        path: find_path(request.start, request.goal, &request.obstacles, &options),
    }
}

/// Pool of threads planning paths off the calling thread.
#[derive(Debug)]
pub struct PathWorker {
    requests: Option<Sender<PathRequestMessage>>,
    responses: Receiver<PathResponseMessage>,
    threads: Vec<JoinHandle<()>>,
    next_id: u64,
}

impl PathWorker {
    /// Starts `threads` worker threads, at least one.
    pub fn spawn(threads: usize) -> Result<Self, WorkerError> {
        let (request_tx, request_rx) = unbounded::<PathRequestMessage>();
        let (response_tx, response_rx) = unbounded();
        let count = threads.max(1);
        let mut handles = Vec::with_capacity(count);

        for index in 0..count {
            let requests = request_rx.clone();
            let responses = response_tx.clone();
            let handle = thread::Builder::new()
                .name(format!("path-worker-{index}"))
                .spawn(move || run_worker(index, requests, responses))?;
            handles.push(handle);
        }
        debug!(threads = count, "path worker pool started");

        Ok(Self {
            requests: Some(request_tx),
            responses: response_rx,
            threads: handles,
            next_id: 0,
        })
    }

    /// Queues a query and returns the identifier its response will carry.
    pub fn dispatch(
        &mut self,
        start: WorldPoint,
        goal: WorldPoint,
        obstacles: Vec<Footprint>,
        options: &PathOptions,
    ) -> Result<RequestId, WorkerError> {
        let id = RequestId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.submit(PathRequestMessage {
            id,
            start,
            goal,
            obstacles,
            opts: options.worker_options(),
        })?;
        Ok(id)
    }

    /// Queues a fully formed protocol message.
    pub fn submit(&self, request: PathRequestMessage) -> Result<(), WorkerError> {
        let sender = self.requests.as_ref().ok_or(WorkerError::Disconnected)?;
        sender.send(request).map_err(|_| WorkerError::Disconnected)
    }

    /// Returns a finished response if one is waiting.
    pub fn try_recv(&self) -> Result<Option<PathResponseMessage>, WorkerError> {
        match self.responses.try_recv() {
            Ok(response) => Ok(Some(response)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(WorkerError::Disconnected),
        }
    }

    /// Blocks until a response arrives or `timeout` elapses.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<PathResponseMessage, WorkerError> {
        self.responses.recv_timeout(timeout).map_err(|error| match error {
            RecvTimeoutError::Timeout => WorkerError::Timeout,
            RecvTimeoutError::Disconnected => WorkerError::Disconnected,
        })
    }

    /// Number of threads in the pool.
    #[must_use]
    pub fn threads(&self) -> usize {
        self.threads.len()
    }
}

impl Drop for PathWorker {
    fn drop(&mut self) {
        drop(self.requests.take());
        for handle in self.threads.drain(..) {
            if handle.join().is_err() {
                debug!("path worker thread panicked");
            }
        }
    }
}

fn run_worker(
    index: usize,
    requests: Receiver<PathRequestMessage>,
    responses: Sender<PathResponseMessage>,
) {
    for request in requests.iter() {
        if responses.send(handle_request(&request)).is_err() {
            break;
        }
    }
    debug!(worker = index, "path worker stopped");
}

/// Correlates worker responses with the agents that asked for them.
///
/// Only the newest request of each agent is delivered. Responses to requests
/// that were superseded or whose agent was forgotten are discarded on arrival,
/// since the pool offers no cancellation.
#[derive(Debug)]
pub struct PathDispatcher {
    worker: PathWorker,
    options: PathOptions,
    pending: HashMap<RequestId, AgentId>,
    latest: HashMap<AgentId, RequestId>,
}

impl PathDispatcher {
    /// Wraps a worker pool, planning every request with `options`.
    #[must_use]
    pub fn new(worker: PathWorker, options: PathOptions) -> Self {
        Self {
            worker,
            options,
            pending: HashMap::new(),
            latest: HashMap::new(),
        }
    }

    /// Queues a path query on behalf of `agent`.
    pub fn request(
        &mut self,
        agent: AgentId,
        start: WorldPoint,
        goal: WorldPoint,
        obstacles: Vec<Footprint>,
    ) -> Result<RequestId, WorkerError> {
        let id = self.worker.dispatch(start, goal, obstacles, &self.options)?;
        let _ = self.pending.insert(id, agent);
        let _ = self.latest.insert(agent, id);
        Ok(id)
    }

    /// Drops interest in every outstanding request of `agent`.
    pub fn forget(&mut self, agent: AgentId) {
        let _ = self.latest.remove(&agent);
    }

    /// Drains finished responses, returning the paths still wanted.
    pub fn poll(&mut self) -> Result<Vec<(AgentId, Vec<WorldPoint>)>, WorkerError> {
        let mut delivered = Vec::new();
        while let Some(response) = self.worker.try_recv()? {
            if let Some(path) = self.accept(response) {
                delivered.push(path);
            }
        }
        Ok(delivered)
    }

    /// Blocks for the next wanted response, skipping discarded ones.
    ///
    /// `timeout` bounds the whole wait, however many responses are discarded.
    pub fn recv_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<(AgentId, Vec<WorldPoint>), WorkerError> {
        let deadline = Instant::now().checked_add(timeout);
        loop {
            let remaining = match deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => timeout,
            };
            let response = self.worker.recv_timeout(remaining)?;
            if let Some(delivery) = self.accept(response) {
                return Ok(delivery);
            }
        }
    }

    /// Requests whose responses have not arrived yet.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    fn accept(&mut self, response: PathResponseMessage) -> Option<(AgentId, Vec<WorldPoint>)> {
        let Some(agent) = self.pending.remove(&response.id) else {
            debug!(request = response.id.get(), "discarding unknown path response");
            return None;
        };
        if self.latest.get(&agent) != Some(&response.id) {
            debug!(
                request = response.id.get(),
                agent = agent.get(),
                "discarding superseded path response"
            );
            return None;
        }
        let _ = self.latest.remove(&agent);
        Some((agent, response.path))
    }
}
