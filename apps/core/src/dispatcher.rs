use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

type Completion<C> = Box<dyn FnOnce(&mut C) + Send>;

#[derive(Debug)]
pub enum DispatchError {
    Spawn(std::io::Error),
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn(error) => write!(f, "failed to start background worker: {error}"),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn(error) => Some(error),
        }
    }
}

/// Runs blocking work on background threads and queues each result for the
/// single consumption context `C`. Completions run only inside
/// [`Dispatcher::pump`] / [`Dispatcher::pump_blocking`], one at a time.
pub struct Dispatcher<C> {
    sender: Sender<Completion<C>>,
    receiver: Receiver<Completion<C>>,
    next_id: u64,
    in_flight: usize,
}

impl<C: 'static> Default for Dispatcher<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: 'static> Dispatcher<C> {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            next_id: 1,
            in_flight: 0,
        }
    }

    /// Starts `work` on a new worker thread; `on_done` later receives the
    /// consumption context and the result.
    pub fn submit<R, W, D>(&mut self, work: W, on_done: D) -> Result<u64, DispatchError>
    where
        R: Send + 'static,
        W: FnOnce() -> R + Send + 'static,
        D: FnOnce(&mut C, R) + Send + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        let sender = self.sender.clone();

        std::thread::Builder::new()
            .name(format!("quickcuts-task-{id}"))
            .spawn(move || {
                let result = work();
                let completion: Completion<C> =
                    Box::new(move |context: &mut C| on_done(context, result));
                // The consumer may already be gone during shutdown.
                let _ = sender.send(completion);
            })
            .map_err(DispatchError::Spawn)?;

        self.in_flight += 1;
        Ok(id)
    }

    /// Number of submitted tasks whose completion has not run yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Runs every completion that is already queued. Returns how many ran.
    pub fn pump(&mut self, context: &mut C) -> usize {
        let mut ran = 0;
        while let Ok(completion) = self.receiver.try_recv() {
            self.finish(completion, context);
            ran += 1;
        }
        ran
    }

    /// Waits up to `timeout` for the first completion, then drains the queue.
    pub fn pump_blocking(&mut self, context: &mut C, timeout: Duration) -> usize {
        if self.in_flight == 0 {
            return 0;
        }
        match self.receiver.recv_timeout(timeout) {
            Ok(completion) => {
                self.finish(completion, context);
                1 + self.pump(context)
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => 0,
        }
    }

    /// Pumps until nothing is in flight or `timeout` elapses.
    pub fn wait_idle(&mut self, context: &mut C, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.in_flight > 0 {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            self.pump_blocking(context, deadline - now);
        }
        true
    }

    fn finish(&mut self, completion: Completion<C>, context: &mut C) {
        self.in_flight = self.in_flight.saturating_sub(1);
        completion(context);
    }
}
