//! Debounced recomputation of a pure function over a stream of inputs.
//!
//! Every submitted input supersedes the pending one and restarts the quiet
//! window. The compute function only ever runs on the latest input, once the
//! window elapses without a newer submission. Results are published on a
//! `watch` channel, so readers always see the most recent one.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::trace;

pub struct Debouncer<I, O> {
    input_tx: mpsc::UnboundedSender<I>,
    output_rx: watch::Receiver<Option<O>>,
    task: JoinHandle<()>,
}

impl<I, O> Debouncer<I, O>
where
    I: Send + 'static,
    O: Send + Sync + 'static,
{
    /// Spawns the debounce task on the current tokio runtime.
    pub fn spawn<F>(window: Duration, compute: F) -> Self
    where
        F: FnMut(I) -> O + Send + 'static,
    {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (output_tx, output_rx) = watch::channel(None);
        let task = tokio::spawn(run(window, compute, input_rx, output_tx));
        Self {
            input_tx,
            output_rx,
            task,
        }
    }

    /// Queues `input`, superseding anything not yet computed. Returns `false`
    /// once the task has stopped.
    pub fn submit(&self, input: I) -> bool {
        self.input_tx.send(input).is_ok()
    }

    /// A receiver that observes every published result.
    pub fn subscribe(&self) -> watch::Receiver<Option<O>> {
        self.output_rx.clone()
    }
}

impl<I, O> Drop for Debouncer<I, O> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run<I, O, F>(
    window: Duration,
    mut compute: F,
    mut input_rx: mpsc::UnboundedReceiver<I>,
    output_tx: watch::Sender<Option<O>>,
) where
    F: FnMut(I) -> O,
{
    while let Some(first) = input_rx.recv().await {
        let mut pending = first;
        let mut deadline = Instant::now() + window;

        loop {
            tokio::select! {
                next = input_rx.recv() => match next {
                    Some(input) => {
                        trace!("superseding pending input");
                        pending = input;
                        deadline = Instant::now() + window;
                    }
                    // Sender gone: nobody is left to read a result.
                    None => return,
                },
                _ = sleep_until(deadline) => break,
            }
        }

        if output_tx.send(Some(compute(pending))).is_err() {
            return;
        }
    }
}
