//! One retry sequence shared by every consumer of a retrying call.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::pipeline::Outcome;

/// How a shared run ended, as broadcast to the consumers waiting on it.
#[derive(Clone)]
pub(super) enum Settlement {
    Done(Outcome),
    Panicked(Arc<str>),
    /// Stopped because every consumer left, or torn down with the runtime.
    Abandoned,
}

impl Settlement {
    pub(super) fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|message| Arc::from(*message))
            .or_else(|| payload.downcast_ref::<String>().map(|message| Arc::from(message.as_str())))
            .unwrap_or_else(|| Arc::from("shared call panicked"));
        Self::Panicked(message)
    }
}

enum State {
    Idle,
    Running {
        run: u64,
        stop: CancellationToken,
        consumers: usize,
        settled: watch::Receiver<Option<Settlement>>,
    },
    Settled(Outcome),
}

struct Inner {
    state: State,
    next_run: u64,
}

/// Memo for a call with a retry policy.
///
/// The first consumer launches the run; later consumers attach to it, or
/// replay the outcome once it settled. A consumer leaving only detaches
/// itself. The run is stopped when its last consumer leaves, and the memo
/// returns to idle so the next consumer starts over.
pub(super) struct SharedRun {
    inner: Mutex<Inner>,
}

/// Result of [`SharedRun::join`].
pub(super) enum Joined {
    Settled(Outcome),
    Waiting(Consumer),
}

impl SharedRun {
    pub(super) const fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: State::Idle,
                next_run: 0,
            }),
        }
    }

    /// Attaches a consumer. `start` is called, outside the lock, only when no
    /// run is in flight and nothing settled yet.
    pub(super) fn join<F>(self: &Arc<Self>, start: F) -> Joined
    where
        F: FnOnce(Launch),
    {
        let mut inner = self.lock();

        if let State::Settled(outcome) = &inner.state {
            return Joined::Settled(outcome.clone());
        }

        if let State::Running {
            run,
            consumers,
            settled,
            ..
        } = &mut inner.state
        {
            *consumers += 1;
            return Joined::Waiting(Consumer {
                shared: Arc::clone(self),
                run: *run,
                settled: settled.clone(),
            });
        }

        let run = inner.next_run;
        inner.next_run = inner.next_run.wrapping_add(1);
        let (sender, settled) = watch::channel(None);
        let stop = CancellationToken::new();
        inner.state = State::Running {
            run,
            stop: stop.clone(),
            consumers: 1,
            settled: settled.clone(),
        };
        drop(inner);

        // created first so an unwinding `start` still detaches it
        let consumer = Consumer {
            shared: Arc::clone(self),
            run,
            settled,
        };
        start(Launch {
            shared: Arc::clone(self),
            run,
            stop,
            sender,
        });
        Joined::Waiting(consumer)
    }

    /// Number of consumers attached to the run in flight.
    #[cfg(test)]
    pub(super) fn consumers(&self) -> usize {
        match &self.lock().state {
            State::Running { consumers, .. } => *consumers,
            State::Idle | State::Settled(_) => 0,
        }
    }

    fn detach(&self, run: u64) {
        let mut inner = self.lock();

        let abandoned = match &mut inner.state {
            State::Running {
                run: current,
                stop,
                consumers,
                ..
            } if *current == run => {
                *consumers -= 1;
                (*consumers == 0).then(|| stop.clone())
            }
            _ => None,
        };

        if let Some(stop) = abandoned {
            inner.state = State::Idle;
            drop(inner);
            tracing::trace!("Last consumer left, stopping shared run");
            stop.cancel();
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SharedRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.lock().state {
            State::Idle => "idle",
            State::Running { .. } => "running",
            State::Settled(_) => "settled",
        };
        f.debug_struct("SharedRun").field("state", &state).finish()
    }
}

/// Permission to drive a run, handed to the consumer that started it.
pub(super) struct Launch {
    shared: Arc<SharedRun>,
    run: u64,
    stop: CancellationToken,
    sender: watch::Sender<Option<Settlement>>,
}

impl Launch {
    /// Token that fires when the last consumer leaves.
    pub(super) fn stop(&self) -> CancellationToken {
        self.stop.clone()
    }

    /// Publishes how the run ended. Only a run that is still current settles
    /// the memo; a completed outcome is kept for later consumers.
    pub(super) fn finish(self, settlement: Settlement) {
        {
            let mut inner = self.shared.lock();
            let current = matches!(&inner.state, State::Running { run, .. } if *run == self.run);
            if current {
                inner.state = match &settlement {
                    Settlement::Done(outcome) => State::Settled(outcome.clone()),
                    Settlement::Panicked(_) | Settlement::Abandoned => State::Idle,
                };
            }
        }
        self.sender.send_replace(Some(settlement));
    }
}

/// One consumer attached to a run. Dropping it detaches.
pub(super) struct Consumer {
    shared: Arc<SharedRun>,
    run: u64,
    settled: watch::Receiver<Option<Settlement>>,
}

impl Consumer {
    /// Waits until the run publishes how it ended.
    pub(super) async fn settled(&mut self) -> Settlement {
        match self.settled.wait_for(Option::is_some).await {
            Ok(settlement) => settlement.clone().unwrap_or(Settlement::Abandoned),
            Err(_) => Settlement::Abandoned,
        }
    }
}

impl Drop for Consumer {
    fn drop(&mut self) {
        self.shared.detach(self.run);
    }
}
