//! Recovery of displaced registrations
//!
//! A failure event (connection loss, topology change) produces an affected
//! set: the registrations that lost their slot. One recovery job owns one
//! set and runs as a task on the environment's scheduler:
//!
//! ```text
//! PENDING -> ATTEMPT -> SUCCEEDED
//!                    -> FAILED_TRANSIENT -> PENDING   (next attempt)
//!                    -> FAILED_TERMINAL              (deleted / timeout)
//! ```
//!
//! Each attempt waits out the policy delay, fetches fresh metadata once per
//! distinct pending stream, and rebinds every registration whose stream has
//! a leader again. A stream reported as deleted is terminal immediately;
//! the backoff policy's TIMEOUT sentinel is terminal for whatever is still
//! pending. Producers are closed on terminal failure; committing consumers
//! are only detached, because the consumer itself lives on its own
//! connection.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use skein_protocol::{Broker, ResponseCode, StreamMetadata};
use tracing::{debug, warn};

use crate::backoff::BackOffDelayPolicy;
use crate::coordinator::{Affected, Inner};

/// Shared pending set of one recovery job. Topology events for a stream
/// whose job is still running append to it (coalescing), which is why it is
/// shared rather than owned by the task.
pub(crate) type PendingSet = Arc<Mutex<Vec<Affected>>>;

/// What displaced the affected set
pub(crate) enum RecoveryKind {
    ConnectionLoss,
    Topology { stream: String },
}

impl RecoveryKind {
    fn describe(&self) -> &'static str {
        match self {
            RecoveryKind::ConnectionLoss => "connection-loss",
            RecoveryKind::Topology { .. } => "topology-update",
        }
    }
}

/// Per-stream verdict for one attempt
enum Outcome {
    Leader(Broker),
    Retry,
    Deleted,
}

fn classify(record: Option<StreamMetadata>) -> Outcome {
    match record {
        None => Outcome::Deleted,
        Some(record) => match record.response_code {
            ResponseCode::StreamDoesNotExist => Outcome::Deleted,
            ResponseCode::Ok => match record.leader {
                Some(leader) => Outcome::Leader(leader),
                None => Outcome::Retry,
            },
            // StreamNotAvailable and anything unexpected: transient
            _ => Outcome::Retry,
        },
    }
}

pub(crate) async fn run(
    inner: Weak<Inner>,
    job_id: u64,
    pending: PendingSet,
    policy: BackOffDelayPolicy,
    kind: RecoveryKind,
) {
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        let delay = policy.delay(attempt);
        if delay == BackOffDelayPolicy::TIMEOUT {
            give_up(&inner, job_id, &pending, &kind);
            return;
        }
        tokio::time::sleep(delay).await;

        let Some(coordinator) = inner.upgrade() else {
            return;
        };
        if coordinator.is_closed() {
            return;
        }

        // cancelled registrations are excised, never rebound
        let snapshot: Vec<Affected> = {
            let mut guard = pending.lock();
            guard.retain(|entry| !entry.is_cancelled());
            guard.clone()
        };

        if !snapshot.is_empty() {
            let mut streams: Vec<&str> = snapshot.iter().map(Affected::stream).collect();
            streams.sort_unstable();
            streams.dedup();

            let locator = coordinator.env().locator();
            for stream in streams {
                match locator.metadata(stream).await {
                    Err(error) => {
                        // transient; everything for this stream stays pending
                        warn!(stream, attempt, %error, "metadata lookup failed during recovery");
                    }
                    Ok(mut records) => match classify(records.remove(stream)) {
                        Outcome::Retry => {
                            debug!(stream, attempt, "stream has no leader yet, will retry");
                        }
                        Outcome::Deleted => {
                            let gone = coordinator.take_stream_entries(&pending, stream);
                            for entry in gone {
                                if entry.is_cancelled() {
                                    continue;
                                }
                                finish_terminally(&entry, "stream deleted");
                            }
                        }
                        Outcome::Leader(leader) => {
                            for entry in snapshot.iter().filter(|e| e.stream() == stream) {
                                if entry.is_cancelled() {
                                    remove_pending(&pending, entry);
                                    continue;
                                }
                                match coordinator.place(entry, &leader).await {
                                    Ok(Some((connection, publishing_id))) => {
                                        remove_pending(&pending, entry);
                                        shield_hooks(stream, || {
                                            entry.assign(connection, publishing_id);
                                            entry.running();
                                        });
                                        debug!(stream, attempt, "registration rebound");
                                    }
                                    Ok(None) => remove_pending(&pending, entry),
                                    Err(error) => {
                                        warn!(stream, attempt, %error, "rebind failed, will retry");
                                    }
                                }
                            }
                        }
                    },
                }
            }
        }

        if coordinator.try_finish_job(job_id, &pending, &kind) {
            debug!(job = job_id, kind = kind.describe(), attempt, "recovery complete");
            return;
        }
    }
}

fn remove_pending(pending: &PendingSet, target: &Affected) {
    pending.lock().retain(|entry| !entry.same(target));
}

/// Run one registration's hooks, isolating the rest of the pass from a
/// panicking hook implementation
pub(crate) fn shield_hooks(stream: &str, hooks: impl FnOnce()) {
    if std::panic::catch_unwind(std::panic::AssertUnwindSafe(hooks)).is_err() {
        warn!(stream, "registration hook panicked");
    }
}

/// Terminal failure for one registration. Producers are told to close;
/// committing consumers stay alive on their own connection and are merely
/// left without a commit channel.
fn finish_terminally(entry: &Affected, cause: &str) {
    match entry {
        Affected::Producer(tracker) => {
            warn!(stream = %tracker.stream, cause, "closing producer after unrecoverable failure");
            shield_hooks(&tracker.stream, || tracker.producer.close_after_stream_deletion());
        }
        Affected::Consumer(tracker) => {
            warn!(stream = %tracker.stream, cause, "committing consumer left detached");
        }
    }
}

fn give_up(inner: &Weak<Inner>, job_id: u64, pending: &PendingSet, kind: &RecoveryKind) {
    let Some(coordinator) = inner.upgrade() else {
        return;
    };
    let drained = coordinator.drain_job(job_id, pending, kind);
    if drained.is_empty() {
        return;
    }
    warn!(
        job = job_id,
        kind = kind.describe(),
        pending = drained.len(),
        "recovery timed out"
    );
    for entry in drained {
        if entry.is_cancelled() {
            continue;
        }
        finish_terminally(&entry, "recovery timed out");
    }
}
