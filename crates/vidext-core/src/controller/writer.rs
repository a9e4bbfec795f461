//! Write-through worker
//!
//! Every field write issued by the controller goes through one FIFO and is
//! applied by a single task, so writes to the same field land in issue
//! order and the last edit wins.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐  WriteRequest  ┌──────────────┐  set_value  ┌────────────┐
//! │ FormController │───────────────▶│ WriteWorker  │────────────▶│ FieldStore │
//! └────────────────┘   (FIFO)       └──────────────┘             └────────────┘
//!         ▲                                 │
//!         │ PendingWrite / FieldSync        │ WriteEvent
//!         └─────────────────────────────────┴──────────────▶ UI / logs
//! ```
//!
//! ## Outcome Reporting
//!
//! 1. The caller's [`PendingWrite`] resolves with the store's result
//! 2. The field's [`FieldSync`] moves from `Pending` to `Committed`/`Failed`
//! 3. A [`WriteEvent`] is emitted on the bounded event channel

use crate::error::{Error, Result};
use crate::traits::FieldStore;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, trace, warn};

/// Events emitted by the write-through worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteEvent {
    /// A write was queued
    Queued { field: String, seq: u64 },

    /// The store committed a write
    Committed { field: String, seq: u64 },

    /// The store rejected a write; the local value was kept
    Failed {
        field: String,
        seq: u64,
        error: String,
    },

    /// Worker stopped after draining its queue
    Stopped { writes_applied: usize },
}

/// Persistence status of one field
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldSync {
    /// No write issued since mount
    #[default]
    Idle,
    /// Latest write not yet settled
    Pending { seq: u64 },
    /// Latest write committed
    Committed { seq: u64, at: DateTime<Utc> },
    /// Latest write failed; local and stored values differ
    Failed {
        seq: u64,
        error: String,
        at: DateTime<Utc>,
    },
}

impl FieldSync {
    /// Whether the latest write for the field failed
    pub fn is_failed(&self) -> bool {
        matches!(self, FieldSync::Failed { .. })
    }

    /// Whether a write for the field is still in flight
    pub fn is_pending(&self) -> bool {
        matches!(self, FieldSync::Pending { .. })
    }
}

/// Handle to a queued field write
///
/// Dropping the handle does not cancel the write.
#[derive(Debug)]
pub struct PendingWrite {
    field: String,
    seq: u64,
    rx: oneshot::Receiver<Result<()>>,
}

impl PendingWrite {
    /// Field this write targets
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Sequence number of this write within the controller
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Wait until the store settles the write
    pub async fn settled(self) -> Result<()> {
        let Self { field, rx, .. } = self;
        match rx.await {
            Ok(result) => result,
            Err(_) => Err(Error::writer_closed(field)),
        }
    }
}

struct WriteRequest {
    field: String,
    value: Option<Value>,
    seq: u64,
    done: oneshot::Sender<Result<()>>,
}

type SyncTable = Arc<Mutex<HashMap<String, FieldSync>>>;

/// Controller-side half: queues writes and reads sync status
pub(crate) struct FieldWriter {
    tx: mpsc::UnboundedSender<WriteRequest>,
    events: mpsc::Sender<WriteEvent>,
    sync: SyncTable,
    next_seq: u64,
    handle: JoinHandle<()>,
}

impl FieldWriter {
    /// Spawn the worker on the current tokio runtime
    pub(crate) fn spawn(
        store: Arc<dyn FieldStore>,
        event_channel_capacity: usize,
    ) -> Result<(Self, mpsc::Receiver<WriteEvent>)> {
        let runtime = Handle::try_current()
            .map_err(|e| Error::runtime(format!("No tokio runtime for the field writer: {}", e)))?;

        let (tx, rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(event_channel_capacity);
        let sync: SyncTable = Arc::new(Mutex::new(HashMap::new()));

        let worker = WriteWorker {
            store,
            sync: Arc::clone(&sync),
            events: event_tx.clone(),
        };
        let handle = runtime.spawn(worker.run(UnboundedReceiverStream::new(rx)));

        let writer = Self {
            tx,
            events: event_tx,
            sync,
            next_seq: 0,
            handle,
        };

        Ok((writer, event_rx))
    }

    /// Queue a write; never blocks
    pub(crate) fn enqueue(&mut self, field: &str, value: Option<Value>) -> PendingWrite {
        self.next_seq += 1;
        let seq = self.next_seq;
        let (done_tx, done_rx) = oneshot::channel();

        lock(&self.sync).insert(field.to_string(), FieldSync::Pending { seq });

        // Queued goes out before the worker can see the request
        trace!("Queued write #{} to {}", seq, field);
        emit_event(
            &self.events,
            WriteEvent::Queued {
                field: field.to_string(),
                seq,
            },
        );

        let request = WriteRequest {
            field: field.to_string(),
            value,
            seq,
            done: done_tx,
        };

        if self.tx.send(request).is_err() {
            // The request (and its completion sender) is dropped with the
            // error, so the handle resolves to WriterClosed.
            warn!("Field writer stopped, dropping write #{} to {}", seq, field);
            let error = "field writer stopped".to_string();
            lock(&self.sync).insert(
                field.to_string(),
                FieldSync::Failed {
                    seq,
                    error: error.clone(),
                    at: Utc::now(),
                },
            );
            emit_event(
                &self.events,
                WriteEvent::Failed {
                    field: field.to_string(),
                    seq,
                    error,
                },
            );
        }

        PendingWrite {
            field: field.to_string(),
            seq,
            rx: done_rx,
        }
    }

    /// Current sync status of a field
    pub(crate) fn status(&self, field: &str) -> FieldSync {
        lock(&self.sync).get(field).cloned().unwrap_or_default()
    }

    /// Close the queue and wait for the worker to apply what is left
    pub(crate) async fn drain(self) -> Result<()> {
        let Self { tx, handle, .. } = self;
        drop(tx);
        handle
            .await
            .map_err(|e| Error::runtime(format!("Field writer task failed: {}", e)))
    }
}

/// Worker-side half: applies writes one at a time
struct WriteWorker {
    store: Arc<dyn FieldStore>,
    sync: SyncTable,
    events: mpsc::Sender<WriteEvent>,
}

impl WriteWorker {
    async fn run(self, mut requests: UnboundedReceiverStream<WriteRequest>) {
        let mut writes_applied = 0usize;

        while let Some(request) = requests.next().await {
            let WriteRequest {
                field,
                value,
                seq,
                done,
            } = request;

            let result = self.store.set_value(&field, value).await;
            writes_applied += 1;

            match &result {
                Ok(()) => {
                    debug!("Committed write #{} to {}", seq, field);
                    self.settle(&field, seq, FieldSync::Committed { seq, at: Utc::now() });
                    emit_event(
                        &self.events,
                        WriteEvent::Committed {
                            field: field.clone(),
                            seq,
                        },
                    );
                }
                Err(e) => {
                    warn!("Write #{} to {} failed: {}", seq, field, e);
                    self.settle(
                        &field,
                        seq,
                        FieldSync::Failed {
                            seq,
                            error: e.to_string(),
                            at: Utc::now(),
                        },
                    );
                    emit_event(
                        &self.events,
                        WriteEvent::Failed {
                            field: field.clone(),
                            seq,
                            error: e.to_string(),
                        },
                    );
                }
            }

            // The caller may have dropped its handle
            let _ = done.send(result);
        }

        info!("Field writer stopped after {} write(s)", writes_applied);
        emit_event(&self.events, WriteEvent::Stopped { writes_applied });
    }

    /// Record an outcome unless a newer write for the field is queued
    fn settle(&self, field: &str, seq: u64, outcome: FieldSync) {
        let mut table = lock(&self.sync);
        if let Some(FieldSync::Pending { seq: latest }) = table.get(field)
            && *latest != seq
        {
            trace!(
                "Write #{} to {} superseded by #{}, keeping pending status",
                seq, field, latest
            );
            return;
        }
        table.insert(field.to_string(), outcome);
    }
}

fn lock(sync: &SyncTable) -> std::sync::MutexGuard<'_, HashMap<String, FieldSync>> {
    sync.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Emit a write event without ever blocking the caller
fn emit_event(events: &mpsc::Sender<WriteEvent>, event: WriteEvent) {
    match events.try_send(event) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(event)) => {
            warn!(
                "Write event channel full, dropping {:?}. Consider increasing event_channel_capacity.",
                event
            );
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            trace!("Write event receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryFieldStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_writes_apply_in_order() {
        let store = MemoryFieldStore::new();
        let (mut writer, _events) = FieldWriter::spawn(Arc::new(store.clone()), 16).unwrap();

        writer.enqueue("videoId", Some(json!("a")));
        writer.enqueue("videoId", Some(json!("b")));
        let last = writer.enqueue("videoId", Some(json!("c")));
        assert_eq!(last.seq(), 3);

        last.settled().await.unwrap();
        assert_eq!(store.get_value("videoId"), Some(json!("c")));
        assert!(matches!(
            writer.status("videoId"),
            FieldSync::Committed { seq: 3, .. }
        ));

        writer.drain().await.unwrap();
    }

    #[tokio::test]
    async fn test_events_reported() {
        let store = MemoryFieldStore::new();
        let (mut writer, mut events) = FieldWriter::spawn(Arc::new(store), 16).unwrap();

        writer.enqueue("platform", Some(json!("youtube")));
        writer.drain().await.unwrap();

        let mut seen = Vec::new();
        while let Some(event) = events.recv().await {
            seen.push(event);
        }
        assert_eq!(
            seen,
            vec![
                WriteEvent::Queued {
                    field: "platform".to_string(),
                    seq: 1
                },
                WriteEvent::Committed {
                    field: "platform".to_string(),
                    seq: 1
                },
                WriteEvent::Stopped { writes_applied: 1 },
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_queued_precedes_outcome_on_multi_thread_runtime() {
        let store = MemoryFieldStore::new();
        let (mut writer, mut events) = FieldWriter::spawn(Arc::new(store), 1024).unwrap();

        for i in 0..200 {
            writer.enqueue("videoId", Some(json!(format!("id-{}", i))));
        }
        writer.drain().await.unwrap();

        let mut queued = std::collections::HashSet::new();
        let mut committed = 0;
        while let Some(event) = events.recv().await {
            match event {
                WriteEvent::Queued { seq, .. } => {
                    queued.insert(seq);
                }
                WriteEvent::Committed { seq, .. } => {
                    assert!(queued.contains(&seq), "write #{} committed before queued", seq);
                    committed += 1;
                }
                WriteEvent::Failed { seq, .. } => panic!("write #{} failed", seq),
                WriteEvent::Stopped { writes_applied } => assert_eq!(writes_applied, 200),
            }
        }
        assert_eq!(committed, 200);
    }

    #[test]
    fn test_spawn_requires_runtime() {
        let result = FieldWriter::spawn(Arc::new(MemoryFieldStore::new()), 16);
        assert!(matches!(result, Err(Error::Runtime(_))));
    }

    #[test]
    fn test_unknown_field_is_idle() {
        assert_eq!(FieldSync::default(), FieldSync::Idle);
        assert!(!FieldSync::Idle.is_failed());
        assert!(FieldSync::Pending { seq: 1 }.is_pending());
    }
}
