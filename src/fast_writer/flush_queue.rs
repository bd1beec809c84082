//! Ordered flusher queue, drained either by a background thread or inline

use super::flusher::Flusher;
use super::zip_sink::{SinkFactory, ZipSink};
use crate::error::{OdsError, Result};
use std::sync::mpsc;
use std::thread;
use tracing::{debug, trace, warn};

enum Consumer {
    Background {
        sender: Option<mpsc::Sender<Flusher>>,
        handle: Option<thread::JoinHandle<Result<()>>>,
    },
    Inline {
        sink: Option<Box<dyn ZipSink>>,
    },
}

/// FIFO of flushers. Every flusher is applied to the sink exactly once, in
/// push order; the sink is finished after the `Finalize` flusher.
pub struct FlushQueue {
    consumer: Consumer,
    pushed: u64,
    failed: bool,
}

impl FlushQueue {
    /// Start a consumer thread. The thread builds its sink with `factory`
    /// and owns it until the document is finalized; a factory error is
    /// returned here.
    pub fn background(factory: SinkFactory) -> Result<Self> {
        let (sender, receiver) = mpsc::channel::<Flusher>();
        let (ready_sender, ready) = mpsc::channel::<Result<()>>();
        let handle = thread::Builder::new()
            .name("fastods-flush".to_string())
            .spawn(move || match factory() {
                Ok(sink) => {
                    let _ = ready_sender.send(Ok(()));
                    consume(receiver, sink)
                }
                Err(e) => {
                    let _ = ready_sender.send(Err(e));
                    Err(OdsError::FlushAborted)
                }
            })?;
        match ready.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = handle.join();
                return Err(e);
            }
            Err(_) => {
                let _ = handle.join();
                return Err(OdsError::FlushThreadPanicked);
            }
        }
        Ok(FlushQueue {
            consumer: Consumer::Background {
                sender: Some(sender),
                handle: Some(handle),
            },
            pushed: 0,
            failed: false,
        })
    }

    /// Apply every flusher on the caller's thread as soon as it is pushed
    pub fn inline(sink: Box<dyn ZipSink>) -> Self {
        FlushQueue {
            consumer: Consumer::Inline { sink: Some(sink) },
            pushed: 0,
            failed: false,
        }
    }

    pub fn is_background(&self) -> bool {
        matches!(self.consumer, Consumer::Background { .. })
    }

    /// Number of flushers accepted so far
    pub fn pushed(&self) -> u64 {
        self.pushed
    }

    pub fn push(&mut self, flusher: Flusher) -> Result<()> {
        if self.failed {
            return Err(OdsError::FlushAborted);
        }
        trace!(kind = flusher.kind(), seq = self.pushed, "enqueue flusher");
        let result = match &mut self.consumer {
            Consumer::Background { sender, handle } => {
                let sent = match sender {
                    Some(sender) => sender.send(flusher).is_ok(),
                    None => false,
                };
                if sent {
                    Ok(())
                } else {
                    // the consumer stopped early: report its error
                    *sender = None;
                    match handle.take().map(thread::JoinHandle::join) {
                        Some(Ok(Err(e))) => Err(e),
                        Some(Err(_)) => Err(OdsError::FlushThreadPanicked),
                        _ => Err(OdsError::FlushAborted),
                    }
                }
            }
            Consumer::Inline { sink } => {
                let applied = match sink.as_mut() {
                    Some(active) => apply(&mut **active, &flusher),
                    None => Err(OdsError::FlushAborted),
                };
                match applied {
                    Ok(()) if flusher.is_end() => sink.take().map_or(Ok(()), |s| s.finish()),
                    other => other,
                }
            }
        };
        match result {
            Ok(()) => {
                self.pushed += 1;
                Ok(())
            }
            Err(e) => {
                self.failed = true;
                Err(e)
            }
        }
    }

    /// Wait until every pushed flusher has been applied
    pub fn join(self) -> Result<()> {
        match self.consumer {
            Consumer::Background { sender, handle } => {
                drop(sender);
                let Some(handle) = handle else {
                    return Err(OdsError::FlushAborted);
                };
                match handle.join() {
                    Ok(result) => result,
                    Err(_) => Err(OdsError::FlushThreadPanicked),
                }
            }
            Consumer::Inline { sink } => {
                if self.failed {
                    Err(OdsError::FlushAborted)
                } else if sink.is_some() {
                    Err(OdsError::Unfinished)
                } else {
                    Ok(())
                }
            }
        }
    }
}

fn apply(sink: &mut dyn ZipSink, flusher: &Flusher) -> Result<()> {
    flusher.apply(sink).inspect_err(|e| {
        warn!(kind = flusher.kind(), error = %e, "flush failed");
    })
}

fn consume(receiver: mpsc::Receiver<Flusher>, mut sink: Box<dyn ZipSink>) -> Result<()> {
    debug!("flush consumer started");
    let mut applied = 0u64;
    while let Ok(flusher) = receiver.recv() {
        trace!(kind = flusher.kind(), seq = applied, "apply flusher");
        apply(&mut *sink, &flusher)?;
        applied += 1;
        if flusher.is_end() {
            sink.finish()?;
            debug!(flushers = applied, "flush consumer stopped");
            return Ok(());
        }
    }
    warn!(flushers = applied, "flush queue closed before the document was finalized");
    Err(OdsError::Unfinished)
}
