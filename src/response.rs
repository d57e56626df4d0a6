//! Host-bound replies: DSR/DA reports, DECRQSS answers, and mouse reports
//! the screen model queues for the embedder to write back to the PTY.
//!
//! The core never owns a file descriptor — it only accumulates the raw
//! bytes a response requires and hands them to the caller through
//! `Screen::take_responses`, mirroring how the teacher buffers
//! `pending_responses` until the next frame is flushed.

/// A bounded FIFO of outbound byte strings. Bounded so a pathological
/// flood of DSR requests (e.g. a hostile or buggy child process) cannot
/// grow this queue without limit between drains.
#[derive(Debug, Default)]
pub struct ResponseQueue {
    pending: Vec<Vec<u8>>,
    limit: usize,
}

impl ResponseQueue {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            limit: 256,
        }
    }

    /// Queue a response. If the queue is already at its limit, the oldest
    /// entry is dropped to make room — a stuck reader should lose stale
    /// reports rather than block ingestion.
    pub fn push(&mut self, bytes: Vec<u8>) {
        if self.pending.len() >= self.limit {
            tracing::warn!(limit = self.limit, "response queue full, dropping oldest reply");
            self.pending.remove(0);
        }
        self.pending.push(bytes);
    }

    /// Drain and return every response queued since the last call.
    pub fn take(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
