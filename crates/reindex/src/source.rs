// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Object id sources and the shared cursor workers pull batches from

use std::sync::Mutex;

/// Finite, closable, consume-once sequence of object ids
pub trait IdSource: Send {
    /// Next id, or `None` once exhausted
    fn next_id(&mut self) -> Option<String>;

    /// Release whatever backs the source (file handles, directory walkers)
    fn close(&mut self) {}
}

/// Adapts any iterator of ids into an [`IdSource`]
///
/// Closing drops the iterator, releasing anything it owns.
pub struct IterSource<I> {
    iter: Option<I>,
}

impl<I> IterSource<I> {
    pub fn new(iter: I) -> Self {
        Self { iter: Some(iter) }
    }

    pub fn is_closed(&self) -> bool {
        self.iter.is_none()
    }
}

impl<I> IdSource for IterSource<I>
where
    I: Iterator<Item = String> + Send,
{
    fn next_id(&mut self) -> Option<String> {
        self.iter.as_mut()?.next()
    }

    fn close(&mut self) {
        self.iter = None;
    }
}

/// Serializes consumption of an [`IdSource`] across concurrent workers
///
/// Exactly one caller advances the source at a time, so every id is handed
/// out once. The mutex is held only while pulling a single batch. The source
/// is closed when the cursor is dropped if nobody closed it first.
pub struct IdCursor {
    source: Mutex<Option<Box<dyn IdSource>>>,
}

impl IdCursor {
    pub fn new(source: impl IdSource + 'static) -> Self {
        Self {
            source: Mutex::new(Some(Box::new(source))),
        }
    }

    /// Pull up to `limit` ids; empty once the source is exhausted or closed
    pub fn next_batch(&self, limit: usize) -> Vec<String> {
        let mut guard = self.source.lock().unwrap_or_else(|e| e.into_inner());
        let Some(source) = guard.as_mut() else {
            return Vec::new();
        };

        let mut ids = Vec::with_capacity(limit.min(1024));
        while ids.len() < limit {
            match source.next_id() {
                Some(id) => ids.push(id),
                None => break,
            }
        }
        ids
    }

    /// Close and drop the source. Returns false if it was already closed.
    pub fn close(&self) -> bool {
        let taken = self
            .source
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        match taken {
            Some(mut source) => {
                source.close();
                true
            }
            None => false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.source
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_none()
    }
}

impl Drop for IdCursor {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for IdCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdCursor")
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
