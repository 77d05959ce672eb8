//! Debounced batching of node updates into a single grid rebuild.

use std::collections::BTreeMap;

use crate::graph::NodeRecord;

/// Collects node records until a burst of updates settles.
///
/// Each [`schedule`](Self::schedule) re-arms the deadline; only the last
/// armed deadline fires. Time is supplied by the caller.
#[derive(Debug, Clone)]
pub struct UpdateScheduler {
    delay_ms: f64,
    pending: BTreeMap<String, NodeRecord>,
    deadline: Option<f64>,
}

impl UpdateScheduler {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms,
            pending: BTreeMap::new(),
            deadline: None,
        }
    }

    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn pending_ids(&self) -> impl Iterator<Item = &str> {
        self.pending.keys().map(String::as_str)
    }

    /// Merge `nodes` into the pending set (latest record per id wins) and
    /// push the deadline out to `now_ms + delay`.
    pub fn schedule<'a>(&mut self, nodes: impl IntoIterator<Item = &'a NodeRecord>, now_ms: f64) {
        for node in nodes {
            self.pending.insert(node.id.clone(), node.clone());
        }
        self.deadline = Some(now_ms + self.delay_ms);
    }

    /// Take the batch if its deadline has passed.
    pub fn poll(&mut self, now_ms: f64) -> Option<Vec<NodeRecord>> {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => self.flush(),
            _ => None,
        }
    }

    /// Take the batch immediately, regardless of the deadline.
    pub fn flush(&mut self) -> Option<Vec<NodeRecord>> {
        self.deadline.take()?;
        Some(std::mem::take(&mut self.pending).into_values().collect())
    }

    /// Drop one node from the pending batch. The deadline is disarmed once
    /// nothing is left to apply.
    pub fn forget(&mut self, node_id: &str) {
        self.pending.remove(node_id);
        if self.pending.is_empty() {
            self.deadline = None;
        }
    }

    /// Drop the pending batch without firing it.
    pub fn cancel(&mut self) {
        self.deadline = None;
        self.pending.clear();
    }
}
