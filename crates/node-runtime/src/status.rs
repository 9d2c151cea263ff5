//! # Submission Status Book
//!
//! Tracks every submission from intake to its final status. Pending entries
//! are never evicted; once more than `retention` entries are held, the oldest
//! final ones are dropped.

use parking_lot::RwLock;
use shared_types::{SubmissionId, SubmissionStatus};
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Default)]
struct Inner {
    statuses: HashMap<SubmissionId, SubmissionStatus>,
    order: VecDeque<SubmissionId>,
}

#[derive(Debug)]
pub struct StatusBook {
    inner: RwLock<Inner>,
    retention: usize,
}

impl StatusBook {
    pub fn new(retention: usize) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            retention: retention.max(1),
        }
    }

    pub fn get(&self, id: &SubmissionId) -> Option<SubmissionStatus> {
        self.inner.read().statuses.get(id).cloned()
    }

    pub fn contains(&self, id: &SubmissionId) -> bool {
        self.inner.read().statuses.contains_key(id)
    }

    /// Record a status. Returns `false` if `id` was already known, in which
    /// case nothing changes.
    pub fn insert_new(&self, id: SubmissionId, status: SubmissionStatus) -> bool {
        let mut inner = self.inner.write();
        if inner.statuses.contains_key(&id) {
            return false;
        }
        inner.order.push_back(id.clone());
        inner.statuses.insert(id, status);
        Self::evict(&mut inner, self.retention);
        true
    }

    /// Mark `id` pending, replacing whatever was recorded for it at intake.
    pub fn admit(&self, id: SubmissionId) {
        let mut inner = self.inner.write();
        if inner
            .statuses
            .insert(id.clone(), SubmissionStatus::Pending)
            .is_none()
        {
            inner.order.push_back(id);
        }
        Self::evict(&mut inner, self.retention);
    }

    /// Move a known submission to its final status.
    pub fn finish(&self, id: &SubmissionId, status: SubmissionStatus) {
        let mut inner = self.inner.write();
        if let Some(entry) = inner.statuses.get_mut(id) {
            *entry = status;
        }
        Self::evict(&mut inner, self.retention);
    }

    pub fn len(&self) -> usize {
        self.inner.read().statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn evict(inner: &mut Inner, retention: usize) {
        let mut budget = inner.order.len();
        while inner.statuses.len() > retention && budget > 0 {
            budget -= 1;
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            match inner.statuses.get(&oldest) {
                Some(status) if !status.is_final() => inner.order.push_back(oldest),
                _ => {
                    inner.statuses.remove(&oldest);
                }
            }
        }
    }
}
