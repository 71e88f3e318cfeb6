use crate::stores::catalog_store::CatalogStore;
use crate::stores::review_store::ReviewStore;
use crate::stores::user_store::UserStore;
use crate::utils::time::current_timestamp;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

pub struct Metrics {
    pub registrations: AtomicU64,
    pub tokens_issued: AtomicU64,
    pub start_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub registrations: u64,
    pub tokens_issued: u64,
    pub users: usize,
    pub titles: usize,
    pub genres: usize,
    pub categories: usize,
    pub reviews: usize,
    pub comments: usize,
    pub uptime_seconds: i64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            registrations: AtomicU64::new(0),
            tokens_issued: AtomicU64::new(0),
            start_time: current_timestamp(),
        }
    }

    pub fn increment_registrations(&self) {
        self.registrations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_tokens_issued(&self) {
        self.tokens_issued.fetch_add(1, Ordering::Relaxed);
    }

    /// Counter values plus live store sizes.
    pub fn get_snapshot(
        &self,
        users: &UserStore,
        catalog: &CatalogStore,
        reviews: &ReviewStore,
    ) -> MetricsSnapshot {
        MetricsSnapshot {
            registrations: self.registrations.load(Ordering::Relaxed),
            tokens_issued: self.tokens_issued.load(Ordering::Relaxed),
            users: users.len(),
            titles: catalog.title_count(),
            genres: catalog.genre_count(),
            categories: catalog.category_count(),
            reviews: reviews.review_count(),
            comments: reviews.comment_count(),
            uptime_seconds: current_timestamp() - self.start_time,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
