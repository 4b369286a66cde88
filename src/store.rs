use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::article::Article;

/// The article set as of one refresh. Never mutated once published.
#[derive(Debug, Default)]
pub struct Snapshot {
    /// Registry order, then feed order within each source
    pub articles: Vec<Article>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Process-wide article store.
///
/// Starts empty, is filled by the startup refresh and is replaced wholesale
/// by every later refresh. Writers build the new article list off to the
/// side and swap it in under the write lock, so readers holding a
/// [`Snapshot`] keep seeing the old set until they ask again.
#[derive(Debug, Default)]
pub struct ArticleStore {
    current: RwLock<Arc<Snapshot>>,
}

impl ArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().await.clone()
    }

    /// Install `articles` as the new contents and return how many there are.
    pub async fn replace(&self, articles: Vec<Article>) -> usize {
        let count = articles.len();
        let next = Arc::new(Snapshot {
            articles,
            refreshed_at: Some(Utc::now()),
        });

        *self.current.write().await = next;
        count
    }

    pub async fn len(&self) -> usize {
        self.current.read().await.articles.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
