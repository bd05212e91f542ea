use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Maximum number of article ids remembered per user.
pub const HISTORY_CAP: usize = 5;

/// Per-user history of recently viewed article ids, most-recent-first.
///
/// The store lives in process memory only and is lost on restart. Lists are
/// created lazily on a user's first recorded view and are never expired as a
/// whole; only individual ids are evicted past [`HISTORY_CAP`].
///
/// All access goes through a single mutex so the read-modify-write of
/// [`record_view`](Self::record_view) is atomic across concurrent requests.
#[derive(Clone, Default)]
pub struct RecencyTracker {
    views: Arc<Mutex<HashMap<i64, Vec<i64>>>>,
}

impl RecencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `user_id` viewed `article_id`.
    ///
    /// A re-viewed id is moved back to the front rather than duplicated.
    /// When the list grows past [`HISTORY_CAP`], the oldest id is evicted.
    /// Callers are expected to have confirmed the article exists; the
    /// tracker itself never fails.
    pub async fn record_view(&self, user_id: i64, article_id: i64) {
        let mut views = self.views.lock().await;
        let list = views.entry(user_id).or_default();
        list.retain(|&id| id != article_id);
        list.insert(0, article_id);
        list.truncate(HISTORY_CAP);
    }

    /// Article ids `user_id` viewed most recently, newest first.
    ///
    /// Empty when the user has no recorded views. Index order is the sort
    /// key callers use to restore recency order after resolving ids to full
    /// records, since an id-set lookup may return rows in any order.
    pub async fn get_recent(&self, user_id: i64) -> Vec<i64> {
        let views = self.views.lock().await;
        views.get(&user_id).cloned().unwrap_or_default()
    }
}
