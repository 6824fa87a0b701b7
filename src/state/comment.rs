use crate::api::backend::BackendClient;
use crate::error::ClientError;
use crate::sync::optimistic;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use tracing::warn;

/// One comment as the backend stores it. Deleted comments stay in the
/// thread as tombstones so replies keep their anchor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: u64,
    #[serde(rename = "parentId", default)]
    pub parent_id: Option<u64>,
    pub author: String,
    pub body: String,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewComment {
    #[serde(rename = "eventId")]
    pub event_id: u64,
    #[serde(rename = "parentId")]
    pub parent_id: Option<u64>,
    pub author: String,
    pub body: String,
}

/// A comment tree for one event. Nodes are appended or replaced by id,
/// never reordered.
#[derive(Debug, Default)]
pub struct CommentThread {
    nodes: HashMap<u64, CommentRecord>,
    order: Vec<u64>,
}

impl CommentThread {
    pub fn from_records(records: Vec<CommentRecord>) -> Self {
        let mut thread = Self::default();
        for record in records {
            thread.insert(record);
        }
        thread
    }

    /// Append a new node, or replace an existing one in place.
    pub fn insert(&mut self, record: CommentRecord) {
        if !self.nodes.contains_key(&record.id) {
            self.order.push(record.id);
        }
        self.nodes.insert(record.id, record);
    }

    pub fn get(&self, id: u64) -> Option<&CommentRecord> {
        self.nodes.get(&id)
    }

    /// Direct children of `parent` (or roots for `None`), in append order.
    pub fn children(&self, parent: Option<u64>) -> Vec<&CommentRecord> {
        self.order
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .filter(|c| c.parent_id == parent)
            .collect()
    }

    /// Tombstone a node; it keeps its place so replies stay anchored.
    pub fn mark_deleted(&mut self, id: u64) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.deleted = true;
            node.body.clear();
        }
    }

    pub fn adjust_likes(&mut self, id: u64, delta: i32) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.likes = node.likes.saturating_add_signed(delta);
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Which comments this user liked, persisted best-effort in a local JSON
/// file keyed by user id. Corrupt or missing data degrades to an empty set.
#[derive(Debug)]
pub struct LikedStore {
    path: PathBuf,
    user_id: String,
    liked: HashSet<u64>,
}

impl LikedStore {
    pub fn load(path: PathBuf, user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        let liked = std::fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str::<HashMap<String, HashSet<u64>>>(&raw).ok())
            .and_then(|mut all| all.remove(&user_id))
            .unwrap_or_default();
        Self {
            path,
            user_id,
            liked,
        }
    }

    pub fn contains(&self, id: u64) -> bool {
        self.liked.contains(&id)
    }

    /// Flip the liked state; returns the new state.
    pub fn toggle(&mut self, id: u64) -> bool {
        if !self.liked.insert(id) {
            self.liked.remove(&id);
        }
        self.liked.contains(&id)
    }

    /// Write the set back, preserving other users' entries. Failures are
    /// logged and swallowed; the set lives on in memory.
    pub fn persist(&self) {
        let mut all: HashMap<String, HashSet<u64>> = std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        all.insert(self.user_id.clone(), self.liked.clone());

        let serialized = match serde_json::to_string(&all) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "could not serialize liked-comments store");
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, serialized) {
            warn!(path = %self.path.display(), error = %e, "could not persist liked comments");
        }
    }
}

/// Like / unlike with optimistic local update: the count changes at once,
/// and rolls back if the backend declines.
pub async fn toggle_like(
    thread: &mut CommentThread,
    store: &mut LikedStore,
    backend: &BackendClient,
    comment_id: u64,
) -> Result<bool, ClientError> {
    let now_liked = !store.contains(comment_id);
    let delta: i32 = if now_liked { 1 } else { -1 };

    optimistic(
        thread,
        |t| t.adjust_likes(comment_id, delta),
        |t| t.adjust_likes(comment_id, -delta),
        backend.set_comment_liked(comment_id, now_liked),
    )
    .await?;

    store.toggle(comment_id);
    store.persist();
    Ok(now_liked)
}
