/// Bounded in-memory ranking index.
///
/// Backed by a size-augmented treap keyed by the canonical tie-break order
/// `(score DESC, id ASC)`, plus an id → score map for O(1) score lookups.
/// Rank and range queries walk the subtree sizes, so `rank` is O(log n) and
/// `range_by_rank` is O(log n + m) for a window of m entries.
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rand::Rng;

/// Composite sort key. Higher scores order first; equal scores order by
/// ascending id, identical to the store's window queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RankKey {
    score: i64,
    id: i64,
}

impl Ord for RankKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for RankKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

type Link = Option<Box<Node>>;

#[derive(Debug)]
struct Node {
    key: RankKey,
    priority: u64,
    size: usize,
    left: Link,
    right: Link,
}

impl Node {
    fn leaf(key: RankKey, priority: u64) -> Box<Node> {
        Box::new(Node {
            key,
            priority,
            size: 1,
            left: None,
            right: None,
        })
    }

    fn update(&mut self) {
        self.size = 1 + subtree_size(&self.left) + subtree_size(&self.right);
    }
}

fn subtree_size(link: &Link) -> usize {
    link.as_ref().map_or(0, |n| n.size)
}

fn merge(a: Link, b: Link) -> Link {
    match (a, b) {
        (None, b) => b,
        (a, None) => a,
        (Some(mut a), Some(mut b)) => {
            if a.priority >= b.priority {
                a.right = merge(a.right.take(), Some(b));
                a.update();
                Some(a)
            } else {
                b.left = merge(Some(a), b.left.take());
                b.update();
                Some(b)
            }
        }
    }
}

/// Splits into (keys < key, keys >= key).
fn split(link: Link, key: &RankKey) -> (Link, Link) {
    match link {
        None => (None, None),
        Some(mut node) => {
            if node.key < *key {
                let (lo, hi) = split(node.right.take(), key);
                node.right = lo;
                node.update();
                (Some(node), hi)
            } else {
                let (lo, hi) = split(node.left.take(), key);
                node.left = hi;
                node.update();
                (lo, Some(node))
            }
        }
    }
}

fn remove(link: Link, key: &RankKey) -> (Link, bool) {
    match link {
        None => (None, false),
        Some(mut node) => match key.cmp(&node.key) {
            Ordering::Equal => (merge(node.left.take(), node.right.take()), true),
            Ordering::Less => {
                let (left, removed) = remove(node.left.take(), key);
                node.left = left;
                node.update();
                (Some(node), removed)
            }
            Ordering::Greater => {
                let (right, removed) = remove(node.right.take(), key);
                node.right = right;
                node.update();
                (Some(node), removed)
            }
        },
    }
}

/// Number of keys strictly ordered before `key`.
fn count_before(link: &Link, key: &RankKey) -> usize {
    let mut acc = 0;
    let mut cur = link;
    while let Some(node) = cur {
        if node.key < *key {
            acc += subtree_size(&node.left) + 1;
            cur = &node.right;
        } else {
            cur = &node.left;
        }
    }
    acc
}

/// Collects ids for ranks in `[start, end]` (inclusive, subtree-relative).
fn collect_range(link: &Link, start: usize, end: usize, out: &mut Vec<i64>) {
    let Some(node) = link else { return };
    let left_size = subtree_size(&node.left);
    if start < left_size {
        collect_range(&node.left, start, end.min(left_size - 1), out);
    }
    if start <= left_size && left_size <= end {
        out.push(node.key.id);
    }
    if end > left_size {
        let next_start = start.saturating_sub(left_size + 1);
        collect_range(&node.right, next_start, end - left_size - 1, out);
    }
}

#[derive(Default)]
struct Inner {
    root: Link,
    scores: HashMap<i64, i64>,
}

impl Inner {
    fn insert_or_update(&mut self, id: i64, score: i64) {
        if let Some(&existing) = self.scores.get(&id) {
            if existing == score {
                return;
            }
            let old_key = RankKey {
                score: existing,
                id,
            };
            let (root, _) = remove(self.root.take(), &old_key);
            self.root = root;
        }
        let key = RankKey { score, id };
        let (lo, hi) = split(self.root.take(), &key);
        let node = Node::leaf(key, rand::thread_rng().gen::<u64>());
        self.root = merge(merge(lo, Some(node)), hi);
        self.scores.insert(id, score);
    }

    fn remove_id(&mut self, id: i64) -> bool {
        let Some(score) = self.scores.remove(&id) else {
            return false;
        };
        let (root, removed) = remove(self.root.take(), &RankKey { score, id });
        self.root = root;
        removed
    }

    fn len(&self) -> usize {
        subtree_size(&self.root)
    }
}

pub struct RankIndex {
    inner: RwLock<Inner>,
}

impl Default for RankIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl RankIndex {
    pub fn new() -> Self {
        RankIndex {
            inner: RwLock::new(Inner::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets the score for `id`, inserting it if absent. Idempotent under
    /// retry: re-applying the same score is a no-op.
    pub fn insert_or_update(&self, id: i64, score: i64) {
        self.write().insert_or_update(id, score);
    }

    /// Drops every entry ranked strictly below position `capacity` under the
    /// tie-break order and returns the evicted ids. Called after every write
    /// that can grow the set.
    pub fn evict_beyond(&self, capacity: usize) -> Vec<i64> {
        let mut inner = self.write();
        let len = inner.len();
        if len <= capacity {
            return Vec::new();
        }
        let mut victims = Vec::with_capacity(len - capacity);
        collect_range(&inner.root, capacity, len - 1, &mut victims);
        for id in &victims {
            inner.remove_id(*id);
        }
        victims
    }

    /// 0-based descending rank of `id` among cached entries. `None` is the
    /// cache-miss signal (evicted or never cached), not an error.
    pub fn rank(&self, id: i64) -> Option<usize> {
        let inner = self.read();
        let score = *inner.scores.get(&id)?;
        Some(count_before(&inner.root, &RankKey { score, id }))
    }

    pub fn score_of(&self, id: i64) -> Option<i64> {
        self.read().scores.get(&id).copied()
    }

    /// Ids for ranks `[start, end]` inclusive, ascending by rank. The window
    /// clamps to `[0, len - 1]`; an inverted or out-of-bounds window yields
    /// an empty result.
    pub fn range_by_rank(&self, start: usize, end: usize) -> Vec<i64> {
        let inner = self.read();
        let len = inner.len();
        if len == 0 || start > end || start >= len {
            return Vec::new();
        }
        let end = end.min(len - 1);
        let mut out = Vec::with_capacity(end - start + 1);
        collect_range(&inner.root, start, end, &mut out);
        out
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops all entries. Used only by resync.
    pub fn clear(&self) {
        let mut inner = self.write();
        inner.root = None;
        inner.scores.clear();
    }

    /// Replaces the whole index in one batch. The replacement is built
    /// off-lock so concurrent readers see either the old or the new
    /// projection, never a half-loaded one.
    pub fn replace_all<I: IntoIterator<Item = (i64, i64)>>(&self, entries: I) {
        let mut fresh = Inner::default();
        for (id, score) in entries {
            fresh.insert_or_update(id, score);
        }
        *self.write() = fresh;
    }
}
