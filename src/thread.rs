//! Lazily populated comment trees.
//!
//! Top-level comments of a story are loaded in fixed-size batches, each
//! batch fetched concurrently and appended only once all of its items have
//! arrived. Replies of a comment are fetched on its first expansion; later
//! expansions reuse the loaded subtree.

use crate::app::Result;
use crate::cache::Freshness;
use crate::domain::Item;
use crate::fetcher::parallel::ParallelFetcher;

pub const DEFAULT_BATCH_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub enum Children {
    /// The comment has no replies.
    Leaf,
    /// Replies exist but have not been requested.
    Unloaded,
    /// Replies are being fetched.
    Loading,
    Loaded(Vec<CommentNode>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentNode {
    pub item: Item,
    /// Written by the author of the thread's root item.
    pub is_op: bool,
    pub expanded: bool,
    pub children: Children,
}

impl CommentNode {
    fn new(item: Item, op: Option<&str>) -> Self {
        let is_op = op.is_some() && item.by.as_deref() == op;
        let children = if item.has_kids() {
            Children::Unloaded
        } else {
            Children::Leaf
        };

        Self {
            item,
            is_op,
            expanded: false,
            children,
        }
    }

    pub fn id(&self) -> u64 {
        self.item.id
    }

    pub fn is_leaf(&self) -> bool {
        self.children == Children::Leaf
    }

    pub fn is_loading(&self) -> bool {
        self.children == Children::Loading
    }

    pub fn loaded_children(&self) -> &[CommentNode] {
        match &self.children {
            Children::Loaded(nodes) => nodes,
            _ => &[],
        }
    }

    fn find_mut(&mut self, id: u64) -> Option<&mut CommentNode> {
        if self.id() == id {
            return Some(self);
        }
        match &mut self.children {
            Children::Loaded(nodes) => nodes.iter_mut().find_map(|n| n.find_mut(id)),
            _ => None,
        }
    }

    fn find(&self, id: u64) -> Option<&CommentNode> {
        if self.id() == id {
            return Some(self);
        }
        self.loaded_children().iter().find_map(|n| n.find(id))
    }

    /// Forget fetches that were started elsewhere so they can be issued again.
    fn reset_pending(&mut self) {
        if self.is_loading() {
            self.children = Children::Unloaded;
        }
        if let Children::Loaded(nodes) = &mut self.children {
            nodes.iter_mut().for_each(CommentNode::reset_pending);
        }
    }

    /// IDs of nodes in this subtree that are not yet fully open.
    fn collect_closed(&self, out: &mut Vec<u64>) {
        if self.is_leaf() {
            return;
        }
        if !self.expanded || self.children == Children::Unloaded {
            out.push(self.id());
        }
        for child in self.loaded_children() {
            child.collect_closed(out);
        }
    }
}

/// A row of the flattened, currently visible tree.
#[derive(Debug, Clone, Copy)]
pub struct VisibleNode<'a> {
    pub depth: usize,
    pub node: &'a CommentNode,
}

/// Turn fetched siblings into nodes, silently dropping missing, deleted and
/// dead items.
fn build_nodes(items: Vec<Option<Item>>, op: Option<&str>) -> Vec<CommentNode> {
    items
        .into_iter()
        .flatten()
        .filter(|item| !item.is_tombstone())
        .map(|item| CommentNode::new(item, op))
        .collect()
}

/// The discussion below a story.
#[derive(Debug, Clone)]
pub struct Thread {
    root: Item,
    op: Option<String>,
    batch_size: usize,
    cursor: usize,
    comments: Vec<CommentNode>,
}

impl Thread {
    pub fn new(root: Item, batch_size: usize) -> Self {
        let op = root.by.clone();
        Self {
            root,
            op,
            batch_size: batch_size.max(1),
            cursor: 0,
            comments: Vec::new(),
        }
    }

    pub fn root(&self) -> &Item {
        &self.root
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn comments(&self) -> &[CommentNode] {
        &self.comments
    }

    /// Whether the "load more" control should be offered.
    pub fn has_more(&self) -> bool {
        self.cursor < self.root.kids().len()
    }

    /// Top-level IDs not requested yet.
    pub fn remaining(&self) -> usize {
        self.root.kids().len().saturating_sub(self.cursor)
    }

    /// The next batch of top-level IDs, empty when everything was requested.
    pub fn next_batch_ids(&self) -> Vec<u64> {
        let kids = self.root.kids();
        let end = (self.cursor + self.batch_size).min(kids.len());
        kids[self.cursor.min(end)..end].to_vec()
    }

    /// Append the results of [`next_batch_ids`](Self::next_batch_ids), in the
    /// same order. Returns how many nodes were added.
    pub fn append_batch(&mut self, items: Vec<Option<Item>>) -> usize {
        self.cursor = (self.cursor + items.len()).min(self.root.kids().len());
        let nodes = build_nodes(items, self.op.as_deref());
        let added = nodes.len();
        self.comments.extend(nodes);
        added
    }

    /// Fetch and append the next batch of top-level comments.
    pub async fn load_more(
        &mut self,
        parallel: &ParallelFetcher,
        freshness: Freshness,
    ) -> Result<usize> {
        let ids = self.next_batch_ids();
        if ids.is_empty() {
            return Ok(0);
        }

        let items = parallel.fetch_all(&ids, freshness).await?;
        let added = self.append_batch(items);
        tracing::debug!(
            "Thread {}: rendered {} comments, {} remaining",
            self.root.id,
            added,
            self.remaining()
        );
        Ok(added)
    }

    pub fn find(&self, id: u64) -> Option<&CommentNode> {
        self.comments.iter().find_map(|n| n.find(id))
    }

    fn find_mut(&mut self, id: u64) -> Option<&mut CommentNode> {
        self.comments.iter_mut().find_map(|n| n.find_mut(id))
    }

    /// Open a comment. On the first expansion returns the reply IDs to
    /// fetch and marks the node as loading; afterwards returns `None`.
    pub fn begin_expand(&mut self, id: u64) -> Option<Vec<u64>> {
        let node = self.find_mut(id)?;
        if node.is_leaf() {
            return None;
        }
        node.expanded = true;

        if node.children == Children::Unloaded {
            node.children = Children::Loading;
            Some(node.item.kids().to_vec())
        } else {
            None
        }
    }

    /// Install the replies fetched for `id`. Returns how many were added.
    ///
    /// Ignored unless `id` is still waiting for them, so a late answer never
    /// replaces a subtree that was loaded another way.
    pub fn finish_expand(&mut self, id: u64, items: Vec<Option<Item>>) -> usize {
        let op = self.op.clone();
        let Some(node) = self.find_mut(id).filter(|n| n.is_loading()) else {
            return 0;
        };
        let nodes = build_nodes(items, op.as_deref());
        let added = nodes.len();
        node.children = Children::Loaded(nodes);
        added
    }

    /// Roll back a failed expansion so it can be retried.
    pub fn abort_expand(&mut self, id: u64) {
        if let Some(node) = self.find_mut(id) {
            if node.children == Children::Loading {
                node.children = Children::Unloaded;
            }
            node.expanded = false;
        }
    }

    /// Hide the replies of `id` without discarding them.
    pub fn collapse(&mut self, id: u64) {
        if let Some(node) = self.find_mut(id) {
            node.expanded = false;
        }
    }

    /// Collapse an open comment or start expanding a closed one.
    pub fn toggle(&mut self, id: u64) -> Option<Vec<u64>> {
        if self.find(id)?.expanded {
            self.collapse(id);
            None
        } else {
            self.begin_expand(id)
        }
    }

    /// Expand `id`, fetching its replies the first time.
    pub async fn expand(
        &mut self,
        id: u64,
        parallel: &ParallelFetcher,
        freshness: Freshness,
    ) -> Result<usize> {
        let Some(kids) = self.begin_expand(id) else {
            return Ok(0);
        };

        match parallel.fetch_all(&kids, freshness).await {
            Ok(items) => Ok(self.finish_expand(id, items)),
            Err(e) => {
                self.abort_expand(id);
                Err(e)
            }
        }
    }

    /// Load every remaining batch and open the whole reply tree.
    ///
    /// Replies still marked as loading are fetched again, since the request
    /// that marked them reports to another copy of the thread.
    pub async fn expand_all(&mut self, parallel: &ParallelFetcher, freshness: Freshness) -> Result<()> {
        self.comments.iter_mut().for_each(CommentNode::reset_pending);
        while self.has_more() {
            self.load_more(parallel, freshness).await?;
        }

        loop {
            let mut closed = Vec::new();
            for node in &self.comments {
                node.collect_closed(&mut closed);
            }
            if closed.is_empty() {
                break;
            }
            for id in closed {
                self.expand(id, parallel, freshness).await?;
            }
        }

        Ok(())
    }

    /// Depth-first rows of everything currently shown.
    pub fn visible_nodes(&self) -> Vec<VisibleNode<'_>> {
        fn walk<'a>(nodes: &'a [CommentNode], depth: usize, out: &mut Vec<VisibleNode<'a>>) {
            for node in nodes {
                out.push(VisibleNode { depth, node });
                if node.expanded {
                    walk(node.loaded_children(), depth + 1, out);
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.comments, 0, &mut out);
        out
    }
}
