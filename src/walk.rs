//! Depth-first traversal of a widget tree.
//!
//! The walker is a plain iterator over an externally owned tree. Because the
//! consumer needs to call [`Walker::skip_children`] and [`Walker::depth`]
//! between steps, iterate with `while let` instead of `for`:
//!
//! ```ignore
//! let mut walker = walk(Some(window), false);
//! while let Some(w) = walker.next() {
//!     if w.name() == "MenuBar" {
//!         walker.skip_children();
//!     }
//! }
//! ```
//!
//! The tree must be acyclic. Nothing here detects cycles.

/// Capabilities the walker needs from a tree node.
///
/// Nodes are handles: cloning one must be cheap and must not copy the
/// subtree.
pub trait Node: Clone {
    /// Ordered children. Leaves return an empty vector.
    fn children(&self) -> Vec<Self>;

    /// Distinguished submenu child, reached through a separate edge.
    fn submenu(&self) -> Option<Self>;

    /// Name used by callers for matching. The walker never reads it.
    fn name(&self) -> String;
}

/// One level of the implicit call stack.
struct Frame<N> {
    node: N,
    children: std::vec::IntoIter<N>,
    submenu_pending: bool,
}

/// Lazy pre-order traversal. Not rewindable: create a new one to walk again.
pub struct Walker<N: Node> {
    root: Option<N>,
    stack: Vec<Frame<N>>,
    /// Last yielded node whose descendants have not been entered yet.
    pending: Option<N>,
    visit_submenu: bool,
    skip_requested: bool,
    depth: usize,
}

/// Start a traversal at `root`. An absent root yields nothing.
pub fn walk<N: Node>(root: Option<N>, visit_submenu: bool) -> Walker<N> {
    Walker::new(root, visit_submenu)
}

impl<N: Node> Walker<N> {
    pub fn new(root: Option<N>, visit_submenu: bool) -> Self {
        Self {
            root,
            stack: Vec::new(),
            pending: None,
            visit_submenu,
            skip_requested: false,
            depth: 0,
        }
    }

    /// Nesting level of the most recently yielded node (root = 0).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Do not descend into the node just yielded (neither its children nor
    /// its submenu). Honoured once, then reset.
    pub fn skip_children(&mut self) {
        self.skip_requested = true;
    }

    fn descend(&mut self, node: N) {
        if self.skip_requested {
            self.skip_requested = false;
            return;
        }
        let children = node.children().into_iter();
        self.stack.push(Frame {
            node,
            children,
            submenu_pending: self.visit_submenu,
        });
    }

    fn yield_node(&mut self, node: N, depth: usize) -> Option<N> {
        self.depth = depth;
        self.pending = Some(node.clone());
        Some(node)
    }
}

impl<N: Node> Iterator for Walker<N> {
    type Item = N;

    fn next(&mut self) -> Option<N> {
        if let Some(root) = self.root.take() {
            return self.yield_node(root, 0);
        }

        if let Some(node) = self.pending.take() {
            self.descend(node);
        }

        loop {
            let depth = self.stack.len();
            let frame = self.stack.last_mut()?;

            if let Some(child) = frame.children.next() {
                return self.yield_node(child, depth);
            }

            // Children exhausted: the submenu subtree comes last.
            if frame.submenu_pending {
                frame.submenu_pending = false;
                if let Some(submenu) = frame.node.submenu() {
                    return self.yield_node(submenu, depth);
                }
            }

            self.stack.pop();
        }
    }
}
