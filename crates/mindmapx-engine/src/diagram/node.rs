use serde::Serialize;

use crate::index::LineSpan;

/// One node of the diagram tree.
///
/// Nodes are values produced fresh by every transform. Nothing tracks a node
/// across syncs; callers re-match by text through the node-line index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub content: String,
    pub children: Vec<Node>,
    pub depth: usize,
    /// Source line of the heading or list item, when there is one
    pub lines: Option<LineSpan>,
}

impl Node {
    pub fn new(content: impl Into<String>, depth: usize) -> Self {
        Self {
            content: content.into(),
            children: Vec::new(),
            depth,
            lines: None,
        }
    }

    /// Synthetic root holding several top-level nodes
    pub fn root() -> Self {
        Self::new(String::new(), 0)
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Total number of nodes in this subtree, including `self`
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }

    /// Depth-first, pre-order walk
    pub fn walk(&self) -> NodeWalk<'_> {
        NodeWalk { stack: vec![self] }
    }

    /// Rewrite `depth` so that `self` sits at `depth` and children follow
    pub(crate) fn assign_depth(&mut self, depth: usize) {
        self.depth = depth;
        for child in &mut self.children {
            child.assign_depth(depth + 1);
        }
    }
}

pub struct NodeWalk<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for NodeWalk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Optional rendering features the document text made use of.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeatureSet {
    pub code: bool,
    pub links: bool,
    pub emphasis: bool,
}

/// Output of a transform: the tree and the features it needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    pub root: Node,
    pub features: FeatureSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_is_pre_order() {
        let tree = Node::new("root", 0).with_children(vec![
            Node::new("a", 1).with_children(vec![Node::new("a1", 2)]),
            Node::new("b", 1),
        ]);

        let order: Vec<&str> = tree.walk().map(|n| n.content.as_str()).collect();
        assert_eq!(order, vec!["root", "a", "a1", "b"]);
        assert_eq!(tree.count(), 4);
    }

    #[test]
    fn test_assign_depth() {
        let mut tree = Node::new("a", 3).with_children(vec![Node::new("b", 7)]);
        tree.assign_depth(0);
        assert_eq!(tree.depth, 0);
        assert_eq!(tree.children[0].depth, 1);
    }
}
