use super::error::TreeError;
use super::node::{Node, NodeId};

/// Arena-backed rooted tree. Removed nodes are soft-deleted, so ids stay
/// valid for the lifetime of the tree and clones are cheap to prune.
#[derive(Debug, Default, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the first tree of a Newick string.
    ///
    /// ```
    /// use ogr::libs::phylo::Tree;
    ///
    /// let tree = Tree::from_newick("((X:1,Y:2):0.5,Z:3);").unwrap();
    /// assert_eq!(tree.leaf_names(), vec!["X", "Y", "Z"]);
    /// assert!(tree.is_binary());
    ///
    /// assert!(Tree::from_newick("(X,Y:oops);").is_err());
    /// ```
    pub fn from_newick(input: &str) -> Result<Self, TreeError> {
        super::parser::parse_newick(input)
    }

    /// Read the first tree of a Newick file (or `stdin`).
    pub fn from_file(infile: &str) -> anyhow::Result<Self> {
        let text = crate::read_to_string(infile)?;
        let tree = Self::from_newick(&text)
            .map_err(|e| anyhow::anyhow!("{}: {}", infile, e))?;
        log::info!(
            "species tree with {} leaves read from {}",
            tree.leaves().len(),
            infile
        );
        Ok(tree)
    }

    pub fn add_node(&mut self) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node::new(id));
        id
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| !n.deleted).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, id: NodeId) {
        if self.get_node(id).is_some() {
            self.root = Some(id);
        }
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id).filter(|n| !n.deleted)
    }

    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id).filter(|n| !n.deleted)
    }

    pub fn add_child(&mut self, parent_id: NodeId, child_id: NodeId) -> Result<(), TreeError> {
        if parent_id == child_id {
            return Err(TreeError::LogicError(
                "Cannot add node as child of itself".to_string(),
            ));
        }
        if self.get_node(parent_id).is_none() {
            return Err(TreeError::LogicError(format!(
                "Parent node {} not found",
                parent_id
            )));
        }
        match self.get_node(child_id) {
            None => {
                return Err(TreeError::LogicError(format!(
                    "Child node {} not found",
                    child_id
                )))
            }
            Some(child) if child.parent.is_some() => {
                return Err(TreeError::LogicError(format!(
                    "Node {} already has a parent",
                    child_id
                )))
            }
            _ => {}
        }

        self.nodes[child_id].parent = Some(parent_id);
        self.nodes[parent_id].children.push(child_id);
        Ok(())
    }

    /// Soft-delete a node and all of its descendants.
    pub fn remove_node(&mut self, id: NodeId) {
        if self.get_node(id).is_none() {
            return;
        }

        if let Some(parent_id) = self.nodes[id].parent {
            self.nodes[parent_id].children.retain(|&c| c != id);
        }

        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let node = &mut self.nodes[cur];
            stack.append(&mut node.children);
            node.deleted = true;
            node.parent = None;
        }

        if self.root == Some(id) {
            self.root = None;
        }
    }

    /// Splice a non-root node out, handing its children to its parent.
    /// The children's branches absorb the removed branch length.
    pub fn collapse_node(&mut self, id: NodeId) -> Result<(), TreeError> {
        let (parent_id, length) = match self.get_node(id) {
            None => return Err(TreeError::LogicError(format!("Node {} not found", id))),
            Some(node) => match node.parent {
                None => {
                    return Err(TreeError::LogicError(
                        "Cannot collapse root node".to_string(),
                    ))
                }
                Some(p) => (p, node.length),
            },
        };

        let children = std::mem::take(&mut self.nodes[id].children);
        for &child in &children {
            let node = &mut self.nodes[child];
            node.parent = Some(parent_id);
            node.length = match (length, node.length) {
                (Some(p), Some(c)) => Some(p + c),
                (p, c) => p.or(c),
            };
        }

        let siblings = &mut self.nodes[parent_id].children;
        if let Some(pos) = siblings.iter().position(|&x| x == id) {
            siblings.splice(pos..pos + 1, children);
        }

        let node = &mut self.nodes[id];
        node.deleted = true;
        node.parent = None;
        Ok(())
    }

    /// Node ids under `start`, children before their parent.
    pub fn postorder(&self, start: NodeId) -> Vec<NodeId> {
        fn walk(tree: &Tree, id: NodeId, out: &mut Vec<NodeId>) {
            if let Some(node) = tree.get_node(id) {
                for &child in &node.children {
                    walk(tree, child, out);
                }
                out.push(id);
            }
        }

        let mut out = vec![];
        walk(self, start, &mut out);
        out
    }

    /// Leaves under `start`, left to right.
    pub fn leaves_of(&self, start: NodeId) -> Vec<NodeId> {
        self.postorder(start)
            .into_iter()
            .filter(|&id| self.nodes[id].is_leaf())
            .collect()
    }

    pub fn leaves(&self) -> Vec<NodeId> {
        match self.root {
            Some(root) => self.leaves_of(root),
            None => vec![],
        }
    }

    pub fn leaf_names(&self) -> Vec<&str> {
        self.leaves()
            .into_iter()
            .filter_map(|id| self.nodes[id].name.as_deref())
            .collect()
    }

    /// Every internal node has exactly two children.
    pub fn is_binary(&self) -> bool {
        match self.root {
            None => true,
            Some(root) => self.postorder(root).into_iter().all(|id| {
                let n = self.nodes[id].children.len();
                n == 0 || n == 2
            }),
        }
    }

    /// Distance from `start` to each leaf below it, summing branch lengths
    /// (missing lengths count as zero). Leaves come left to right.
    pub fn leaf_distances(&self, start: NodeId) -> Vec<(NodeId, f64)> {
        fn walk(tree: &Tree, id: NodeId, dist: f64, out: &mut Vec<(NodeId, f64)>) {
            if let Some(node) = tree.get_node(id) {
                if node.is_leaf() {
                    out.push((id, dist));
                }
                for &child in &node.children {
                    walk(tree, child, dist + tree.nodes[child].branch(), out);
                }
            }
        }

        let mut out = vec![];
        walk(self, start, 0.0, &mut out);
        out
    }

    /// Keep only the leaves accepted by `keep`, then tidy up: internal nodes
    /// left without children go, non-root nodes with a single child are
    /// collapsed, and a root with a single child hands the root over to it.
    ///
    /// ```
    /// use ogr::libs::phylo::Tree;
    ///
    /// let mut tree = Tree::from_newick("(((A:1,B:1):1,C:2):1,D:3);").unwrap();
    /// tree.retain_leaves(|name| name == "A" || name == "C");
    /// assert_eq!(tree.to_newick(), "(A:2,C:2);");
    /// ```
    pub fn retain_leaves<F>(&mut self, keep: F)
    where
        F: Fn(&str) -> bool,
    {
        let root = match self.root {
            Some(root) => root,
            None => return,
        };
        let order = self.postorder(root);

        let internal: Vec<NodeId> = order
            .iter()
            .copied()
            .filter(|&id| !self.nodes[id].is_leaf())
            .collect();

        for &id in &order {
            let node = &self.nodes[id];
            if node.is_leaf() && !node.name.as_deref().map(&keep).unwrap_or(false) {
                self.remove_node(id);
            }
        }

        // postorder lets emptiness cascade upwards
        for &id in &internal {
            if self.get_node(id).map(|n| n.is_leaf()).unwrap_or(false) {
                self.remove_node(id);
            }
        }

        for &id in &internal {
            let single = self
                .get_node(id)
                .map(|n| n.parent.is_some() && n.children.len() == 1)
                .unwrap_or(false);
            if single {
                // cannot fail: the node is alive and not the root
                let _ = self.collapse_node(id);
            }
        }

        while let Some(root) = self.root {
            let node = &self.nodes[root];
            if node.children.len() != 1 {
                break;
            }
            let child = node.children[0];
            let old = &mut self.nodes[root];
            old.children.clear();
            old.deleted = true;
            let new_root = &mut self.nodes[child];
            new_root.parent = None;
            new_root.length = None;
            self.root = Some(child);
        }
    }

    /// Newick text with names and branch lengths.
    pub fn to_newick(&self) -> String {
        fn write(tree: &Tree, id: NodeId, out: &mut String) {
            let node = &tree.nodes[id];
            if !node.children.is_empty() {
                out.push('(');
                for (i, &child) in node.children.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write(tree, child, out);
                }
                out.push(')');
            }
            if let Some(name) = &node.name {
                out.push_str(name);
            }
            if let Some(length) = node.length {
                out.push_str(&format!(":{}", length));
            }
        }

        let mut out = String::new();
        if let Some(root) = self.root {
            write(self, root, &mut out);
        }
        out.push(';');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn build() -> Tree {
        // ((A:1,B:2)n1:0.5,C:3)root;
        let mut tree = Tree::new();
        let root = tree.add_node();
        let n1 = tree.add_node();
        let a = tree.add_node();
        let b = tree.add_node();
        let c = tree.add_node();
        tree.set_root(root);
        tree.add_child(root, n1).unwrap();
        tree.add_child(root, c).unwrap();
        tree.add_child(n1, a).unwrap();
        tree.add_child(n1, b).unwrap();

        for (id, name, len) in [(n1, "n1", 0.5), (a, "A", 1.0), (b, "B", 2.0), (c, "C", 3.0)] {
            let node = tree.get_node_mut(id).unwrap();
            node.name = Some(name.to_string());
            node.length = Some(len);
        }
        tree.get_node_mut(root).unwrap().name = Some("root".to_string());
        tree
    }

    #[test]
    fn test_add_child_checks() {
        let mut tree = build();
        assert!(tree.add_child(0, 0).is_err());
        assert!(tree.add_child(0, 2).is_err());
        assert!(tree.add_child(0, 99).is_err());
    }

    #[test]
    fn test_postorder_and_leaves() {
        let tree = build();
        assert_eq!(tree.postorder(0), vec![2, 3, 1, 4, 0]);
        assert_eq!(tree.leaf_names(), vec!["A", "B", "C"]);
        assert!(tree.is_binary());
        assert_eq!(tree.to_newick(), "((A:1,B:2)n1:0.5,C:3)root;");
    }

    #[test]
    fn test_leaf_distances() {
        let tree = build();
        let dists = tree.leaf_distances(0);
        assert_eq!(dists.len(), 3);
        assert_relative_eq!(dists[0].1, 1.5);
        assert_relative_eq!(dists[1].1, 2.5);
        assert_relative_eq!(dists[2].1, 3.0);

        let below = tree.leaf_distances(1);
        assert_eq!(below, vec![(2, 1.0), (3, 2.0)]);
    }

    #[test]
    fn test_remove_and_collapse() {
        let mut tree = build();
        tree.remove_node(3);
        assert_eq!(tree.len(), 4);
        tree.collapse_node(1).unwrap();
        assert_eq!(tree.to_newick(), "(A:1.5,C:3)root;");
        assert!(tree.collapse_node(0).is_err());

        tree.remove_node(0);
        assert!(tree.is_empty());
        assert_eq!(tree.get_root(), None);
    }

    #[test]
    fn test_retain_leaves() {
        let mut tree = build();
        tree.retain_leaves(|n| n != "C");
        assert_eq!(tree.to_newick(), "(A:1,B:2)n1;");
        assert_eq!(tree.get_node(tree.get_root().unwrap()).unwrap().parent, None);

        let mut tree = build();
        tree.retain_leaves(|n| n == "B");
        assert_eq!(tree.to_newick(), "B;");
        assert_eq!(tree.leaf_distances(tree.get_root().unwrap()), vec![(3, 0.0)]);

        let mut tree = build();
        tree.retain_leaves(|_| false);
        assert!(tree.is_empty());
        assert_eq!(tree.to_newick(), ";");
    }

    #[test]
    fn test_not_binary() {
        let tree = Tree::from_newick("(A,B,C);").unwrap();
        assert!(!tree.is_binary());
        let tree = Tree::from_newick("((A)x,B);").unwrap();
        assert!(!tree.is_binary());
    }
}
