/// Index into the node arena of a [`Tree`](super::Tree).
pub type NodeId = usize;

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,

    /// None for the root
    pub parent: Option<NodeId>,

    pub children: Vec<NodeId>,

    /// Species id on leaves; internal nodes are usually unnamed
    pub name: Option<String>,

    /// Length of the branch leading to the parent
    pub length: Option<f64>,

    /// Soft deletion flag; deleted nodes stay in the arena
    pub deleted: bool,
}

impl Node {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            name: None,
            length: None,
            deleted: false,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Branch length, a missing one counting as zero
    pub fn branch(&self) -> f64 {
        self.length.unwrap_or(0.0)
    }
}
