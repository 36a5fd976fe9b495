use glam::Mat4;

/// A node of an imported scene graph.
///
/// This is the shape the asset importer hands over: a tree owned from the
/// root down, each node with a name and a static local transform (its bind
/// or rest value). Names join animation channels and bones to nodes; they
/// are expected to be unique, and when they are not the first node in
/// depth-first order wins.
///
/// The tree is immutable once loaded. For evaluation it is flattened into a
/// [`NodeHierarchy`](crate::scene::hierarchy::NodeHierarchy).
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    /// Local transform relative to the parent.
    pub transform: Mat4,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    #[must_use]
    pub fn new(name: impl Into<String>, transform: Mat4) -> Self {
        Self {
            name: name.into(),
            transform,
            children: Vec::new(),
        }
    }

    /// Appends a child, builder style.
    #[must_use]
    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = SceneNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Total number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}
