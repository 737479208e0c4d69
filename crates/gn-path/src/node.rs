//! Generation-stamped search arena.
//!
//! The pool holds one [`PathNode`] per grid cell, indexed row-major.  A node
//! is live only while its `generation` equals the pool's current generation;
//! starting a new search bumps the counter instead of clearing memory.

/// Parent index meaning "no parent" (the start node).
pub const NO_PARENT: u32 = u32::MAX;

/// Transient A* bookkeeping for one cell.
#[derive(Copy, Clone, Debug)]
pub struct PathNode {
    pub g:          f32,
    pub h:          f32,
    pub parent:     u32,
    pub generation: u32,
    pub closed:     bool,
}

impl PathNode {
    const STALE: PathNode = PathNode {
        g:          f32::INFINITY,
        h:          0.0,
        parent:     NO_PARENT,
        generation: 0,
        closed:     false,
    };

    #[inline]
    pub fn f(&self) -> f32 {
        self.g + self.h
    }
}

/// Flat node arena with a monotonically increasing search generation.
#[derive(Clone, Debug)]
pub struct NodePool {
    nodes:      Vec<PathNode>,
    generation: u32,
}

impl NodePool {
    pub fn new(cells: usize) -> Self {
        Self { nodes: vec![PathNode::STALE; cells], generation: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Grow or shrink to `cells` nodes.  Invalidates every live node.
    pub fn resize(&mut self, cells: usize) {
        self.nodes.clear();
        self.nodes.resize(cells, PathNode::STALE);
        self.generation = 0;
    }

    /// Start a new search: every node becomes stale in O(1).
    ///
    /// On counter wrap-around all stamps are reset once so an ancient
    /// node can never alias the new generation.
    pub fn begin_search(&mut self) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            for n in &mut self.nodes {
                n.generation = 0;
            }
            self.generation = 1;
        }
        self.generation
    }

    /// `true` if node `i` was touched during the current search.
    #[inline]
    pub fn is_live(&self, i: usize) -> bool {
        self.nodes[i].generation == self.generation
    }

    /// Node `i`, initialised for the current search on first touch.
    #[inline]
    pub fn visit(&mut self, i: usize, h: f32) -> &mut PathNode {
        let generation = self.generation;
        let n = &mut self.nodes[i];
        if n.generation != generation {
            *n = PathNode { h, generation, ..PathNode::STALE };
        }
        n
    }

    #[inline]
    pub fn get(&self, i: usize) -> &PathNode {
        &self.nodes[i]
    }

    /// Test hook: force the counter close to wrap-around.
    #[cfg(test)]
    pub(crate) fn set_generation(&mut self, generation: u32) {
        self.generation = generation;
    }
}
