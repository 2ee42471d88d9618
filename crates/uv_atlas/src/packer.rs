//! Stage 5: Guillotine atlas packing
//!
//! A binary split tree stored in an arena. The root covers the whole atlas;
//! inserting an image walks the tree depth-first (child 0 before child 1) and
//! takes the first free leaf that can hold it.
//!
//! ```text
//! Leaf fits but is larger than the image:
//!
//!   dw > dh (split vertically)        otherwise (split horizontally)
//!   ┌─────┬───────────┐               ┌─────────────────┐
//!   │     │           │               │     child 1     │
//!   │  0  │     1     │               ├─────────────────┤
//!   │     │           │               │     child 0     │
//!   └─────┴───────────┘               └─────────────────┘
//!    image width                       image height, from the bottom
//! ```
//!
//! After a split the image is inserted into child 0, which fits by
//! construction (a second split may follow before the perfect fit). Cut-away
//! space is never merged back. No sorting is done: images are placed in
//! submission order.

use crate::image::ImageRequest;
use crate::types::Rect;

/// Index of a node in the packer arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
  pub const ROOT: NodeId = NodeId(0);

  pub fn raw(&self) -> u32 {
    self.0
  }

  #[inline]
  fn index(self) -> usize {
    self.0 as usize
  }
}

/// Node of the split tree: internal (two children, no image) or leaf
/// (optionally holding one image).
#[derive(Clone, Debug)]
pub struct PackNode {
  pub rect: Rect,
  children: Option<[NodeId; 2]>,
  image: Option<ImageRequest>,
}

impl PackNode {
  fn leaf(rect: Rect) -> Self {
    Self {
      rect,
      children: None,
      image: None,
    }
  }

  pub fn children(&self) -> Option<[NodeId; 2]> {
    self.children
  }

  pub fn image(&self) -> Option<&ImageRequest> {
    self.image.as_ref()
  }

  pub fn is_leaf(&self) -> bool {
    self.children.is_none()
  }
}

/// Opaque undo point, see [`AtlasPacker::checkpoint`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checkpoint {
  node_count: usize,
}

/// Guillotine packer for a square atlas.
#[derive(Clone, Debug)]
pub struct AtlasPacker {
  extent: u32,
  nodes: Vec<PackNode>,
  /// Pre-existing leaves modified since the open checkpoint.
  journal: Vec<NodeId>,
  recording: bool,
}

impl AtlasPacker {
  pub fn new(extent: u32) -> Self {
    Self {
      extent,
      nodes: vec![PackNode::leaf(Rect::atlas(extent))],
      journal: Vec::new(),
      recording: false,
    }
  }

  pub fn extent(&self) -> u32 {
    self.extent
  }

  pub fn node(&self, id: NodeId) -> &PackNode {
    &self.nodes[id.index()]
  }

  pub fn node_count(&self) -> usize {
    self.nodes.len()
  }

  /// Place `image`, returning the leaf that now holds it.
  ///
  /// On failure the tree is unchanged and the image is handed back.
  pub fn insert(&mut self, image: ImageRequest) -> Result<NodeId, ImageRequest> {
    match self.find_free_leaf(image.width, image.height) {
      Some(leaf) => {
        let id = self.occupy(leaf, image.width, image.height);
        self.nodes[id.index()].image = Some(image);
        self.record(id);
        Ok(id)
      }
      None => Err(image),
    }
  }

  /// First free leaf (depth-first, child 0 first) that can contain the size.
  fn find_free_leaf(&self, width: u32, height: u32) -> Option<NodeId> {
    let mut stack = vec![NodeId::ROOT];
    while let Some(id) = stack.pop() {
      let node = &self.nodes[id.index()];
      if let Some([first, second]) = node.children {
        stack.push(second);
        stack.push(first);
        continue;
      }
      if node.image.is_none() && node.rect.fits(width, height) {
        return Some(id);
      }
    }
    None
  }

  /// Split `leaf` until a child matches the size exactly; returns that child.
  fn occupy(&mut self, leaf: NodeId, width: u32, height: u32) -> NodeId {
    let mut current = leaf;
    loop {
      let rect = self.nodes[current.index()].rect;
      if rect.is_perfect_fit(width, height) {
        return current;
      }

      let (first, second) = split(rect, width as i32, height as i32);
      let first_id = self.push_node(first);
      let second_id = self.push_node(second);
      self.nodes[current.index()].children = Some([first_id, second_id]);
      self.record(current);
      current = first_id;
    }
  }

  fn push_node(&mut self, rect: Rect) -> NodeId {
    let id = NodeId(self.nodes.len() as u32);
    self.nodes.push(PackNode::leaf(rect));
    id
  }

  fn record(&mut self, id: NodeId) {
    if self.recording {
      self.journal.push(id);
    }
  }

  /// Mark the current tree state so a failed batch of inserts can be undone.
  ///
  /// Inserts are journaled until [`rollback`](Self::rollback) or
  /// [`release`](Self::release). A new checkpoint replaces the open one.
  pub fn checkpoint(&mut self) -> Checkpoint {
    self.journal.clear();
    self.recording = true;
    Checkpoint {
      node_count: self.nodes.len(),
    }
  }

  /// Restore the tree to `checkpoint`, dropping every image placed since.
  pub fn rollback(&mut self, checkpoint: Checkpoint) {
    for id in self.journal.drain(..) {
      if id.index() < checkpoint.node_count {
        let node = &mut self.nodes[id.index()];
        node.children = None;
        node.image = None;
      }
    }
    self.nodes.truncate(checkpoint.node_count);
    self.recording = false;
  }

  /// Keep everything placed since the open checkpoint and stop journaling.
  pub fn release(&mut self) {
    self.journal.clear();
    self.recording = false;
  }

  /// Number of journaled node changes of the open checkpoint.
  pub fn journal_len(&self) -> usize {
    self.journal.len()
  }

  /// Leaves holding an image, in depth-first order (child 0 first).
  pub fn packed(&self) -> Vec<(NodeId, &Rect, &ImageRequest)> {
    let mut out = Vec::new();
    let mut stack = vec![NodeId::ROOT];
    while let Some(id) = stack.pop() {
      let node = &self.nodes[id.index()];
      if let Some(image) = &node.image {
        out.push((id, &node.rect, image));
      }
      if let Some([first, second]) = node.children {
        stack.push(second);
        stack.push(first);
      }
    }
    out
  }

  /// Number of placed images.
  pub fn image_count(&self) -> usize {
    self.nodes.iter().filter(|node| node.image.is_some()).count()
  }

  /// Fraction of atlas pixels covered by placed images.
  pub fn occupancy(&self) -> f32 {
    let used: u64 = self
      .nodes
      .iter()
      .filter_map(|node| node.image.as_ref())
      .map(|image| image.width as u64 * image.height as u64)
      .sum();
    let total = self.extent as u64 * self.extent as u64;
    (used as f64 / total as f64) as f32
  }
}

/// Split `rect` for an image of `width` x `height`; child 0 is the part the
/// image goes into.
fn split(rect: Rect, width: i32, height: i32) -> (Rect, Rect) {
  let dw = rect.width() - width;
  let dh = rect.height() - height;

  if dw > dh {
    (
      Rect::new(rect.left, rect.top, rect.left + width - 1, rect.bottom),
      Rect::new(rect.left + width, rect.top, rect.right, rect.bottom),
    )
  } else {
    (
      Rect::new(rect.left, rect.bottom + height - 1, rect.right, rect.bottom),
      Rect::new(rect.left, rect.top, rect.right, rect.bottom + height),
    )
  }
}

#[cfg(test)]
#[path = "packer_test.rs"]
mod packer_test;
