//! Disjoint-set forest over dense `u32` ids.
//!
//! Unions are directed: the caller names the set that survives, which keeps
//! island identity reproducible regardless of set sizes.

/// Union-find with path halving.
#[derive(Clone, Debug, Default)]
pub struct DisjointSet {
  parent: Vec<u32>,
}

impl DisjointSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a singleton set and return its id.
  pub fn make_set(&mut self) -> u32 {
    let id = self.parent.len() as u32;
    self.parent.push(id);
    id
  }

  /// Number of elements (not sets).
  pub fn len(&self) -> usize {
    self.parent.len()
  }

  pub fn is_empty(&self) -> bool {
    self.parent.is_empty()
  }

  /// Representative of the set containing `x`.
  pub fn find(&mut self, mut x: u32) -> u32 {
    while self.parent[x as usize] != x {
      let grandparent = self.parent[self.parent[x as usize] as usize];
      self.parent[x as usize] = grandparent;
      x = grandparent;
    }
    x
  }

  #[inline]
  pub fn is_root(&self, x: u32) -> bool {
    self.parent[x as usize] == x
  }

  /// Merge the set of `other` into the set of `survivor`.
  ///
  /// Returns the surviving root, or `None` if both were already in the same set.
  pub fn union_into(&mut self, survivor: u32, other: u32) -> Option<u32> {
    let root = self.find(survivor);
    let absorbed = self.find(other);
    if root == absorbed {
      return None;
    }
    self.parent[absorbed as usize] = root;
    Some(root)
  }
}
