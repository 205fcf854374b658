// Uniform spatial hash over the simulation area.
//
// One bucket per unit cell, holding indices into the controller's dense
// agent array. Unlike a rebuild-every-frame hash, membership here is
// maintained incrementally: the controller removes/inserts an agent only
// when its cell changes.
//
// Neighbour lookup is O(1) on average for evenly spread agents and O(n)
// when every agent collapses into the same cell. A per-cell secondary index
// would fix the degenerate case; not needed at current crowd sizes.

use glam::Vec2;

pub struct CrowdGrid {
    cells: Vec<Vec<usize>>,
    width: u32,
    height: u32,
}

impl CrowdGrid {
    /// Empty grid of `width * height` unit cells.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            cells: vec![Vec::new(); width as usize * height as usize],
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major index of the cell containing `pos`, or `None` outside the grid.
    ///
    /// NaN coordinates are treated as outside.
    pub fn cell_index_of(&self, pos: Vec2) -> Option<usize> {
        let fx = pos.x.floor();
        let fy = pos.y.floor();
        let inside = fx >= 0.0 && fx < self.width as f32 && fy >= 0.0 && fy < self.height as f32;
        if !inside {
            return None;
        }
        Some(fy as usize * self.width as usize + fx as usize)
    }

    /// `(cell_x, cell_y)` of a row-major index.
    #[inline]
    pub fn cell_coords(&self, index: usize) -> (u32, u32) {
        let w = self.width as usize;
        ((index % w) as u32, (index / w) as u32)
    }

    /// Append `agent` to bucket `index`. Out-of-range indices are ignored.
    pub fn insert(&mut self, agent: usize, index: usize) {
        if let Some(bucket) = self.cells.get_mut(index) {
            bucket.push(agent);
        }
    }

    /// Drop `agent` from bucket `index` (swap-remove).
    ///
    /// Returns whether anything was removed; a missing entry or bad index is
    /// not an error.
    pub fn remove(&mut self, agent: usize, index: usize) -> bool {
        let Some(bucket) = self.cells.get_mut(index) else {
            return false;
        };
        match bucket.iter().position(|&a| a == agent) {
            Some(slot) => {
                bucket.swap_remove(slot);
                true
            }
            None => false,
        }
    }

    /// Agents in bucket `index`; empty for out-of-range indices.
    pub fn bucket(&self, index: usize) -> &[usize] {
        self.cells.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of bucket entries across the grid.
    pub fn member_count(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    /// Agents in the 3x3 block of cells centred on `(cell_x, cell_y)`, clipped
    /// to the grid. The centre itself may lie outside the grid.
    ///
    /// Visits columns left to right, and within each column bottom to top.
    pub fn neighbors_3x3(&self, cell_x: i32, cell_y: i32) -> impl Iterator<Item = usize> + '_ {
        let (wi, hi) = (self.width as i64, self.height as i64);
        let (x, y) = (cell_x as i64, cell_y as i64);
        (-1..=1i64)
            .flat_map(move |dx| (-1..=1i64).map(move |dy| (x + dx, y + dy)))
            .filter(move |&(nx, ny)| nx >= 0 && ny >= 0 && nx < wi && ny < hi)
            .flat_map(move |(nx, ny)| self.cells[(ny * wi + nx) as usize].iter().copied())
    }
}
