// Pre-built marker field.
//
// Markers used to be re-sampled every tick, which was too slow at high
// densities. They are now generated once, row by row, and never touched
// again; the tick loop only reads them.

use glam::Vec2;
use log::info;
use super::error::ConfigError;
use super::sampler::{FieldSampler, ScalarField};

/// A fixed attraction point in world coordinates with a weight in `[0,1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub position: Vec2,
    pub weight: f32,
}

impl Marker {
    /// Cell containing the marker, as signed coordinates for neighbour queries.
    #[inline]
    pub fn cell(&self) -> (i32, i32) {
        (self.position.x.floor() as i32, self.position.y.floor() as i32)
    }
}

/// Immutable collection of every marker on the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerField {
    markers: Vec<Marker>,
    width: u32,
    height: u32,
    density: u32,
}

impl MarkerField {
    /// Generate `density` markers per cell for a `width x height` grid.
    ///
    /// Cells are visited in row-major order. Each cell's weight comes from
    /// `field` sampled at the normalised cell centre (clamped to `[0,1]`), or
    /// is `1.0` without a field.
    pub fn build(
        width: u32,
        height: u32,
        density: u32,
        sampler: &FieldSampler,
        field: Option<&dyn ScalarField>,
    ) -> Result<Self, ConfigError> {
        let total = (width as usize)
            .checked_mul(height as usize)
            .and_then(|cells| cells.checked_mul(density as usize))
            .ok_or(ConfigError::GridTooLarge { width, height, density })?;

        let mut markers = Vec::with_capacity(total);
        for cell_y in 0..height {
            for cell_x in 0..width {
                let weight = cell_weight(field, cell_x, cell_y, width, height)?;
                let (ox, oy) = (cell_x as f32, cell_y as f32);
                markers.extend(sampler.sample(cell_x, cell_y, density).map(|offset| Marker {
                    position: Vec2::new(within_cell(ox, offset.x), within_cell(oy, offset.y)),
                    weight,
                }));
            }
        }

        info!(
            "built marker field: {}x{} cells, {} per cell, {} markers",
            width,
            height,
            density,
            markers.len()
        );

        Ok(Self {
            markers,
            width,
            height,
            density,
        })
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn density(&self) -> u32 {
        self.density
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Marker> {
        self.markers.iter()
    }

    pub fn as_slice(&self) -> &[Marker] {
        &self.markers
    }

    pub fn for_each(&self, mut visit: impl FnMut(&Marker)) {
        for marker in &self.markers {
            visit(marker);
        }
    }
}

impl<'a> IntoIterator for &'a MarkerField {
    type Item = &'a Marker;
    type IntoIter = std::slice::Iter<'a, Marker>;

    fn into_iter(self) -> Self::IntoIter {
        self.markers.iter()
    }
}

/// `origin + offset` kept strictly below `origin + 1`.
///
/// In f32, an offset just under 1.0 added to a large origin rounds up onto
/// the next cell boundary; such values are pulled back to the largest float
/// still inside the cell.
#[inline]
fn within_cell(origin: f32, offset: f32) -> f32 {
    let p = origin + offset;
    let boundary = origin + 1.0;
    if p < boundary {
        p
    } else {
        // boundary >= 1.0, so the previous bit pattern is the next float down.
        f32::from_bits(boundary.to_bits() - 1)
    }
}

fn cell_weight(
    field: Option<&dyn ScalarField>,
    cell_x: u32,
    cell_y: u32,
    width: u32,
    height: u32,
) -> Result<f32, ConfigError> {
    let Some(field) = field else {
        return Ok(1.0);
    };
    let u = (cell_x as f32 + 0.5) / width as f32;
    let v = (cell_y as f32 + 0.5) / height as f32;
    let value = field.lookup(u, v);
    if !value.is_finite() {
        return Err(ConfigError::NonFiniteFieldSample { cell_x, cell_y, value });
    }
    Ok(value.clamp(0.0, 1.0))
}
