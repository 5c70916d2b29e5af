// THEORY:
// The `component_labeler` is the engine of the spatial grouping layer. It takes a
// `DifferenceRaster` and partitions its significant cells into connected components:
// maximal groups of foreground cells that can reach each other through a chain of
// 8-adjacent steps (up, down, left, right and the four diagonals).
//
// Key architectural principles & algorithm steps:
// 1.  **Explicit Background**: Every cell is labeled with a `CellLabel`, which is either
//     `Background` or `Component(id)`. There is no synthetic "label 0" hiding among the
//     real components, so nothing has to be skipped when reporting.
// 2.  **Raster-Scan Seeding**: Cells are scanned rows top-to-bottom, columns
//     left-to-right. The first unlabeled foreground cell encountered seeds a new
//     component, so component ids follow discovery order.
// 3.  **Region Growing**: From each seed, an iterative depth-first flood fill (an
//     explicit stack, never recursion) claims every 8-connected foreground neighbor.
// 4.  **Data Aggregation**: While growing, each component accumulates its area and
//     bounding box. Per-cell membership is only kept in the `LabelMap`.
// 5.  **Stateless Utility**: Labeling is a pure function of the raster.

use crate::core_modules::difference_map::DifferenceRaster;
use serde::Serialize;

/// Identifier of a connected component. Ids start at 1 and follow raster-scan
/// discovery order.
pub type ComponentId = u32;

/// The label assigned to a single raster cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellLabel {
    Background,
    Component(ComponentId),
}

/// The rectangle enclosing a component, as inclusive min/max cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BoundingBox {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl BoundingBox {
    fn at(x: u32, y: u32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    fn include(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }
}

/// Aggregate statistics of one connected component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub id: ComponentId,
    /// Number of cells in the component.
    pub area: usize,
    pub bounding_box: BoundingBox,
}

/// Per-cell labels plus the components they refer to, in discovery order.
#[derive(Debug, Clone)]
pub struct LabelMap {
    width: u32,
    height: u32,
    labels: Vec<CellLabel>,
    components: Vec<Component>,
}

impl LabelMap {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The label of the cell at `(x, y)`. Positions outside the grid are background.
    pub fn label_at(&self, x: u32, y: u32) -> CellLabel {
        if x >= self.width || y >= self.height {
            return CellLabel::Background;
        }
        self.labels[y as usize * self.width as usize + x as usize]
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn into_components(self) -> Vec<Component> {
        self.components
    }
}

pub mod component_labeler {
    use super::*;

    /// The 8-neighborhood: horizontal, vertical and diagonal steps.
    const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
        (-1, -1),
        (0, -1),
        (1, -1),
        (-1, 0),
        (1, 0),
        (-1, 1),
        (0, 1),
        (1, 1),
    ];

    /// Labels every 8-connected group of non-zero cells in the raster.
    pub fn label_components(raster: &DifferenceRaster) -> LabelMap {
        let width = raster.width() as usize;
        let height = raster.height() as usize;
        let cells = raster.as_raw();

        let mut labels = vec![CellLabel::Background; cells.len()];
        let mut components: Vec<Component> = Vec::new();
        let mut stack: Vec<usize> = Vec::new();

        for seed in 0..cells.len() {
            if cells[seed] == 0 || labels[seed] != CellLabel::Background {
                continue;
            }

            // --- Region Growing ---
            let id = components.len() as ComponentId + 1;
            labels[seed] = CellLabel::Component(id);
            stack.push(seed);

            let mut area = 0usize;
            let mut bounding_box = BoundingBox::at((seed % width) as u32, (seed / width) as u32);

            while let Some(current) = stack.pop() {
                let cx = current % width;
                let cy = current / width;
                area += 1;
                bounding_box.include(cx as u32, cy as u32);

                for (dx, dy) in NEIGHBOR_OFFSETS {
                    let nx = cx as i64 + dx;
                    let ny = cy as i64 + dy;
                    if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                        continue;
                    }

                    let neighbor = ny as usize * width + nx as usize;
                    if cells[neighbor] != 0 && labels[neighbor] == CellLabel::Background {
                        labels[neighbor] = CellLabel::Component(id);
                        stack.push(neighbor);
                    }
                }
            }

            components.push(Component {
                id,
                area,
                bounding_box,
            });
        }

        LabelMap {
            width: raster.width(),
            height: raster.height(),
            labels,
            components,
        }
    }
}
