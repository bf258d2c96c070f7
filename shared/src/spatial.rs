use crate::geometry::FeatureCollection;
use crate::hit_test::FillRule;
use crate::projection::{PixelPoint, Transform};
use crate::raster::FeaturePath;

const GRID_COLS: usize = 32;
const GRID_ROWS: usize = 32;

/// Uniform grid over pixel space that narrows a click down to the features
/// whose bounding boxes cover it, then runs the exact path test.
/// Rebuilt only when the features or the transform change.
///
/// Candidates in each cell stay in collection order, so the answer is always
/// the same as a linear [`crate::hit_test::hit_test`].
#[derive(Debug, Clone)]
pub struct HitIndex {
    cells: Vec<Vec<usize>>,
    paths: Vec<FeaturePath>,
    bounds: Vec<(f64, f64, f64, f64)>,
    min_x: f64,
    min_y: f64,
    cell_w: f64,
    cell_h: f64,
}

impl HitIndex {
    pub fn build(features: &FeatureCollection, transform: &Transform) -> Self {
        let paths: Vec<FeaturePath> = features
            .iter()
            .map(|feature| FeaturePath::build(feature, transform))
            .collect();
        let bounds: Vec<(f64, f64, f64, f64)> = paths
            .iter()
            .map(|path| {
                path.pixel_bounds()
                    .unwrap_or((f64::NAN, f64::NAN, f64::NAN, f64::NAN))
            })
            .collect();

        let (mut min_x, mut min_y, mut max_x, mut max_y) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        for &(l, t, r, b) in bounds.iter().filter(|b| !b.0.is_nan()) {
            min_x = min_x.min(l);
            min_y = min_y.min(t);
            max_x = max_x.max(r);
            max_y = max_y.max(b);
        }
        if min_x > max_x || min_y > max_y {
            return Self {
                cells: Vec::new(),
                paths,
                bounds,
                min_x: 0.0,
                min_y: 0.0,
                cell_w: 1.0,
                cell_h: 1.0,
            };
        }

        // Small padding keeps edge points inside the grid
        min_x -= 1.0;
        min_y -= 1.0;
        max_x += 1.0;
        max_y += 1.0;

        let cell_w = (max_x - min_x) / GRID_COLS as f64;
        let cell_h = (max_y - min_y) / GRID_ROWS as f64;

        let mut cells = vec![Vec::new(); GRID_COLS * GRID_ROWS];
        for (idx, &(l, t, r, b)) in bounds.iter().enumerate() {
            if l.is_nan() {
                continue;
            }
            let col_start = ((l - min_x) / cell_w).floor().max(0.0) as usize;
            let col_end = ((r - min_x) / cell_w).floor().min(GRID_COLS as f64 - 1.0) as usize;
            let row_start = ((t - min_y) / cell_h).floor().max(0.0) as usize;
            let row_end = ((b - min_y) / cell_h).floor().min(GRID_ROWS as f64 - 1.0) as usize;

            for row in row_start..=row_end {
                for col in col_start..=col_end {
                    cells[row * GRID_COLS + col].push(idx);
                }
            }
        }

        Self {
            cells,
            paths,
            bounds,
            min_x,
            min_y,
            cell_w,
            cell_h,
        }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Index of the first feature whose path contains `point`.
    pub fn find_at(&self, point: PixelPoint) -> Option<usize> {
        if self.cells.is_empty() {
            return None;
        }

        let col = ((point.x - self.min_x) / self.cell_w).floor();
        let row = ((point.y - self.min_y) / self.cell_h).floor();
        if !(col >= 0.0 && row >= 0.0 && col < GRID_COLS as f64 && row < GRID_ROWS as f64) {
            return None;
        }

        let cell = &self.cells[row as usize * GRID_COLS + col as usize];
        cell.iter().copied().find(|&idx| {
            let (l, t, r, b) = self.bounds[idx];
            point.x >= l
                && point.x <= r
                && point.y >= t
                && point.y <= b
                && self.paths[idx].contains(point, FillRule::default())
        })
    }
}
