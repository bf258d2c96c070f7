use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{FeatureCollection, Point};

/// Logical drawing-surface size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Position in pixel space: x grows right, y grows down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box in geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Single pass over `points`. `None` when the iterator is empty.
    pub fn of_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounds = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for point in points {
            bounds.min_x = bounds.min_x.min(point.x);
            bounds.min_y = bounds.min_y.min(point.y);
            bounds.max_x = bounds.max_x.max(point.x);
            bounds.max_y = bounds.max_y.max(point.y);
        }
        Some(bounds)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ProjectionError {
    #[error("feature collection has no points")]
    EmptyCollection,
    #[error("degenerate bounding box ({width} x {height}); cannot derive a finite scale")]
    DegenerateBounds { width: f64, height: f64 },
    #[error("invalid canvas size {width} x {height}")]
    InvalidCanvas { width: f64, height: f64 },
}

/// Uniform scale + offset + vertical flip from geographic to pixel space.
///
/// The offset is applied before scaling, so the bounding box's minimum corner
/// lands on the bottom-left pixel corner. `scale` is the smaller of the two
/// per-axis fits, which keeps the aspect ratio and leaves margin on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub canvas_height: f64,
}

impl Transform {
    pub fn fit(bounds: &Bounds, canvas: CanvasSize) -> Result<Self, ProjectionError> {
        if !(canvas.width.is_finite() && canvas.height.is_finite())
            || canvas.width <= 0.0
            || canvas.height <= 0.0
        {
            return Err(ProjectionError::InvalidCanvas {
                width: canvas.width,
                height: canvas.height,
            });
        }

        let (width, height) = (bounds.width(), bounds.height());
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            return Err(ProjectionError::DegenerateBounds { width, height });
        }

        let scale_x = canvas.width / width;
        let scale_y = canvas.height / height;
        let scale = scale_x.min(scale_y);
        if !(scale > 0.0 && scale.is_finite()) {
            return Err(ProjectionError::DegenerateBounds { width, height });
        }

        Ok(Self {
            scale,
            offset_x: -bounds.min_x,
            offset_y: -bounds.min_y,
            canvas_height: canvas.height,
        })
    }

    /// Geographic → pixel. Rasterizer and hit tester both go through here.
    pub fn project(&self, point: Point) -> PixelPoint {
        PixelPoint {
            x: (point.x + self.offset_x) * self.scale,
            y: self.canvas_height - (point.y + self.offset_y) * self.scale,
        }
    }
}

/// Derive the transform for a whole collection. Pure; recompute whenever the
/// collection changes.
pub fn compute_transform(
    features: &FeatureCollection,
    canvas: CanvasSize,
) -> Result<Transform, ProjectionError> {
    let bounds = Bounds::of_points(features.points()).ok_or(ProjectionError::EmptyCollection)?;
    let transform = Transform::fit(&bounds, canvas)?;
    tracing::debug!(
        features = features.len(),
        scale = transform.scale,
        offset_x = transform.offset_x,
        offset_y = transform.offset_y,
        "computed map transform"
    );
    Ok(transform)
}
