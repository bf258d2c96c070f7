pub mod colors;
pub mod geometry;
pub mod map_state;
pub mod municipality;
pub mod projection;
pub mod raster;
pub mod spatial;

pub use colors::{BOUNDARY_COLOR, Rgb, feature_fill};
pub use geometry::*;
pub use hit_test::{FillRule, Hit, hit_test};
pub use map_state::*;
pub use municipality::*;
pub use projection::*;
pub use raster::{FeaturePath, RecordingSurface, Surface, render};
pub use spatial::HitIndex;
