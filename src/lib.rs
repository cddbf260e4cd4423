// ------------------------------------------------------------
// Trajectory renderer
//
// Turns a recorded pendulum / cart-pole trajectory table into a
// video of the articulated body next to growing action and reward
// plots.
//
//   trajectory (load) -> scene (build) -> frame (update per index)
//   -> raster (draw) -> export (encode at a fixed frame rate)
// ------------------------------------------------------------

pub mod config;
pub mod error;
pub mod export;
pub mod frame;
pub mod geometry;
pub mod raster;
pub mod scene;
pub mod trajectory;

pub use config::{ColumnLayout, RenderConfig, RunPaths, VideoSettings};
pub use error::{BaseMode, RenderError, Result};
pub use export::{ExportState, ExportSummary, Exporter, FfmpegEncoder, FrameSink};
pub use frame::{compute_frame, ElementId, FrameGeometry, RodPose};
pub use raster::{PlottersCanvas, Rasterizer};
pub use scene::Scene;
pub use trajectory::Trajectory;
