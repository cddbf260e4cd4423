// ------------------------------------------------------------
// Render configuration, run paths, video settings and palette
// ------------------------------------------------------------

use std::path::{Path, PathBuf};

use plotters::style::RGBColor;

use crate::error::{BaseMode, RenderError, Result};

// Environment override for the encoder binary.
pub const FFMPEG_ENV: &str = "TRAJ_RENDER_FFMPEG";

// ------------------------------------------------------------
// Column layout of a trajectory table
// ------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub num_rods: usize,
    pub use_cart: bool,
}

impl ColumnLayout {
    pub fn new(num_rods: usize, use_cart: bool) -> Self {
        Self { num_rods, use_cart }
    }

    // angles + optional cart_x + action + reward
    pub fn expected_columns(&self) -> usize {
        self.num_rods + usize::from(self.use_cart) + 2
    }

    pub fn mode(&self) -> BaseMode {
        if self.use_cart {
            BaseMode::Cart
        } else {
            BaseMode::Fixed
        }
    }

    pub fn action_column(&self) -> usize {
        self.num_rods + usize::from(self.use_cart)
    }

    pub fn reward_column(&self) -> usize {
        self.action_column() + 1
    }
}

// ------------------------------------------------------------
// Scene dimensions (world units)
// ------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    pub rod_length: f64,
    pub rod_width: f64,
    pub cart_length: f64,
    pub cart_width: f64,
    pub bound: f64,
    pub num_rods: usize,
    pub use_cart: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            rod_length: 1.0,
            rod_width: 0.2,
            cart_length: 0.2,
            cart_width: 0.1,
            bound: 2.2,
            num_rods: 1,
            use_cart: false,
        }
    }
}

impl RenderConfig {
    pub fn layout(&self) -> ColumnLayout {
        ColumnLayout::new(self.num_rods, self.use_cart)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_rods == 0 {
            return Err(RenderError::InvalidConfig(
                "num_rods must be at least 1".to_string(),
            ));
        }
        let dims = [
            ("rod_length", self.rod_length),
            ("rod_width", self.rod_width),
            ("cart_length", self.cart_length),
            ("cart_width", self.cart_width),
            ("bound", self.bound),
        ];
        for (name, value) in dims {
            if !value.is_finite() || value <= 0.0 {
                return Err(RenderError::InvalidConfig(format!(
                    "{name} must be a positive finite number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

// ------------------------------------------------------------
// Input / output locations for one run
// data/<task>/run_<id>/trajectory.csv -> trajectory.mp4
// ------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    pub run_dir: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl RunPaths {
    pub fn new(task: &str, run_id: u32) -> Self {
        Self::under(Path::new("data"), task, run_id)
    }

    pub fn under(root: &Path, task: &str, run_id: u32) -> Self {
        let run_dir = root.join(task).join(format!("run_{run_id}"));
        Self {
            input: run_dir.join("trajectory.csv"),
            output: run_dir.join("trajectory.mp4"),
            run_dir,
        }
    }
}

// ------------------------------------------------------------
// Encoding and canvas settings
// ------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSettings {
    pub fps: u32,
    pub bitrate_kbps: u32,
    pub codec: &'static str,
    pub pix_fmt: &'static str,
    pub width: u32,
    pub height: u32,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            fps: 30,
            bitrate_kbps: 1800,
            codec: "libx264",
            pix_fmt: "yuv420p",
            width: 1000,
            height: 500,
        }
    }
}

// ------------------------------------------------------------
// Palette
// ------------------------------------------------------------
pub const ROD_COLOR: RGBColor = RGBColor(204, 77, 77);
pub const CART_COLOR: RGBColor = RGBColor(129, 132, 203);
pub const BASE_COLOR: RGBColor = RGBColor(0, 0, 0);
pub const ACTION_COLOR: RGBColor = RGBColor(0, 128, 0);
pub const REWARD_COLOR: RGBColor = RGBColor(0, 0, 255);
pub const BACKGROUND: RGBColor = RGBColor(255, 255, 255);
