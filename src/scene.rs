// ------------------------------------------------------------
// Retained-mode scene
//
// Every element is created once by `Scene::build` and then only
// repositioned by the frame updater; nothing is added or removed
// while rendering.
// ------------------------------------------------------------

use std::ops::Range;

use plotters::style::RGBColor;

use crate::config::{
    RenderConfig, ACTION_COLOR, BASE_COLOR, CART_COLOR, REWARD_COLOR, ROD_COLOR,
};
use crate::error::{RenderError, Result};
use crate::geometry::{cart_outline, rod_outline, Point};
use crate::trajectory::{series_bounds, Trajectory};

// Padding added above and below the action / reward ranges.
const CURVE_PAD: f64 = 0.1;

// Filled polygon with its fixed local outline and current world outline.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub local: Vec<Point>,
    pub world: Vec<Point>,
    pub color: RGBColor,
}

impl Shape {
    fn new(local: Vec<Point>, color: RGBColor) -> Self {
        Self {
            world: local.clone(),
            local,
            color,
        }
    }
}

// Filled circle; radius in world units.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub center: Point,
    pub radius: f64,
    pub color: RGBColor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rod {
    pub body: Shape,
    pub pivot: Marker,
    pub end: Marker,
    pub length: f64,
}

impl Rod {
    fn new(length: f64, width: f64) -> Self {
        let radius = 0.5 * width;
        Self {
            body: Shape::new(rod_outline(length, width), ROD_COLOR),
            pivot: Marker {
                center: (0.0, 0.0),
                radius,
                color: ROD_COLOR,
            },
            end: Marker {
                center: (length, 0.0),
                radius,
                color: ROD_COLOR,
            },
            length,
        }
    }

    // Local tip, the point the next rod hangs from.
    pub fn tip(&self) -> Point {
        (self.length, 0.0)
    }
}

// Square viewport hosting the articulated body.
#[derive(Debug, Clone, PartialEq)]
pub struct MainViewport {
    pub bound: f64,
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    // Horizontal track through y = 0 (cart mode only).
    pub reference_line: bool,
}

// Line chart that grows one sample per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub label: &'static str,
    pub color: RGBColor,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
    pub x_label: Option<&'static str>,
    pub show_x_ticks: bool,
    pub data: Vec<Point>,
}

impl Curve {
    fn new(label: &'static str, color: RGBColor, values: &[f64]) -> Self {
        let (lo, hi) = series_bounds(values);
        Self {
            label,
            color,
            x_range: 0.0..values.len() as f64,
            y_range: (lo - CURVE_PAD)..(hi + CURVE_PAD),
            x_label: None,
            show_x_ticks: true,
            data: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub main: MainViewport,
    pub cart: Option<Shape>,
    pub rods: Vec<Rod>,
    pub base_marker: Marker,
    pub action: Curve,
    pub reward: Curve,
}

impl Scene {
    pub fn build(config: &RenderConfig, trajectory: &Trajectory) -> Result<Self> {
        config.validate()?;
        if config.layout() != trajectory.layout() {
            return Err(RenderError::InvalidConfig(format!(
                "scene expects {} rods ({}), trajectory has {} rods ({})",
                config.num_rods,
                config.layout().mode(),
                trajectory.layout().num_rods,
                trajectory.layout().mode()
            )));
        }

        let cart = config
            .use_cart
            .then(|| Shape::new(cart_outline(config.cart_length, config.cart_width), CART_COLOR));

        let rods = (0..config.num_rods)
            .map(|_| Rod::new(config.rod_length, config.rod_width))
            .collect();

        let base_marker = Marker {
            center: (0.0, 0.0),
            radius: config.rod_width / 3.0,
            color: BASE_COLOR,
        };

        let mut action = Curve::new("Action", ACTION_COLOR, trajectory.actions());
        action.show_x_ticks = false;

        let mut reward = Curve::new("Reward", REWARD_COLOR, trajectory.rewards());
        reward.x_label = Some("Time Step");

        Ok(Self {
            main: MainViewport {
                bound: config.bound,
                title: "Pendulum Motion",
                x_label: "X Position",
                y_label: "Y Position",
                reference_line: config.use_cart,
            },
            cart,
            rods,
            base_marker,
            action,
            reward,
        })
    }

    pub fn num_rods(&self) -> usize {
        self.rods.len()
    }

    pub fn has_cart(&self) -> bool {
        self.cart.is_some()
    }
}
