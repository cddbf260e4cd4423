// ------------------------------------------------------------
// Frame updater
//
// `compute_frame` is pure: scene outlines + trajectory + index in,
// world geometry out. `Scene::apply` is the only place the scene
// is mutated.
// ------------------------------------------------------------

use crate::error::{RenderError, Result};
use crate::geometry::{place, translate, Point, UPRIGHT_OFFSET};
use crate::scene::Scene;
use crate::trajectory::Trajectory;

// Scene element touched by a frame update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementId {
    Cart,
    Base,
    Rod(usize),
    Pivot(usize),
    End(usize),
    ActionCurve,
    RewardCurve,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RodPose {
    pub outline: Vec<Point>,
    pub pivot: Point,
    pub end: Point,
    // Absolute orientation: upright offset + sum of relative angles.
    pub global_angle: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameGeometry {
    pub frame: usize,
    pub cart: Option<Vec<Point>>,
    pub base: Point,
    pub rods: Vec<RodPose>,
    pub action: Vec<Point>,
    pub reward: Vec<Point>,
}

// Samples 0..=frame, except frame 0 which shows an empty curve.
fn curve_prefix(values: &[f64], frame: usize) -> Vec<Point> {
    if frame == 0 {
        return Vec::new();
    }
    values[..=frame]
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64, v))
        .collect()
}

pub fn compute_frame(scene: &Scene, trajectory: &Trajectory, frame: usize) -> Result<FrameGeometry> {
    if frame >= trajectory.len() {
        return Err(RenderError::FrameOutOfRange {
            frame,
            len: trajectory.len(),
        });
    }

    // Cart translates horizontally and carries the base pivot with it.
    let (cart, base) = match &scene.cart {
        Some(shape) => {
            let x = trajectory.cart_x(frame);
            let outline = shape.local.iter().map(|&p| translate(p, (x, 0.0))).collect();
            (Some(outline), (x, 0.0))
        }
        None => (None, (0.0, 0.0)),
    };

    // Forward kinematics down the chain; each angle is relative to its parent.
    let angles = trajectory.angles(frame);
    let mut rods = Vec::with_capacity(scene.rods.len());
    let mut current_pivot = base;
    let mut cumulative_angle = 0.0;
    for (rod, &angle) in scene.rods.iter().zip(angles) {
        cumulative_angle += angle;
        let global_angle = UPRIGHT_OFFSET + cumulative_angle;

        let outline = rod
            .body
            .local
            .iter()
            .map(|&p| place(p, global_angle, current_pivot))
            .collect();
        let end = place(rod.tip(), global_angle, current_pivot);

        rods.push(RodPose {
            outline,
            pivot: current_pivot,
            end,
            global_angle,
        });
        current_pivot = end;
    }

    Ok(FrameGeometry {
        frame,
        cart,
        base,
        rods,
        action: curve_prefix(trajectory.actions(), frame),
        reward: curve_prefix(trajectory.rewards(), frame),
    })
}

impl Scene {
    // Write precomputed geometry into the scene's elements.
    pub fn apply(&mut self, geometry: FrameGeometry) -> Vec<ElementId> {
        let mut touched = Vec::with_capacity(3 * self.rods.len() + 4);

        if let (Some(shape), Some(outline)) = (self.cart.as_mut(), geometry.cart) {
            shape.world = outline;
            touched.push(ElementId::Cart);
            self.base_marker.center = geometry.base;
            touched.push(ElementId::Base);
        }

        for (i, (rod, pose)) in self.rods.iter_mut().zip(geometry.rods).enumerate() {
            rod.body.world = pose.outline;
            rod.pivot.center = pose.pivot;
            rod.end.center = pose.end;
            touched.extend([ElementId::Rod(i), ElementId::Pivot(i), ElementId::End(i)]);
        }

        self.action.data = geometry.action;
        self.reward.data = geometry.reward;
        touched.extend([ElementId::ActionCurve, ElementId::RewardCurve]);

        touched
    }

    // Move every element to `frame`.
    pub fn update(&mut self, trajectory: &Trajectory, frame: usize) -> Result<Vec<ElementId>> {
        let geometry = compute_frame(self, trajectory, frame)?;
        Ok(self.apply(geometry))
    }
}
