// ------------------------------------------------------------
// Rasterization (Plotters into an RGB frame buffer)
//
// Layout: the main viewport is the left half of the canvas; the
// action and reward charts stack on the right half.
// ------------------------------------------------------------

use image::RgbImage;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::config::{VideoSettings, BACKGROUND};
use crate::error::{RenderError, Result};
use crate::scene::{Curve, Marker, Scene};

const FONT: &str = "sans-serif";
const TITLE_SIZE: f64 = 22.0;
const LABEL_SIZE: f64 = 14.0;
const DESC_SIZE: f64 = 16.0;

const TRACK_COLOR: RGBColor = RGBColor(77, 77, 77);

const MARGIN: i32 = 10;
const X_LABEL_AREA: i32 = 40;
const Y_LABEL_AREA: i32 = 50;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

// Turns the current scene into one video frame.
pub trait Rasterizer {
    fn rasterize(&self, scene: &Scene) -> Result<RgbImage>;
}

#[derive(Debug, Clone)]
pub struct PlottersCanvas {
    width: u32,
    height: u32,
}

impl PlottersCanvas {
    pub fn new(settings: &VideoSettings) -> Self {
        Self {
            width: settings.width,
            height: settings.height,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Rasterizer for PlottersCanvas {
    fn rasterize(&self, scene: &Scene) -> Result<RgbImage> {
        let mut buffer = vec![0u8; (self.width * self.height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (self.width, self.height))
                .into_drawing_area();
            root.fill(&BACKGROUND)?;

            let (main, side) = root.split_horizontally((self.width / 2) as i32);
            draw_main(&main, scene)?;

            let panels = side.split_evenly((2, 1));
            draw_curve(&panels[0], &scene.action)?;
            draw_curve(&panels[1], &scene.reward)?;

            root.present()?;
        }
        RgbImage::from_raw(self.width, self.height, buffer)
            .ok_or_else(|| RenderError::Draw("frame buffer size mismatch".to_string()))
    }
}

// Split the leftover space so the plotting area is square.
fn square_margins(width: u32, height: u32) -> (i32, i32, i32, i32) {
    let avail_w = (width as i32 - 2 * MARGIN - Y_LABEL_AREA).max(0);
    let avail_h = (height as i32 - 2 * MARGIN - X_LABEL_AREA).max(0);
    let side = avail_w.min(avail_h);
    let extra_w = avail_w - side;
    let extra_h = avail_h - side;
    (
        MARGIN + extra_w / 2,
        MARGIN + extra_w - extra_w / 2,
        MARGIN + extra_h / 2,
        MARGIN + extra_h - extra_h / 2,
    )
}

// Marker radius is given in world units; Plotters circles take pixels.
fn marker_element(marker: &Marker, px_per_unit: f64) -> Circle<(f64, f64), i32> {
    let radius = (marker.radius * px_per_unit).round().max(1.0) as i32;
    Circle::new(marker.center, radius, marker.color.filled())
}

fn draw_main(area: &Area<'_>, scene: &Scene) -> Result<()> {
    let view = &scene.main;
    let area = area.titled(view.title, (FONT, TITLE_SIZE))?;
    let (w, h) = area.dim_in_pixel();
    let (left, right, top, bottom) = square_margins(w, h);

    let b = view.bound;
    let mut chart = ChartBuilder::on(&area)
        .margin_left(left)
        .margin_right(right)
        .margin_top(top)
        .margin_bottom(bottom)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(-b..b, -b..b)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(view.x_label)
        .y_desc(view.y_label)
        .axis_desc_style((FONT, DESC_SIZE))
        .label_style((FONT, LABEL_SIZE))
        .x_labels(5)
        .y_labels(5)
        .x_label_formatter(&|v| format!("{:.1}", v))
        .y_label_formatter(&|v| format!("{:.1}", v))
        .draw()?;

    let (px_range, _) = chart.plotting_area().get_pixel_range();
    let px_per_unit = (px_range.end - px_range.start) as f64 / (2.0 * b);

    draw_body(&mut chart, scene, px_per_unit)
}

type MainChart<'a, 'b> =
    ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

// Cart, rods and markers, with the track line on top of them.
fn draw_body(chart: &mut MainChart<'_, '_>, scene: &Scene, px_per_unit: f64) -> Result<()> {
    if let Some(cart) = &scene.cart {
        chart.draw_series(std::iter::once(Polygon::new(
            cart.world.clone(),
            cart.color.filled(),
        )))?;
    }

    for rod in &scene.rods {
        chart.draw_series(std::iter::once(Polygon::new(
            rod.body.world.clone(),
            rod.body.color.filled(),
        )))?;
        chart.draw_series([
            marker_element(&rod.pivot, px_per_unit),
            marker_element(&rod.end, px_per_unit),
        ])?;
    }

    chart.draw_series(std::iter::once(marker_element(&scene.base_marker, px_per_unit)))?;

    if scene.main.reference_line {
        let b = scene.main.bound;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(-b, 0.0), (b, 0.0)],
            TRACK_COLOR.stroke_width(1),
        )))?;
    }
    Ok(())
}

fn draw_curve(area: &Area<'_>, curve: &Curve) -> Result<()> {
    let x_fmt = |v: &f64| format!("{:.0}", v);
    let y_fmt = |v: &f64| format!("{:.1}", v);

    let mut chart = ChartBuilder::on(area)
        .margin(MARGIN)
        .x_label_area_size(if curve.show_x_ticks { X_LABEL_AREA } else { MARGIN })
        .y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(curve.x_range.clone(), curve.y_range.clone())?;

    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh()
        .label_style((FONT, LABEL_SIZE))
        .axis_desc_style((FONT, DESC_SIZE))
        .y_labels(5)
        .y_label_formatter(&y_fmt);
    if curve.show_x_ticks {
        mesh.x_labels(5).x_label_formatter(&x_fmt);
    } else {
        mesh.x_labels(0);
    }
    if let Some(desc) = curve.x_label {
        mesh.x_desc(desc);
    }
    mesh.draw()?;

    let color = curve.color;
    chart
        .draw_series(LineSeries::new(curve.data.iter().copied(), color.stroke_width(2)))?
        .label(curve.label)
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&BACKGROUND.mix(0.8))
        .border_style(&BLACK)
        .label_font((FONT, LABEL_SIZE))
        .draw()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColumnLayout, RenderConfig, BASE_COLOR, CART_COLOR, ROD_COLOR};
    use crate::trajectory::Trajectory;

    #[test]
    fn margins_leave_a_square_plot() {
        for &(w, h) in &[(500u32, 470u32), (500, 500), (640, 300)] {
            let (l, r, t, b) = square_margins(w, h);
            let plot_w = w as i32 - l - r - Y_LABEL_AREA;
            let plot_h = h as i32 - t - b - X_LABEL_AREA;
            assert_eq!(plot_w, plot_h, "{w}x{h}");
        }
    }

    #[test]
    fn track_line_is_drawn_over_the_cart() {
        let trajectory = Trajectory::from_columns(
            ColumnLayout::new(1, true),
            vec![vec![0.0]],
            Some(vec![0.0]),
            vec![0.0],
            vec![0.0],
        )
        .unwrap();
        let config = RenderConfig {
            use_cart: true,
            cart_length: 1.0,
            cart_width: 0.5,
            ..RenderConfig::default()
        };
        let mut scene = Scene::build(&config, &trajectory).unwrap();
        scene.update(&trajectory, 0).unwrap();

        // No mesh and no labels, so no fonts are needed.
        let (w, h) = (200u32, 200u32);
        let mut buffer = vec![0u8; (w * h * 3) as usize];
        let (track_px, cart_px) = {
            let root = BitMapBackend::with_buffer(&mut buffer, (w, h)).into_drawing_area();
            root.fill(&BACKGROUND).unwrap();
            let b = scene.main.bound;
            let mut chart = ChartBuilder::on(&root)
                .build_cartesian_2d(-b..b, -b..b)
                .unwrap();
            draw_body(&mut chart, &scene, w as f64 / (2.0 * b)).unwrap();
            let track_px = chart.backend_coord(&(-0.4, 0.0));
            let cart_px = chart.backend_coord(&(-0.4, 0.2));
            root.present().unwrap();
            (track_px, cart_px)
        };
        let frame = RgbImage::from_raw(w, h, buffer).unwrap();
        let at = |(x, y): (i32, i32)| frame.get_pixel(x as u32, y as u32).0;

        assert_eq!(at(cart_px), [CART_COLOR.0, CART_COLOR.1, CART_COLOR.2]);
        let track = at(track_px);
        for covered in [CART_COLOR, ROD_COLOR, BASE_COLOR] {
            assert_ne!(track, [covered.0, covered.1, covered.2]);
        }
        assert_eq!(track, [TRACK_COLOR.0, TRACK_COLOR.1, TRACK_COLOR.2]);
    }

    #[test]
    #[ignore = "needs system fonts for axis labels"]
    fn rasterized_frame_shows_the_rod() {
        let trajectory = Trajectory::from_columns(
            ColumnLayout::new(1, true),
            vec![vec![0.0], vec![0.2]],
            Some(vec![0.0, 0.1]),
            vec![0.0, 1.0],
            vec![1.0, 0.0],
        )
        .unwrap();
        let config = RenderConfig {
            use_cart: true,
            ..RenderConfig::default()
        };
        let mut scene = Scene::build(&config, &trajectory).unwrap();
        scene.update(&trajectory, 1).unwrap();

        let canvas = PlottersCanvas::new(&VideoSettings::default());
        let frame = canvas.rasterize(&scene).unwrap();
        assert_eq!(frame.dimensions(), canvas.dimensions());

        let rod_pixels = frame
            .pixels()
            .filter(|p| p.0 == [ROD_COLOR.0, ROD_COLOR.1, ROD_COLOR.2])
            .count();
        assert!(rod_pixels > 100);
    }
}
