// ------------------------------------------------------------
// Multi-rod pendulum animation
//
// Reads   data/<task>/run_<id>/trajectory.csv
// Writes  data/<task>/run_<id>/trajectory.mp4   (H.264, 30 fps)
//
// CSV rows (header row required):
//   fixed-base: theta_1 .. theta_N, action, reward
//   cart-based: theta_1 .. theta_N, x_cart, action, reward
// ------------------------------------------------------------

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use trajectory_render::{
    Exporter, FfmpegEncoder, PlottersCanvas, RenderConfig, RunPaths, Scene, Trajectory,
    VideoSettings,
};

#[derive(Debug, Parser)]
#[command(about = "Multi-rod pendulum animation")]
struct Args {
    /// Task name (e.g. cartpole, pendulum); selects data/<task>/
    #[arg(long)]
    task: String,

    /// Run id; selects data/<task>/run_<run_id>/
    #[arg(long = "run_id", default_value_t = 1)]
    run_id: u32,

    /// Length of each rod element
    #[arg(long = "rod_length", default_value_t = 1.0)]
    rod_length: f64,

    /// Width of each rod element
    #[arg(long = "rod_width", default_value_t = 0.2)]
    rod_width: f64,

    /// Length of the cart
    #[arg(long = "cart_length", default_value_t = 0.2)]
    cart_length: f64,

    /// Width of the cart
    #[arg(long = "cart_width", default_value_t = 0.1)]
    cart_width: f64,

    /// Axis bounds of the main view
    #[arg(long, default_value_t = 2.2)]
    bound: f64,

    /// Number of rod elements in the pendulum
    #[arg(
        long = "num_rods",
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    num_rods: u32,

    /// Enable cart-based motion
    #[arg(long = "use_cart")]
    use_cart: bool,
}

impl Args {
    fn render_config(&self) -> RenderConfig {
        RenderConfig {
            rod_length: self.rod_length,
            rod_width: self.rod_width,
            cart_length: self.cart_length,
            cart_width: self.cart_width,
            bound: self.bound,
            num_rods: self.num_rods as usize,
            use_cart: self.use_cart,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.render_config();
    config.validate().context("Invalid render settings")?;

    let paths = RunPaths::new(&args.task, args.run_id);

    let trajectory = Trajectory::load(&paths.input, config.layout())
        .with_context(|| format!("Failed to load {}", paths.input.display()))?;
    info!(
        "loaded {} frames from {} ({} rods, {})",
        trajectory.len(),
        paths.input.display(),
        config.num_rods,
        config.layout().mode()
    );

    let mut scene = Scene::build(&config, &trajectory).context("Failed to build scene")?;

    let settings = VideoSettings::default();
    let canvas = PlottersCanvas::new(&settings);
    let encoder = FfmpegEncoder::new(&paths.output, settings);

    let mut exporter = Exporter::new(canvas, encoder);
    let summary = exporter
        .export(&mut scene, &trajectory)
        .with_context(|| format!("Failed to write {}", paths.output.display()))?;

    info!(
        "Done. {} frames ({}x{}, {} fps) written to {}",
        summary.frames,
        summary.width,
        summary.height,
        summary.fps,
        summary.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("trajectory_render").chain(args.iter().copied()))
    }

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_match_render_config() {
        let args = parse(&["--task", "pendulum"]).unwrap();
        assert_eq!(args.task, "pendulum");
        assert_eq!(args.run_id, 1);
        assert_eq!(args.render_config(), RenderConfig::default());
    }

    #[test]
    fn underscore_flags_map_onto_config() {
        let args = parse(&[
            "--task",
            "double_cartpole",
            "--run_id",
            "7",
            "--rod_length",
            "0.5",
            "--rod_width",
            "0.05",
            "--cart_length",
            "0.4",
            "--cart_width",
            "0.3",
            "--bound",
            "3.0",
            "--num_rods",
            "2",
            "--use_cart",
        ])
        .unwrap();

        assert_eq!(args.run_id, 7);
        assert_eq!(
            args.render_config(),
            RenderConfig {
                rod_length: 0.5,
                rod_width: 0.05,
                cart_length: 0.4,
                cart_width: 0.3,
                bound: 3.0,
                num_rods: 2,
                use_cart: true,
            }
        );
        let paths = RunPaths::new(&args.task, args.run_id);
        assert!(paths.input.ends_with("double_cartpole/run_7/trajectory.csv"));
    }

    #[test]
    fn task_is_required() {
        let err = parse(&["--run_id", "2"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn zero_rods_are_rejected() {
        let err = parse(&["--task", "pendulum", "--num_rods", "0"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn hyphenated_spellings_are_not_accepted() {
        for flag in ["--run-id", "--rod-length", "--num-rods"] {
            let err = parse(&["--task", "pendulum", flag, "2"]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnknownArgument, "{flag}");
        }
        let err = parse(&["--task", "pendulum", "--use-cart"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }
}
