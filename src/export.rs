// ------------------------------------------------------------
// Export: drive the frame updater across the whole trajectory
// and stream every rendered frame into a video encoder.
//
// Idle -> Rendering(0..count-1, strictly in order) -> Saved | Failed
// ------------------------------------------------------------

use std::env;
use std::fmt;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use image::RgbImage;
use log::{debug, info};

use crate::config::{VideoSettings, FFMPEG_ENV};
use crate::error::{RenderError, Result};
use crate::raster::Rasterizer;
use crate::scene::Scene;
use crate::trajectory::Trajectory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportState {
    Idle,
    Rendering { frame: usize },
    Saved,
    Failed,
}

impl fmt::Display for ExportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportState::Idle => f.write_str("idle"),
            ExportState::Rendering { frame } => write!(f, "rendering frame {frame}"),
            ExportState::Saved => f.write_str("saved"),
            ExportState::Failed => f.write_str("failed"),
        }
    }
}

// Consumer of rendered frames, in presentation order.
pub trait FrameSink {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()>;

    // Flush and close the output; no frames may follow.
    fn finish(&mut self) -> Result<()>;

    fn output_path(&self) -> &Path;

    // Playback rate the frames are encoded at.
    fn frame_rate(&self) -> u32;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub frames: usize,
    pub fps: u32,
    pub width: u32,
    pub height: u32,
    pub output: PathBuf,
}

pub struct Exporter<R: Rasterizer, S: FrameSink> {
    rasterizer: R,
    sink: S,
    state: ExportState,
}

impl<R: Rasterizer, S: FrameSink> Exporter<R, S> {
    pub fn new(rasterizer: R, sink: S) -> Self {
        Self {
            rasterizer,
            sink,
            state: ExportState::Idle,
        }
    }

    pub fn state(&self) -> ExportState {
        self.state
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn export(&mut self, scene: &mut Scene, trajectory: &Trajectory) -> Result<ExportSummary> {
        if self.state != ExportState::Idle {
            return Err(RenderError::NotResumable(self.state));
        }
        if trajectory.is_empty() {
            self.state = ExportState::Failed;
            return Err(RenderError::EmptyTrajectory);
        }

        info!(
            "saving video: {} frames at {} fps to {}",
            trajectory.len(),
            self.sink.frame_rate(),
            self.sink.output_path().display()
        );

        match self.render_all(scene, trajectory) {
            Ok(summary) => {
                self.state = ExportState::Saved;
                info!("video saved: {}", summary.output.display());
                Ok(summary)
            }
            Err(err) => {
                self.state = ExportState::Failed;
                Err(err)
            }
        }
    }

    fn render_all(&mut self, scene: &mut Scene, trajectory: &Trajectory) -> Result<ExportSummary> {
        let count = trajectory.len();
        let fps = self.sink.frame_rate();
        let progress_every = fps.max(1) as usize;
        let mut size = (0, 0);

        for frame in 0..count {
            self.state = ExportState::Rendering { frame };

            let touched = scene.update(trajectory, frame)?;
            let image = self.rasterizer.rasterize(scene)?;
            size = image.dimensions();
            self.sink.write_frame(&image)?;

            debug!("frame {frame}: {} elements updated", touched.len());
            if frame % progress_every == 0 {
                info!("frame {}/{}", frame, count);
            }
        }

        self.sink.finish()?;

        Ok(ExportSummary {
            frames: count,
            fps,
            width: size.0,
            height: size.1,
            output: self.sink.output_path().to_path_buf(),
        })
    }
}

// ------------------------------------------------------------
// ffmpeg encoder: raw rgb24 frames over stdin -> H.264 MP4
// ------------------------------------------------------------
pub struct FfmpegEncoder {
    program: String,
    output: PathBuf,
    settings: VideoSettings,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    size: Option<(u32, u32)>,
}

impl FfmpegEncoder {
    pub fn new(output: &Path, settings: VideoSettings) -> Self {
        let program = env::var(FFMPEG_ENV).unwrap_or_else(|_| "ffmpeg".to_string());
        Self::with_program(program, output, settings)
    }

    pub fn with_program(program: impl Into<String>, output: &Path, settings: VideoSettings) -> Self {
        Self {
            program: program.into(),
            output: output.to_path_buf(),
            settings,
            child: None,
            stdin: None,
            size: None,
        }
    }

    pub fn command(&self, width: u32, height: u32) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-y")
            .arg("-f")
            .arg("rawvideo")
            .arg("-pix_fmt")
            .arg("rgb24")
            .arg("-s")
            .arg(format!("{}x{}", width, height))
            .arg("-r")
            .arg(self.settings.fps.to_string())
            .arg("-i")
            .arg("-")
            .arg("-c:v")
            .arg(self.settings.codec)
            .arg("-b:v")
            .arg(format!("{}k", self.settings.bitrate_kbps))
            .arg("-pix_fmt")
            .arg(self.settings.pix_fmt)
            .arg(self.output.as_os_str());
        cmd
    }

    fn spawn(&mut self, width: u32, height: u32) -> Result<()> {
        let mut cmd = self.command(width, height);
        debug!("starting encoder: {:?}", cmd);

        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| RenderError::EncoderUnavailable {
                program: self.program.clone(),
                source,
            })?;

        self.stdin = child.stdin.take();
        self.child = Some(child);
        self.size = Some((width, height));
        Ok(())
    }
}

impl FrameSink for FfmpegEncoder {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        let dims = frame.dimensions();
        match self.size {
            None => self.spawn(dims.0, dims.1)?,
            Some(size) if size != dims => {
                return Err(RenderError::Encoder(format!(
                    "frame size changed from {}x{} to {}x{}",
                    size.0, size.1, dims.0, dims.1
                )))
            }
            Some(_) => {}
        }

        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| RenderError::Encoder("encoder input is closed".to_string()))?;
        stdin.write_all(frame.as_raw()).map_err(|err| {
            if err.kind() == ErrorKind::BrokenPipe {
                RenderError::Encoder(format!("{} exited while receiving frames", self.program))
            } else {
                RenderError::Encoder(err.to_string())
            }
        })
    }

    fn finish(&mut self) -> Result<()> {
        // Closing stdin signals end of stream.
        drop(self.stdin.take());

        let mut child = self
            .child
            .take()
            .ok_or_else(|| RenderError::Encoder("no frames were written".to_string()))?;
        let status = child.wait().map_err(|err| RenderError::Encoder(err.to_string()))?;
        if !status.success() {
            return Err(RenderError::Encoder(format!(
                "{} exited with {}",
                self.program, status
            )));
        }
        Ok(())
    }

    fn output_path(&self) -> &Path {
        &self.output
    }

    fn frame_rate(&self) -> u32 {
        self.settings.fps
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
