mod bitmap;
mod window;

pub use bitmap::BitmapSource;
pub use window::WindowSource;

use crate::model::{GridGeometry, ScrollAxis};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to load image {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("no visible window found for pid {pid}")]
    WindowNotFound { pid: u32 },
    #[error("window capture failed: {0}")]
    Capture(String),
}

/// Where the pixels come from: a bitmap decoded once and scrolled, or a
/// live window re-captured on every refresh tick.
pub trait ImageSource {
    fn dimensions(&self) -> (u32, u32);

    fn sample(&self, x: u32, y: u32) -> [u8; 3];

    /// Re-acquire the frame. No-op for static bitmaps; a failed live
    /// capture leaves the previous frame in place and the tick is skipped.
    fn refresh(&mut self) -> Result<(), SourceError>;

    /// Which axis the refresh loop scrolls, if any. Live captures follow
    /// the window instead of scrolling.
    fn scroll_axis(&self) -> Option<ScrollAxis>;
}

/// The command line's source argument: a nonzero decimal is a process id
/// whose main window is captured live, anything else is a bitmap path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    Bitmap(PathBuf),
    Window(u32),
}

impl SourceSpec {
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<u32>() {
            Ok(pid) if pid != 0 => SourceSpec::Window(pid),
            _ => SourceSpec::Bitmap(PathBuf::from(raw)),
        }
    }
}

pub fn open(spec: &SourceSpec, geom: &GridGeometry) -> Result<Box<dyn ImageSource>, SourceError> {
    match spec {
        SourceSpec::Bitmap(path) => Ok(Box::new(BitmapSource::open(path, geom)?)),
        SourceSpec::Window(pid) => Ok(Box::new(WindowSource::open(*pid, geom)?)),
    }
}
