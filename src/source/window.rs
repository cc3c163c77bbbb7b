use super::{ImageSource, SourceError};
use crate::model::{GridGeometry, ScrollAxis};
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use xcap::Window;

/// Live window source: finds the target process's main visible window and
/// re-captures it on every refresh tick, stretched to the grid's shape.
pub struct WindowSource {
    pid: u32,
    target: (u32, u32),
    frame: RgbImage,
}

impl WindowSource {
    pub fn open(pid: u32, geom: &GridGeometry) -> Result<Self, SourceError> {
        let target = (geom.width.max(1), geom.rows.max(1));
        let mut source = Self {
            pid,
            target,
            frame: RgbImage::new(target.0, target.1),
        };
        // A window that cannot be captured at startup is fatal upstream;
        // later failures skip the tick and keep the previous frame.
        source.refresh()?;
        Ok(source)
    }

    fn capture(&self) -> Result<RgbImage, SourceError> {
        let windows = Window::all().map_err(|e| SourceError::Capture(e.to_string()))?;
        let window = windows
            .into_iter()
            .find(|w| {
                w.pid().map(|pid| pid == self.pid).unwrap_or(false)
                    && !w.is_minimized().unwrap_or(true)
            })
            .ok_or(SourceError::WindowNotFound { pid: self.pid })?;
        let shot = window
            .capture_image()
            .map_err(|e| SourceError::Capture(e.to_string()))?;
        let (w, h) = self.target;
        Ok(DynamicImage::ImageRgba8(shot)
            .resize_exact(w, h, FilterType::Triangle)
            .to_rgb8())
    }
}

impl ImageSource for WindowSource {
    fn dimensions(&self) -> (u32, u32) {
        self.frame.dimensions()
    }

    fn sample(&self, x: u32, y: u32) -> [u8; 3] {
        self.frame.get_pixel(x, y).0
    }

    fn refresh(&mut self) -> Result<(), SourceError> {
        self.frame = self.capture()?;
        Ok(())
    }

    fn scroll_axis(&self) -> Option<ScrollAxis> {
        None
    }
}
