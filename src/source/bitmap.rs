use super::{ImageSource, SourceError};
use crate::model::{GridGeometry, ScrollAxis};
use image::imageops::FilterType;
use image::RgbImage;
use std::path::Path;

/// Static image, decoded and scaled once. The shorter dimension is fitted
/// exactly onto the matching grid dimension; the longer one overflows and
/// is scrolled by the refresh loop.
pub struct BitmapSource {
    frame: RgbImage,
    axis: ScrollAxis,
}

impl BitmapSource {
    pub fn open(path: &Path, geom: &GridGeometry) -> Result<Self, SourceError> {
        let img = image::open(path).map_err(|source| SourceError::Decode {
            path: path.display().to_string(),
            source,
        })?;
        let (w, h) = (img.width().max(1), img.height().max(1));
        // Wider than tall scrolls horizontally, otherwise vertically;
        // uniform scale so the fitted dimension lands on the grid exactly.
        let (axis, sw, sh) = if w > h {
            let rows = geom.rows.max(1);
            (ScrollAxis::Horizontal, scale_to(w, rows, h), rows)
        } else {
            let width = geom.width;
            (ScrollAxis::Vertical, width, scale_to(h, width, w))
        };
        let frame = img.resize_exact(sw, sh, FilterType::Triangle).to_rgb8();
        Ok(Self { frame, axis })
    }
}

fn scale_to(dim: u32, target: u32, fitted: u32) -> u32 {
    ((dim as u64 * target as u64 + fitted as u64 / 2) / fitted as u64).max(1) as u32
}

impl ImageSource for BitmapSource {
    fn dimensions(&self) -> (u32, u32) {
        self.frame.dimensions()
    }

    fn sample(&self, x: u32, y: u32) -> [u8; 3] {
        self.frame.get_pixel(x, y).0
    }

    fn refresh(&mut self) -> Result<(), SourceError> {
        Ok(())
    }

    fn scroll_axis(&self) -> Option<ScrollAxis> {
        Some(self.axis)
    }
}
