use std::sync::atomic::{AtomicU32, Ordering};

/// Shared duty-level array, one cell per logical processor in display
/// order. Written by the refresh loop, read continuously by the controller
/// threads. Cells are individual atomics so a write is observed whole;
/// there is no cross-cell ordering, and a reader seeing a value one refresh
/// tick old is acceptable.
pub struct IntensityGrid {
    cells: Vec<AtomicU32>,
    levels: u32,
}

impl IntensityGrid {
    /// `levels` is the greyscale depth K; every cell holds a duty in 0..=K.
    pub fn new(cells: usize, levels: u32) -> Self {
        assert!(levels > 0, "duty levels must be at least 1");
        Self {
            cells: (0..cells).map(|_| AtomicU32::new(0)).collect(),
            levels,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn levels(&self) -> u32 {
        self.levels
    }

    pub fn store(&self, index: usize, duty: u32) {
        self.cells[index].store(duty.min(self.levels), Ordering::Relaxed);
    }

    pub fn load(&self, index: usize) -> u32 {
        self.cells[index].load(Ordering::Relaxed).min(self.levels)
    }

    /// Average the channels to grey and quantize onto the duty scale,
    /// inverted: full black is 100% CPU, full white is idle.
    pub fn quantize(&self, rgb: [u8; 3]) -> u32 {
        let grey = (rgb[0] as u32 + rgb[1] as u32 + rgb[2] as u32) / 3;
        self.levels - grey * self.levels / 255
    }

    pub fn snapshot(&self) -> Vec<u32> {
        self.cells
            .iter()
            .map(|c| c.load(Ordering::Relaxed))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_maps_to_full_duty_and_white_to_idle() {
        let grid = IntensityGrid::new(4, 8);
        assert_eq!(grid.quantize([0, 0, 0]), 8);
        assert_eq!(grid.quantize([255, 255, 255]), 0);
    }

    #[test]
    fn quantize_is_monotone_in_darkness() {
        let grid = IntensityGrid::new(1, 8);
        let mut last = u32::MAX;
        for grey in [0u8, 32, 64, 96, 128, 160, 192, 224, 255] {
            let duty = grid.quantize([grey, grey, grey]);
            assert!(duty <= last);
            assert!(duty <= grid.levels());
            last = duty;
        }
    }

    #[test]
    fn quantize_averages_channels() {
        let grid = IntensityGrid::new(1, 8);
        assert_eq!(
            grid.quantize([30, 60, 90]),
            grid.quantize([60, 60, 60])
        );
    }

    #[test]
    fn store_clamps_to_duty_scale() {
        let grid = IntensityGrid::new(2, 4);
        grid.store(0, 99);
        assert_eq!(grid.load(0), 4);
        grid.store(1, 3);
        assert_eq!(grid.load(1), 3);
    }
}
