/// One logical processor in display order: processors are grouped the way
/// the utilization display groups them (group-major, then mask bit within
/// the group), and `index` is the position in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalProcessor {
    pub index: usize,
    pub group: u32,
    pub bit: u32,
    /// OS scheduling id, used for thread affinity.
    pub cpu_id: usize,
    /// Core reports an SMT sibling. Informational only.
    pub smt: bool,
}

/// Shape of the display grid: `width` columns as shown by the utilization
/// display, `rows` enough to cover every processor. The trailing row may be
/// partial; indices past `cells` are never written or read.
#[derive(Debug, Clone, Copy)]
pub struct GridGeometry {
    pub width: u32,
    pub rows: u32,
    cells: usize,
}

impl GridGeometry {
    pub fn new(cells: usize, width: u32) -> Self {
        assert!(width > 0, "grid width must be at least 1");
        let rows = (cells as u32).div_ceil(width);
        Self { width, rows, cells }
    }

    pub fn cells(&self) -> usize {
        self.cells
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAxis {
    Horizontal,
    Vertical,
}

/// Monotonic scroll offset for static images. Reset only at process start.
#[derive(Debug, Default)]
pub struct ScrollState {
    offset: u64,
}

impl ScrollState {
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn advance(&mut self) {
        self.offset += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_rounds_partial_rows_up() {
        let geom = GridGeometry::new(8, 4);
        assert_eq!(geom.rows, 2);
        let geom = GridGeometry::new(6, 4);
        assert_eq!(geom.rows, 2);
        let geom = GridGeometry::new(0, 4);
        assert_eq!(geom.rows, 0);
    }

    #[test]
    fn scroll_offset_is_monotonic() {
        let mut scroll = ScrollState::default();
        assert_eq!(scroll.offset(), 0);
        scroll.advance();
        scroll.advance();
        assert_eq!(scroll.offset(), 2);
    }
}
