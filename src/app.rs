use crate::config::Config;
use crate::controller::{self, DutyCycle};
use crate::grid::IntensityGrid;
use crate::model::{GridGeometry, ScrollAxis, ScrollState};
use crate::source::ImageSource;
use crate::topology::Topology;
use log::{info, trace, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

pub struct App {
    grid: Arc<IntensityGrid>,
    geometry: GridGeometry,
    source: Box<dyn ImageSource>,
    scroll: ScrollState,
    refresh_period: Duration,
    shutdown: Arc<AtomicBool>,
    controllers: Vec<JoinHandle<()>>,
}

impl App {
    pub fn new(
        config: &Config,
        topology: &Topology,
        geometry: GridGeometry,
        source: Box<dyn ImageSource>,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        let grid = Arc::new(IntensityGrid::new(geometry.cells(), config.duty_levels));
        let cycle = DutyCycle::new(config.control_period_ms, config.duty_levels);
        let controllers =
            controller::spawn_controllers(topology.procs(), &grid, cycle, &shutdown);
        info!(
            "driving {} of {} cores as a {}x{} grid",
            controllers.len(),
            topology.len(),
            geometry.rows,
            geometry.width
        );
        Self {
            grid,
            geometry,
            source,
            scroll: ScrollState::default(),
            refresh_period: Duration::from_millis(config.refresh_period_ms),
            shutdown,
            controllers,
        }
    }

    /// Refresh loop: repaint the grid every period until shutdown, then
    /// join the controller threads.
    pub fn run(mut self) {
        while !self.shutdown.load(Ordering::Relaxed) {
            self.tick();
            std::thread::sleep(self.refresh_period);
        }
        info!(
            "shutdown requested, stopping {} core controllers",
            self.controllers.len()
        );
        for handle in self.controllers.drain(..) {
            let _ = handle.join();
        }
    }

    pub fn tick(&mut self) {
        tick(
            self.source.as_mut(),
            &self.grid,
            &self.geometry,
            &mut self.scroll,
        );
        trace!("grid: {:?}", self.grid.snapshot());
    }
}

/// One refresh: re-acquire the frame, repaint every reachable cell, then
/// advance the scroll offset on scrolling sources. A failed re-capture
/// skips the tick and the grid keeps its previous values.
fn tick(
    source: &mut dyn ImageSource,
    grid: &IntensityGrid,
    geometry: &GridGeometry,
    scroll: &mut ScrollState,
) {
    if let Err(e) = source.refresh() {
        warn!("frame refresh failed, keeping previous grid: {}", e);
        return;
    }
    paint(source, grid, geometry, scroll.offset());
    if source.scroll_axis().is_some() {
        scroll.advance();
    }
}

/// Write a duty level for every cell `row * width + col < N`, sampling the
/// source at the scroll-adjusted coordinate and quantizing to grey.
fn paint(source: &dyn ImageSource, grid: &IntensityGrid, geometry: &GridGeometry, offset: u64) {
    let (fw, fh) = source.dimensions();
    if grid.is_empty() || fw == 0 || fh == 0 {
        return;
    }
    let axis = source.scroll_axis();
    for row in 0..geometry.rows {
        for col in 0..geometry.width {
            let index = (row * geometry.width + col) as usize;
            if index >= grid.len() {
                break;
            }
            let (sx, sy) = match axis {
                Some(ScrollAxis::Horizontal) => {
                    (((col as u64 + offset) % fw as u64) as u32, row.min(fh - 1))
                }
                Some(ScrollAxis::Vertical) => {
                    (col.min(fw - 1), ((row as u64 + offset) % fh as u64) as u32)
                }
                None => (col.min(fw - 1), row.min(fh - 1)),
            };
            grid.store(index, grid.quantize(source.sample(sx, sy)));
        }
    }
}
