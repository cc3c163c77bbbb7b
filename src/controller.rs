use crate::grid::IntensityGrid;
use crate::model::LogicalProcessor;
use log::warn;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Busy/sleep split for one control period. With greyscale depth K, a duty
/// of d burns the core for d/K of the period and sleeps the rest, which the
/// display's ~1s utilization sampling averages to d/K * 100%.
#[derive(Debug, Clone, Copy)]
pub struct DutyCycle {
    period: Duration,
    levels: u32,
}

impl DutyCycle {
    pub fn new(period_ms: u64, levels: u32) -> Self {
        assert!(levels > 0, "duty levels must be at least 1");
        Self {
            period: Duration::from_millis(period_ms),
            levels,
        }
    }

    pub fn busy_slice(&self, duty: u32) -> Duration {
        self.period * duty.min(self.levels) / self.levels
    }

    pub fn idle_slice(&self, duty: u32) -> Duration {
        self.period - self.busy_slice(duty)
    }
}

/// Launch one controller thread per logical processor, each pinned to its
/// processor. A spawn failure leaves that core unrendered; the rest of the
/// system proceeds.
pub fn spawn_controllers(
    procs: &[LogicalProcessor],
    grid: &Arc<IntensityGrid>,
    cycle: DutyCycle,
    shutdown: &Arc<AtomicBool>,
) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::with_capacity(procs.len());
    for proc in procs {
        let proc = *proc;
        let grid = Arc::clone(grid);
        let shutdown = Arc::clone(shutdown);
        let spawned = std::thread::Builder::new()
            .name(format!("core-{}", proc.index))
            .spawn(move || controller_loop(proc, &grid, cycle, &shutdown));
        match spawned {
            Ok(handle) => handles.push(handle),
            Err(e) => warn!(
                "cpu {} (group {}, bit {}): spawn failed, core left unrendered: {}",
                proc.cpu_id, proc.group, proc.bit, e
            ),
        }
    }
    handles
}

fn controller_loop(
    proc: LogicalProcessor,
    grid: &IntensityGrid,
    cycle: DutyCycle,
    shutdown: &AtomicBool,
) {
    if let Err(e) = pin_current_thread(proc.cpu_id) {
        warn!(
            "cpu {} (group {}, bit {}): affinity pin failed, core left unrendered: {}",
            proc.cpu_id, proc.group, proc.bit, e
        );
        return;
    }
    // No I/O, allocation, or logging past this point: anything else the
    // thread does shows up in the very utilization it is painting.
    while !shutdown.load(Ordering::Relaxed) {
        let duty = grid.load(proc.index);
        let busy = cycle.busy_slice(duty);
        let start = Instant::now();
        while start.elapsed() < busy {
            std::hint::spin_loop();
        }
        let idle = cycle.idle_slice(duty);
        if !idle.is_zero() {
            std::thread::sleep(idle);
        }
    }
}

#[cfg(target_os = "linux")]
fn pin_current_thread(cpu_id: usize) -> std::io::Result<()> {
    use nix::sched::{sched_setaffinity, CpuSet};
    use nix::unistd::Pid;

    let mut set = CpuSet::new();
    set.set(cpu_id)?;
    // Pid 0 applies to the calling thread only.
    sched_setaffinity(Pid::from_raw(0), &set)?;
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn pin_current_thread(cpu_id: usize) -> std::io::Result<()> {
    log::debug!("cpu {}: affinity pinning unavailable, running unpinned", cpu_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_fraction_matches_duty_over_levels() {
        let cycle = DutyCycle::new(100, 8);
        for duty in 0..=8 {
            assert_eq!(
                cycle.busy_slice(duty),
                Duration::from_millis(100) * duty / 8
            );
        }
        assert_eq!(cycle.busy_slice(0), Duration::ZERO);
        assert_eq!(cycle.busy_slice(8), Duration::from_millis(100));
    }

    #[test]
    fn busy_and_idle_cover_the_whole_period() {
        let cycle = DutyCycle::new(100, 4);
        for duty in 0..=4 {
            assert_eq!(
                cycle.busy_slice(duty) + cycle.idle_slice(duty),
                Duration::from_millis(100)
            );
        }
    }

    #[test]
    fn out_of_range_duty_is_clamped() {
        let cycle = DutyCycle::new(100, 8);
        assert_eq!(cycle.busy_slice(200), Duration::from_millis(100));
        assert_eq!(cycle.idle_slice(200), Duration::ZERO);
    }

    #[test]
    fn controllers_stop_on_shutdown() {
        let grid = Arc::new(IntensityGrid::new(1, 8));
        let shutdown = Arc::new(AtomicBool::new(true));
        let proc = LogicalProcessor {
            index: 0,
            group: 0,
            bit: 0,
            cpu_id: 0,
            smt: false,
        };
        let handles =
            spawn_controllers(&[proc], &grid, DutyCycle::new(10, 8), &shutdown);
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
