mod sysfs;

use crate::model::LogicalProcessor;
use log::{debug, info};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("failed to read processor topology: {0}")]
    Io(#[from] std::io::Error),
}

/// The machine's logical processors in the order a per-core utilization
/// display enumerates them: groups ascending, then mask bit within each
/// group. Enumerated once at startup; indices are stable for the process
/// lifetime.
pub struct Topology {
    procs: Vec<LogicalProcessor>,
}

impl Topology {
    pub fn enumerate() -> Result<Self, TopologyError> {
        let groups = match sysfs::numa_groups()? {
            Some(groups) => groups,
            None => flat_fallback(),
        };
        Ok(Self::from_groups(groups, sysfs::is_smt))
    }

    fn from_groups(groups: Vec<(u32, Vec<usize>)>, smt: impl Fn(usize) -> bool) -> Self {
        let mut procs = Vec::new();
        for (group, cpus) in groups {
            for (bit, cpu_id) in cpus.into_iter().enumerate() {
                procs.push(LogicalProcessor {
                    index: procs.len(),
                    group,
                    bit: bit as u32,
                    cpu_id,
                    smt: smt(cpu_id),
                });
            }
        }
        Self { procs }
    }

    pub fn len(&self) -> usize {
        self.procs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procs.is_empty()
    }

    pub fn procs(&self) -> &[LogicalProcessor] {
        &self.procs
    }

    pub fn log_summary(&self) {
        let mut groups: Vec<(u32, usize)> = Vec::new();
        for proc in &self.procs {
            match groups.last_mut() {
                Some((id, count)) if *id == proc.group => *count += 1,
                _ => groups.push((proc.group, 1)),
            }
            if proc.smt {
                debug!("cpu {} reports an SMT sibling", proc.cpu_id);
            }
        }
        info!(
            "cores found: {}, processor groups found: {}",
            self.len(),
            groups.len()
        );
        for (id, count) in groups {
            info!("processor group {} has {} cores", id, count);
        }
    }
}

fn flat_fallback() -> Vec<(u32, Vec<usize>)> {
    let sys = sysinfo::System::new_all();
    let cpus: Vec<usize> = (0..sys.cpus().len()).collect();
    vec![(0, cpus)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(topo: &Topology) -> Vec<usize> {
        topo.procs().iter().map(|p| p.index).collect()
    }

    #[test]
    fn indices_are_contiguous_across_groups() {
        let topo = Topology::from_groups(
            vec![(0, vec![0, 1, 2, 3]), (1, vec![4, 5, 6, 7])],
            |_| false,
        );
        assert_eq!(indices(&topo), (0..8).collect::<Vec<_>>());
        assert_eq!(topo.procs()[4].group, 1);
        assert_eq!(topo.procs()[4].bit, 0);
        assert_eq!(topo.procs()[4].cpu_id, 4);
    }

    #[test]
    fn bit_positions_restart_per_group() {
        let topo = Topology::from_groups(
            vec![(0, vec![0, 2]), (2, vec![1, 3, 5])],
            |_| false,
        );
        let bits: Vec<u32> = topo.procs().iter().map(|p| p.bit).collect();
        assert_eq!(bits, vec![0, 1, 0, 1, 2]);
        assert_eq!(indices(&topo), (0..5).collect::<Vec<_>>());
    }

    #[test]
    fn interleaved_cpu_ids_keep_display_order() {
        // Nodes often own interleaved OS ids; display order follows the
        // group, not the raw id.
        let topo = Topology::from_groups(
            vec![(0, vec![0, 2, 4]), (1, vec![1, 3, 5])],
            |_| false,
        );
        let cpu_ids: Vec<usize> = topo.procs().iter().map(|p| p.cpu_id).collect();
        assert_eq!(cpu_ids, vec![0, 2, 4, 1, 3, 5]);
        assert_eq!(indices(&topo), (0..6).collect::<Vec<_>>());
    }

    #[test]
    fn empty_layout_yields_empty_topology() {
        let topo = Topology::from_groups(vec![], |_| false);
        assert!(topo.is_empty());
        assert_eq!(topo.len(), 0);
    }
}
