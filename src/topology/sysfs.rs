use std::fs;
use std::io;
use std::path::Path;

const NODE_ROOT: &str = "/sys/devices/system/node";
const CPU_ROOT: &str = "/sys/devices/system/cpu";

/// Processor ids grouped by NUMA node, node ids ascending. `Ok(None)` when
/// the host exposes no node directory (non-Linux, or kernels without NUMA),
/// in which case the caller falls back to a flat single-group layout.
pub fn numa_groups() -> io::Result<Option<Vec<(u32, Vec<usize>)>>> {
    numa_groups_at(Path::new(NODE_ROOT))
}

fn numa_groups_at(root: &Path) -> io::Result<Option<Vec<(u32, Vec<usize>)>>> {
    if !root.is_dir() {
        return Ok(None);
    }
    let mut groups = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(id) = name.strip_prefix("node").and_then(|s| s.parse::<u32>().ok()) else {
            continue;
        };
        let raw = fs::read_to_string(entry.path().join("cpulist"))?;
        let cpus = parse_cpu_list(raw.trim());
        // Memory-only nodes carry no CPUs and no display row.
        if cpus.is_empty() {
            continue;
        }
        groups.push((id, cpus));
    }
    if groups.is_empty() {
        return Ok(None);
    }
    groups.sort_by_key(|&(id, _)| id);
    Ok(Some(groups))
}

/// Parse a sysfs cpulist such as `0-3,8,10-11` into sorted processor ids.
pub fn parse_cpu_list(raw: &str) -> Vec<usize> {
    let mut cpus = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.split_once('-') {
            Some((lo, hi)) => {
                if let (Ok(lo), Ok(hi)) = (lo.trim().parse::<usize>(), hi.trim().parse::<usize>())
                {
                    cpus.extend(lo..=hi);
                }
            }
            None => {
                if let Ok(cpu) = part.parse() {
                    cpus.push(cpu);
                }
            }
        }
    }
    cpus.sort_unstable();
    cpus.dedup();
    cpus
}

/// Whether the core behind `cpu` reports an SMT sibling. Best effort;
/// absence of the sysfs entry reads as not multi-threaded.
pub fn is_smt(cpu: usize) -> bool {
    let path = format!("{}/cpu{}/topology/thread_siblings_list", CPU_ROOT, cpu);
    match fs::read_to_string(path) {
        Ok(raw) => parse_cpu_list(raw.trim()).len() > 1,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_ids_and_ranges() {
        assert_eq!(parse_cpu_list("0-3,8,10-11"), vec![0, 1, 2, 3, 8, 10, 11]);
        assert_eq!(parse_cpu_list("5"), vec![5]);
        assert_eq!(parse_cpu_list("0-0"), vec![0]);
    }

    #[test]
    fn tolerates_blanks_and_junk() {
        assert_eq!(parse_cpu_list(""), Vec::<usize>::new());
        assert_eq!(parse_cpu_list(" 1, ,2 "), vec![1, 2]);
        assert_eq!(parse_cpu_list("a-b,3"), vec![3]);
    }

    #[test]
    fn sorts_and_dedups() {
        assert_eq!(parse_cpu_list("3,1,2,2-3"), vec![1, 2, 3]);
    }

    #[test]
    fn missing_node_root_is_not_an_error() {
        let got = numa_groups_at(Path::new("/nonexistent/corepaint-test")).unwrap();
        assert!(got.is_none());
    }
}
