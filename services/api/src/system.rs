//! Host resource metrics.
//!
//! A [`SystemProbe`] samples CPU, memory and disk utilisation. Sampling is
//! blocking (CPU usage needs two readings some time apart), so callers run it
//! on the blocking pool. When the probe fails, a fixed set of substitute
//! metrics is reported instead of an error.

use crate::models::{MetricStatus, SystemMetric, Trend};
use std::path::Path;
use sysinfo::{Disks, System};

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("no disk mounted at {0}")]
    DiskNotFound(String),
    #[error("{0} reported zero capacity")]
    ZeroCapacity(&'static str),
    #[error("probe task failed: {0}")]
    Task(String),
}

/// Utilisation percentages of the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceUsage {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
}

pub trait SystemProbe: Send + Sync {
    /// Takes one blocking sample of host utilisation.
    fn sample(&self) -> Result<ResourceUsage, ProbeError>;
}

/// Samples the local host through `sysinfo`; disk usage is read for the root
/// mount point.
pub struct SysinfoProbe;

impl SystemProbe for SysinfoProbe {
    fn sample(&self) -> Result<ResourceUsage, ProbeError> {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        sys.refresh_cpu_usage();
        let cpu_percent = sys.global_cpu_usage() as f64;

        sys.refresh_memory();
        let total_memory = sys.total_memory();
        if total_memory == 0 {
            return Err(ProbeError::ZeroCapacity("memory"));
        }
        let memory_percent = sys.used_memory() as f64 / total_memory as f64 * 100.0;

        let disks = Disks::new_with_refreshed_list();
        let root = disks
            .list()
            .iter()
            .find(|disk| disk.mount_point() == Path::new("/"))
            .ok_or_else(|| ProbeError::DiskNotFound("/".to_string()))?;
        let total_space = root.total_space();
        if total_space == 0 {
            return Err(ProbeError::ZeroCapacity("disk"));
        }
        let used_space = total_space.saturating_sub(root.available_space());
        let disk_percent = used_space as f64 / total_space as f64 * 100.0;

        Ok(ResourceUsage {
            cpu_percent,
            memory_percent,
            disk_percent,
        })
    }
}

fn percent_metric(name: &str, value: f64, trend: Trend) -> SystemMetric {
    SystemMetric {
        name: name.to_string(),
        value,
        unit: "%".to_string(),
        status: MetricStatus::from_percent(value),
        trend,
    }
}

impl ResourceUsage {
    pub fn metrics(&self) -> Vec<SystemMetric> {
        vec![
            percent_metric("CPU Usage", self.cpu_percent, Trend::Stable),
            percent_metric("Memory Usage", self.memory_percent, Trend::Stable),
            percent_metric("Disk Usage", self.disk_percent, Trend::Stable),
        ]
    }
}

/// Substitute metrics reported when the host cannot be probed.
pub fn fallback_metrics() -> Vec<SystemMetric> {
    vec![
        percent_metric("CPU Usage", 45.0, Trend::Stable),
        percent_metric("Memory Usage", 72.0, Trend::Up),
        percent_metric("Disk Usage", 38.0, Trend::Stable),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_to_metrics_applies_thresholds() {
        let metrics = ResourceUsage {
            cpu_percent: 95.0,
            memory_percent: 75.0,
            disk_percent: 50.0,
        }
        .metrics();

        assert_eq!(metrics[0].name, "CPU Usage");
        assert_eq!(metrics[0].status, MetricStatus::Critical);
        assert_eq!(metrics[1].status, MetricStatus::Warning);
        assert_eq!(metrics[2].status, MetricStatus::Good);
        assert!(metrics.iter().all(|m| m.unit == "%" && m.trend == Trend::Stable));
    }

    #[test]
    fn test_fallback_metrics() {
        let metrics = fallback_metrics();
        let statuses: Vec<MetricStatus> = metrics.iter().map(|m| m.status).collect();
        assert_eq!(
            statuses,
            vec![MetricStatus::Good, MetricStatus::Warning, MetricStatus::Good]
        );
        assert_eq!(metrics[1].trend, Trend::Up);
    }

    #[test]
    fn test_sysinfo_probe_reports_percentages() {
        // Containers without a root mount are a legitimate probe failure.
        if let Ok(usage) = SysinfoProbe.sample() {
            for value in [usage.cpu_percent, usage.memory_percent, usage.disk_percent] {
                assert!((0.0..=100.0).contains(&value), "{} out of range", value);
            }
        }
    }
}
