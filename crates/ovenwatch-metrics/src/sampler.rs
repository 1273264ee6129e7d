//! Sampler — point-in-time host resource gauges.
//!
//! Stateless: every call re-queries the host, no caching.

use sysinfo::System;

/// Reads instantaneous CPU and memory utilization from the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sampler;

impl Sampler {
    pub fn new() -> Self {
        Self
    }

    /// One-minute load average divided by logical CPU count, as a
    /// percentage rounded to 2 decimals. Exceeds 100 under sustained
    /// overload; intentionally not clamped.
    pub fn cpu_usage_percent(&self) -> f64 {
        let load = System::load_average().one;
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        round2(load / cpus as f64 * 100.0)
    }

    /// `(total - free) / total` memory as a percentage rounded to 2
    /// decimals. Returns `0.0` if the host reports no total memory.
    pub fn memory_usage_percent(&self) -> f64 {
        let mut system = System::new();
        system.refresh_memory();
        let total = system.total_memory();
        if total == 0 {
            return 0.0;
        }
        let used = total.saturating_sub(system.free_memory());
        round2(used as f64 / total as f64 * 100.0)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
