use std::path::Path;

use tracing::debug;

use crate::{error::Result, host::Host};

const CPUINFO: &str = "/proc/cpuinfo";

/// Microcode vendor (`intel` or `amd`) of the running CPU, as used in the
/// `<vendor>-ucode` package and its `/<vendor>-ucode.img` initrd.
pub fn vendor(host: &dyn Host) -> Result<&'static str> {
    let cpuinfo = host.read_to_string(Path::new(CPUINFO))?;
    let vendor = vendor_from_cpuinfo(&cpuinfo);
    debug!(vendor, "detected CPU vendor");
    Ok(vendor)
}

/// Anything that is not Intel is treated as AMD.
pub fn vendor_from_cpuinfo(cpuinfo: &str) -> &'static str {
    let model = cpuinfo
        .lines()
        .find(|line| line.starts_with("model name"))
        .unwrap_or_default();

    if model.to_lowercase().contains("intel") {
        "intel"
    } else {
        "amd"
    }
}
