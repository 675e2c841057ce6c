use serde::{Deserialize, Serialize};

use crate::{error::Result, host::Host};

const LUKS_TYPE: &str = "crypto_LUKS";

// ── Data types ────────────────────────────────────────────────────────────────

/// One node of the block-device tree reported by `lsblk --json`.
/// Only whole disks carry `children`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub name: String, // sda
    #[serde(rename = "type")]
    pub kind: String, // disk, part, crypt, ...
    pub path: String, // /dev/sda
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>, // 20G
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>, // SAMSUNG SSD 870
    #[serde(default)]
    pub mountpoints: Vec<Option<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Device>,
}

#[derive(Debug, Deserialize)]
struct LsblkOutput {
    blockdevices: Vec<Device>,
}

impl Device {
    pub fn is_disk(&self) -> bool {
        self.kind == "disk"
    }

    /// One-line label shown in the disk menu.
    pub fn label(&self) -> String {
        let model = self
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or("—");
        format!(
            "{:<12}  {:>8}   {}",
            self.path,
            self.size.as_deref().unwrap_or("?"),
            model
        )
    }

    /// Every mountpoint in this subtree, children before the node's own.
    pub fn mountpoints(&self) -> Vec<String> {
        let mut found = Vec::new();
        self.collect_mountpoints(&mut found);
        found
    }

    fn collect_mountpoints(&self, found: &mut Vec<String>) {
        for child in &self.children {
            child.collect_mountpoints(found);
        }
        found.extend(self.mountpoints.iter().flatten().cloned());
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Parses the output of `lsblk --json`.
pub fn parse(json: &str) -> serde_json::Result<Vec<Device>> {
    serde_json::from_str::<LsblkOutput>(json).map(|out| out.blockdevices)
}

/// Returns every block device with its partition/mapper tree.
pub fn list_devices(host: &mut dyn Host) -> Result<Vec<Device>> {
    let output = host.capture(
        "lsblk",
        &["--json", "--output", "NAME,PATH,TYPE,SIZE,MODEL,MOUNTPOINTS"],
    )?;
    Ok(parse(&output)?)
}

/// Human-readable table of the current layout, printed before the disk menu.
pub fn table(host: &mut dyn Host) -> Result<String> {
    host.capture(
        "lsblk",
        &["--output", "NAME,TYPE,FSAVAIL,SIZE,PATH,MOUNTPOINTS"],
    )
}

/// Reads one tag (`UUID`, `PARTUUID`, `TYPE`) of a block device via `blkid`.
pub fn blkid(host: &mut dyn Host, tag: &str, device: &str) -> Result<String> {
    let value = host.capture("blkid", &["-s", tag, "-o", "value", device])?;
    Ok(value.trim().to_string())
}

/// Whether `device` holds a LUKS header.
pub fn is_luks(host: &mut dyn Host, device: &str) -> Result<bool> {
    Ok(blkid(host, "TYPE", device)? == LUKS_TYPE)
}

/// Path of partition `number` on `disk`. Kernel naming puts a `p` between
/// the two when the disk name already ends in a digit (`nvme0n1p2`,
/// `mmcblk0p1`), and nothing otherwise (`sda2`).
pub fn partition_path(disk: &str, number: u32) -> String {
    let separator = if disk.ends_with(|c: char| c.is_ascii_digit()) {
        "p"
    } else {
        ""
    };
    format!("{}{}{}", disk, separator, number)
}
