use std::path::Path;

use tracing::debug;

use crate::{
    error::Result,
    host::Host,
    lsblk::Device,
    steps::encrypt::{mapper_path, CRYPTHOME, CRYPTROOT},
};

/// Releases everything that holds `device` busy before it gets repartitioned.
///
/// All mountpoints of the tree are collected first, then drained from the
/// end with `umount -R`. A recursive unmount can take nested mountpoints
/// down with it, so an entry that is no longer mounted is simply dropped.
/// Mapper devices from a previous encrypted install are closed last.
pub fn run(host: &mut dyn Host, device: &Device) -> Result<()> {
    let mut pending = device.mountpoints();

    while let Some(mountpoint) = pending.pop() {
        if !host.is_mountpoint(Path::new(&mountpoint)) {
            debug!(%mountpoint, "already unmounted");
            continue;
        }
        host.run_with_spinner(
            "umount",
            &["-R", &mountpoint],
            &format!("Unmounting {}…", mountpoint),
            &format!("{} unmounted.", mountpoint),
        )?;
    }

    for name in [CRYPTROOT, CRYPTHOME] {
        let mapper = mapper_path(name);
        if host.exists(Path::new(&mapper)) {
            host.run_with_spinner(
                "cryptsetup",
                &["close", name],
                &format!("Closing {}…", mapper),
                &format!("{} closed.", mapper),
            )?;
        }
    }

    Ok(())
}
