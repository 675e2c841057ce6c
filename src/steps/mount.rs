use std::path::Path;

use crate::{error::Result, install::InstallContext};

/// Mounts the new filesystems into the installation tree.
///
/// Mount order:
///   1. Root → /mnt
///   2. Boot → /mnt/boot
///   3. Home → /mnt/home (optional)
///
/// Root goes first because the other two mountpoints live on it.
pub fn run(ctx: &mut InstallContext) -> Result<()> {
    let volumes = ctx.volumes()?.clone();
    let root = ctx.paths.target_root.clone();

    mount(ctx, &volumes.root, &root)?;

    let boot = ctx.paths.in_target("/boot");
    ctx.host.create_dir_all(&boot)?;
    mount(ctx, &volumes.boot, &boot)?;

    if let Some(ref home_volume) = volumes.home {
        let home = ctx.paths.in_target("/home");
        ctx.host.create_dir_all(&home)?;
        mount(ctx, home_volume, &home)?;
    }

    Ok(())
}

fn mount(ctx: &mut InstallContext, volume: &str, mountpoint: &Path) -> Result<()> {
    let target = mountpoint.to_string_lossy();
    ctx.host.run_with_spinner(
        "mount",
        &[volume, target.as_ref()],
        &format!("Mounting {} → {}…", volume, target),
        &format!("{} mounted at {}.", volume, target),
    )
}
