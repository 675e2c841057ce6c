use crate::{error::Result, install::InstallContext, ui};

/// Writes `/mnt/etc/fstab` from `genfstab`, addressing filesystems by UUID.
///
/// Equivalent to: `genfstab -U /mnt > /mnt/etc/fstab`
pub fn run(ctx: &mut InstallContext) -> Result<()> {
    let etc = ctx.paths.in_target("/etc");
    let fstab = ctx.paths.in_target("/etc/fstab");
    let root = ctx.paths.target_root.to_string_lossy().into_owned();

    // Normally created by pacstrap.
    ctx.host.create_dir_all(&etc)?;

    let content = ctx.host.capture("genfstab", &["-U", &root])?;
    ctx.host.write(&fstab, &content)?;
    ui::print_success(&format!("fstab written to {}.", fstab.display()));
    Ok(())
}
