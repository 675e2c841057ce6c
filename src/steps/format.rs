use crate::{error::Result, install::InstallContext};

/// Creates the filesystems: FAT32 on the EFI partition, ext4 on root and home.
pub fn run(ctx: &mut InstallContext) -> Result<()> {
    let volumes = ctx.volumes()?.clone();

    format_ext4(ctx, &volumes.root, "root")?;

    ctx.host.run_with_spinner(
        "mkfs.fat",
        &["-F32", &volumes.boot],
        &format!("Formatting {} as FAT32…", volumes.boot),
        &format!("{} formatted as FAT32 (EFI).", volumes.boot),
    )?;

    if let Some(ref home) = volumes.home {
        format_ext4(ctx, home, "home")?;
    }

    Ok(())
}

// The disk was just repartitioned, so leftover signatures are forced over.
fn format_ext4(ctx: &mut InstallContext, volume: &str, role: &str) -> Result<()> {
    ctx.host.run_with_spinner(
        "mkfs.ext4",
        &["-F", volume],
        &format!("Formatting {} as ext4…", volume),
        &format!("{} formatted as ext4 ({}).", volume, role),
    )
}
