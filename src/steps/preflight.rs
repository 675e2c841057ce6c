use std::path::Path;

use tracing::info;

use crate::{
    error::{InstallerError, Result},
    install::InstallContext,
    ui,
};

const EFIVARS: &str = "/sys/firmware/efi/efivars";
const CONNECTIVITY_HOST: &str = "archlinux.org";
const CONNECTIVITY_PORT: u16 = 443;

/// Refuses to go on unless running as root, booted in UEFI mode and online.
pub fn run(ctx: &mut InstallContext) -> Result<()> {
    if !ctx.host.is_root() {
        return Err(InstallerError::NotRoot);
    }

    check_boot_mode(ctx)?;
    check_internet(ctx)?;
    Ok(())
}

/// systemd-boot needs UEFI, detected through `/sys/firmware/efi/efivars`.
///
/// In dry-run mode the path won't exist on most dev machines, so a UEFI
/// result is simulated and the full flow can be exercised.
fn check_boot_mode(ctx: &mut InstallContext) -> Result<()> {
    let is_uefi = ctx.host.is_dry_run() || ctx.host.exists(Path::new(EFIVARS));
    if !is_uefi {
        return Err(InstallerError::NotEfi);
    }

    ui::print_success("UEFI mode detected.");
    Ok(())
}

fn check_internet(ctx: &mut InstallContext) -> Result<()> {
    if !ctx.host.can_reach(CONNECTIVITY_HOST, CONNECTIVITY_PORT) {
        return Err(InstallerError::Offline);
    }

    info!(host = CONNECTIVITY_HOST, "internet reachable");
    ui::print_success(&format!("{} is reachable.", CONNECTIVITY_HOST));
    Ok(())
}
