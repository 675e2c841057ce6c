use crate::{error::Result, install::InstallContext, ui};

/// Turns on NTP sync. A wrong clock makes package-signature checks fail.
pub fn run(ctx: &mut InstallContext) -> Result<()> {
    ui::print_info("An accurate clock prevents package-signature validation errors.");

    ctx.host.run_with_spinner(
        "timedatectl",
        &["set-ntp", "true"],
        "Enabling NTP time synchronization…",
        "System clock synchronized.",
    )
}
