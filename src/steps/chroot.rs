use std::path::PathBuf;

use tracing::info;

use crate::{
    config::{CONFIG_DIR, CONFIG_FILE},
    error::Result,
    install::{InstallContext, InstallPaths, CONFIGURE_BINARY, PACMAN_CONF},
    ui,
};

/// A live-environment file copied into the new root for the chroot stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub source: PathBuf,
    pub target: PathBuf,
    /// Left in place after the chroot stage.
    pub keep: bool,
}

/// The chroot cannot see the live environment, so the configurator and its
/// inputs are copied in first.
pub fn staged_files(paths: &InstallPaths) -> Vec<StagedFile> {
    vec![
        StagedFile {
            source: paths.configure_binary.clone(),
            target: paths.in_target(CONFIGURE_BINARY),
            keep: false,
        },
        StagedFile {
            source: paths.config_file.clone(),
            target: paths.in_target(CONFIG_FILE),
            keep: false,
        },
        StagedFile {
            source: paths.pacman_conf.clone(),
            target: paths.in_target(PACMAN_CONF),
            keep: true,
        },
    ]
}

/// Arguments handed to the configurator: the disk as JSON and whether any
/// partition was encrypted.
pub fn configurator_args(device_json: &str, has_encrypted_partition: bool) -> [&str; 2] {
    let flag = if has_encrypted_partition { "True" } else { "False" };
    [device_json, flag]
}

pub fn stage(ctx: &mut InstallContext) -> Result<()> {
    ctx.host.create_dir_all(&ctx.paths.in_target(CONFIG_DIR))?;

    for file in staged_files(&ctx.paths) {
        if let Some(parent) = file.target.parent() {
            ctx.host.create_dir_all(parent)?;
        }
        ctx.host.copy(&file.source, &file.target)?;
        info!(from = %file.source.display(), to = %file.target.display(), "staged");
    }

    ui::print_success("Configurator staged into the new system.");
    Ok(())
}

/// Runs the configurator inside the new system via `arch-chroot`.
pub fn run(ctx: &mut InstallContext) -> Result<()> {
    let plan = ctx.plan()?.clone();
    let device_json = serde_json::to_string(&plan.disk)?;
    let root = ctx.paths.target_root.to_string_lossy().into_owned();

    ctx.host.run_with_spinner(
        "pacman",
        &["-Sy"],
        "Refreshing package databases…",
        "Package databases refreshed.",
    )?;

    println!();
    ui::print_info("Entering chroot…");
    ui::print_rule();
    println!();

    let [device_arg, flag] = configurator_args(&device_json, plan.has_encrypted_partition());
    // arch-chroot is fully interactive: hand over the terminal.
    ctx.host
        .run("arch-chroot", &[root.as_str(), CONFIGURE_BINARY, device_arg, flag])?;

    println!();
    ui::print_rule();
    ui::print_success("Exited chroot.");
    Ok(())
}

/// Removes the staged copies that must not stay in the installed system.
pub fn cleanup(ctx: &mut InstallContext) -> Result<()> {
    for file in staged_files(&ctx.paths).into_iter().filter(|f| !f.keep) {
        ctx.host.remove_file(&file.target)?;
    }

    let data_dir = ctx.paths.in_target(CONFIG_DIR);
    if ctx.host.exists(&data_dir) {
        ctx.host.remove_dir(&data_dir)?;
    }

    ui::print_success("Staged files removed.");
    Ok(())
}
