//! Live-environment side: everything from preflight checks to handing the
//! new root over to the configurator inside `arch-chroot`.

use std::path::{Path, PathBuf};

use crate::{
    config::CONFIG_FILE,
    error::{InstallerError, Result},
    host::Host,
    pipeline::{self, Step},
    prompt::Prompter,
    steps::{self, encrypt::Volumes, partition::DiskPlan},
    ui,
};

pub const TARGET_ROOT: &str = "/mnt";
pub const PACMAN_CONF: &str = "/etc/pacman.conf";
/// Where the configurator binary lands inside the new root.
pub const CONFIGURE_BINARY: &str = "/usr/local/bin/arch-configure";
const CONFIGURE_BINARY_NAME: &str = "arch-configure";

/// Files and directories the installer reads from or writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPaths {
    pub target_root: PathBuf,
    pub config_file: PathBuf,
    /// The configurator binary as shipped in the live environment.
    pub configure_binary: PathBuf,
    pub pacman_conf: PathBuf,
}

impl InstallPaths {
    /// Paths on the live image. The configurator is expected next to the
    /// running installer binary.
    pub fn live() -> Result<Self> {
        let configure_binary = std::env::current_exe()?.with_file_name(CONFIGURE_BINARY_NAME);
        Ok(Self {
            target_root: PathBuf::from(TARGET_ROOT),
            config_file: PathBuf::from(CONFIG_FILE),
            configure_binary,
            pacman_conf: PathBuf::from(PACMAN_CONF),
        })
    }

    /// Maps an absolute path of the new system to where it currently lives
    /// under the target root (`/etc/fstab` → `/mnt/etc/fstab`).
    pub fn in_target(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        self.target_root
            .join(path.strip_prefix("/").unwrap_or(path))
    }
}

pub struct InstallContext<'a> {
    pub host: &'a mut dyn Host,
    pub input: &'a mut dyn Prompter,
    pub paths: InstallPaths,
    /// Set by the partitioning step.
    pub plan: Option<DiskPlan>,
    /// Set by the encryption step: what gets formatted and mounted.
    pub volumes: Option<Volumes>,
}

impl<'a> InstallContext<'a> {
    pub fn new(host: &'a mut dyn Host, input: &'a mut dyn Prompter, paths: InstallPaths) -> Self {
        Self {
            host,
            input,
            paths,
            plan: None,
            volumes: None,
        }
    }

    pub fn plan(&self) -> Result<&DiskPlan> {
        self.plan
            .as_ref()
            .ok_or(InstallerError::MissingState("disk plan"))
    }

    pub fn volumes(&self) -> Result<&Volumes> {
        self.volumes
            .as_ref()
            .ok_or(InstallerError::MissingState("formatted volumes"))
    }
}

/// The installer, in execution order.
pub fn install_steps<'a>() -> Vec<Step<InstallContext<'a>>> {
    vec![
        Step::new("Preflight checks", steps::preflight::run),
        Step::new("System clock", steps::clock::run),
        Step::new("Disk partitioning", steps::partition::run),
        Step::new("Encryption", steps::encrypt::run),
        Step::new("Formatting", steps::format::run),
        Step::new("Mounting partitions", steps::mount::run),
        Step::new("Base system installation", steps::packages::run),
        Step::new("Filesystem table", steps::fstab::run),
        Step::new("Staging configurator", steps::chroot::stage),
        Step::new("Chroot configuration", steps::chroot::run),
        Step::new("Cleanup", steps::chroot::cleanup),
    ]
}

pub fn run_installer(ctx: &mut InstallContext) -> Result<()> {
    pipeline::run(&install_steps(), ctx)?;

    println!();
    ui::print_success("Installation complete.");
    ui::print_info("Unmount and reboot when you are ready:");
    ui::print_info(&format!("  umount -R {} && reboot", ctx.paths.target_root.display()));
    println!();
    Ok(())
}
