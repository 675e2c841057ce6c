//! In-chroot side: turns the freshly bootstrapped root into a bootable,
//! configured system. Runs as `arch-configure <device-json> <True|False>`.

pub mod boot;
pub mod system;
pub mod user;

use crate::{
    config::{Config, Profile},
    error::{InstallerError, Result},
    host::Host,
    lsblk::Device,
    pipeline::{self, Step},
    ui,
};

pub const USAGE: &str = "Script takes 2 arguments (device, has_encrypted_partition).";

pub struct ConfigureContext<'a> {
    pub host: &'a mut dyn Host,
    pub config: Config,
    /// The install disk as the live environment saw it.
    pub device: Device,
    pub has_encrypted_partition: bool,
}

impl ConfigureContext<'_> {
    /// The account created by the desktop profile.
    pub fn username(&self) -> Result<String> {
        self.config
            .desktop_user()
            .map(str::to_string)
            .ok_or(InstallerError::MissingState("username"))
    }
}

/// `True`, `true`, ... mean yes; anything else means no.
pub fn parse_flag(raw: &str) -> bool {
    raw.eq_ignore_ascii_case("true")
}

/// Parses the two positional arguments (program name excluded).
pub fn parse_args(args: &[String]) -> Result<(Device, bool)> {
    let [device, flag] = args else {
        return Err(InstallerError::Usage(USAGE.to_string()));
    };
    Ok((serde_json::from_str(device)?, parse_flag(flag)))
}

/// The configuration steps this config and disk call for, in order.
pub fn configure_steps<'a>(
    config: &Config,
    has_encrypted_partition: bool,
) -> Vec<Step<ConfigureContext<'a>>> {
    let mut steps = vec![
        Step::new("Timezone", system::set_timezone),
        Step::new("Locale", system::set_locale),
        Step::new("Network", system::setup_network),
    ];

    if has_encrypted_partition {
        steps.push(Step::new("Encrypted volumes", system::setup_crypttab));
        steps.push(Step::new("Initramfs hooks", system::set_mkinitcpio_hooks));
    }
    steps.push(Step::new("Initramfs", system::generate_initramfs));

    if config.profile == Profile::Desktop {
        steps.push(Step::new("Sudo access", user::setup_sudo));
    }
    if config.desktop_user().is_some() {
        steps.push(Step::new("Skeleton directories", user::create_skeleton));
        steps.push(Step::new("User account", user::create_user));
        steps.push(Step::new("AUR helper", user::install_aur_helper));
    }
    if config.dotfiles_to_install().is_some() {
        steps.push(Step::new("Dotfile manager", user::install_dotfile_manager));
        steps.push(Step::new("Dotfiles", user::install_dotfiles));
    }

    steps.push(Step::new("Root password", system::set_root_password));
    steps.push(Step::new("Boot loader", boot::configure_boot_loader));
    steps
}

pub fn run_configurator(ctx: &mut ConfigureContext) -> Result<()> {
    let steps = configure_steps(&ctx.config, ctx.has_encrypted_partition);
    pipeline::run(&steps, ctx)?;

    println!();
    ui::print_success("System configured.");
    Ok(())
}
