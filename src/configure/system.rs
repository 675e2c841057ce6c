use std::path::Path;

use tracing::info;

use crate::{
    config::Profile,
    configure::ConfigureContext,
    error::Result,
    lsblk::{self, partition_path},
    steps::encrypt::CRYPTHOME,
    ui,
};

const ZONEINFO: &str = "/usr/share/zoneinfo";
const LOCALTIME: &str = "/etc/localtime";
const LOCALE_CONF: &str = "/etc/locale.conf";
const LOCALE_GEN: &str = "/etc/locale.gen";
const HOSTNAME: &str = "/etc/hostname";
const HOSTS: &str = "/etc/hosts";
const CRYPTTAB: &str = "/etc/crypttab";
const MKINITCPIO_CONF: &str = "/etc/mkinitcpio.conf";

pub const ENCRYPT_HOOKS: &str =
    "HOOKS=(base udev autodetect modconf block keyboard encrypt filesystems fsck)";

pub fn hosts_file(hostname: &str) -> String {
    format!(
        "127.0.0.1   localhost\n::1     localhost\n127.0.1.1   {0}.localdomain {0}\n",
        hostname
    )
}

/// Replaces every active `HOOKS=(...)` line with the encryption-aware list.
pub fn rewrite_hooks(mkinitcpio_conf: &str) -> String {
    let mut out: String = mkinitcpio_conf
        .lines()
        .map(|line| {
            if line.starts_with("HOOKS=(") {
                ENCRYPT_HOOKS
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    if mkinitcpio_conf.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Adds (or replaces) the crypttab line for mapper `name`.
pub fn crypttab_with_entry(crypttab: &str, name: &str, uuid: &str) -> String {
    let mut out = String::new();
    for line in crypttab
        .lines()
        .filter(|line| line.split_whitespace().next() != Some(name))
    {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&format!("{} UUID={} none luks\n", name, uuid));
    out
}

pub fn set_timezone(ctx: &mut ConfigureContext) -> Result<()> {
    let zone = Path::new(ZONEINFO).join(&ctx.config.timezone);
    ctx.host.symlink(&zone, Path::new(LOCALTIME))?;

    ctx.host.run_with_spinner(
        "hwclock",
        &["--systohc"],
        "Syncing hardware clock…",
        &format!("Timezone set to {}.", ctx.config.timezone),
    )
}

pub fn set_locale(ctx: &mut ConfigureContext) -> Result<()> {
    ctx.host
        .write(Path::new(LOCALE_CONF), &format!("LANG={}\n", ctx.config.lang))?;

    let mut locale_gen = ctx.config.locale_gen.join("\n");
    locale_gen.push('\n');
    ctx.host.write(Path::new(LOCALE_GEN), &locale_gen)?;

    ctx.host.run_with_spinner(
        "locale-gen",
        &[],
        "Generating locales…",
        &format!("{} locale(s) generated.", ctx.config.locale_gen.len()),
    )
}

pub fn setup_network(ctx: &mut ConfigureContext) -> Result<()> {
    let hostname = ctx.config.hostname.clone();

    ctx.host
        .write(Path::new(HOSTNAME), &format!("{}\n", hostname))?;
    ctx.host.write(Path::new(HOSTS), &hosts_file(&hostname))?;
    ui::print_success(&format!("Hostname set to {}.", hostname));

    if ctx.config.profile == Profile::Desktop {
        ctx.host.run_with_spinner(
            "systemctl",
            &["enable", "NetworkManager.service"],
            "Enabling NetworkManager…",
            "NetworkManager enabled.",
        )?;
    }
    Ok(())
}

/// Makes an encrypted home partition unlock at boot.
pub fn setup_crypttab(ctx: &mut ConfigureContext) -> Result<()> {
    let home = partition_path(&ctx.device.path, 3);
    if !ctx.host.exists(Path::new(&home)) || !lsblk::is_luks(ctx.host, &home)? {
        ui::print_info("No encrypted home partition.");
        return Ok(());
    }

    let uuid = lsblk::blkid(ctx.host, "UUID", &home)?;
    let crypttab = Path::new(CRYPTTAB);
    let current = if ctx.host.exists(crypttab) {
        ctx.host.read_to_string(crypttab)?
    } else {
        String::new()
    };
    ctx.host
        .write(crypttab, &crypttab_with_entry(&current, CRYPTHOME, &uuid))?;

    info!(partition = %home, %uuid, "encrypted home added to crypttab");
    ui::print_success(&format!("{} will be unlocked at boot.", home));
    Ok(())
}

pub fn set_mkinitcpio_hooks(ctx: &mut ConfigureContext) -> Result<()> {
    let conf = Path::new(MKINITCPIO_CONF);
    let current = ctx.host.read_to_string(conf)?;
    ctx.host.write(conf, &rewrite_hooks(&current))?;

    ui::print_success("mkinitcpio hooks include encrypt.");
    Ok(())
}

pub fn generate_initramfs(ctx: &mut ConfigureContext) -> Result<()> {
    ctx.host.run("mkinitcpio", &["-P"])
}

pub fn set_root_password(ctx: &mut ConfigureContext) -> Result<()> {
    ui::print_info("Choose the root password.");
    ctx.host.run("passwd", &[])
}
