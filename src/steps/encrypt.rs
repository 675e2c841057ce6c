use tracing::info;

use crate::{error::Result, host::Host, install::InstallContext, ui};

pub const CRYPTROOT: &str = "cryptroot";
pub const CRYPTHOME: &str = "crypthome";

pub fn mapper_path(name: &str) -> String {
    format!("/dev/mapper/{}", name)
}

/// Block devices that receive the filesystems: raw partitions, or the
/// mapper devices in front of them when encrypted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volumes {
    pub boot: String,
    pub root: String,
    pub home: Option<String>,
}

/// LUKS-formats `partition`, opens it as `name` and returns the mapper
/// device to use instead. Passphrases are typed straight into cryptsetup.
pub fn encrypt(host: &mut dyn Host, partition: &str, name: &str) -> Result<String> {
    ui::print_info(&format!("Encrypting {} — cryptsetup will ask for a passphrase.", partition));

    host.run("cryptsetup", &["luksFormat", partition])?;
    host.run("cryptsetup", &["open", partition, name])?;

    let mapped = mapper_path(name);
    info!(partition, mapped = %mapped, "encrypted volume opened");
    ui::print_success(&format!("{} opened as {}.", partition, mapped));
    Ok(mapped)
}

pub fn run(ctx: &mut InstallContext) -> Result<()> {
    let plan = ctx.plan()?.clone();

    let root = if plan.encrypt_root {
        encrypt(ctx.host, &plan.root_partition(), CRYPTROOT)?
    } else {
        plan.root_partition()
    };

    let home = match plan.home_partition() {
        Some(partition) if plan.encrypt_home => Some(encrypt(ctx.host, &partition, CRYPTHOME)?),
        other => other,
    };

    if !plan.has_encrypted_partition() {
        ui::print_info("No partition to encrypt.");
    }

    ctx.volumes = Some(Volumes {
        boot: plan.boot_partition(),
        root,
        home,
    });
    Ok(())
}
