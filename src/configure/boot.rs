use std::path::Path;

use tracing::info;

use crate::{
    configure::ConfigureContext,
    cpu,
    error::Result,
    lsblk::{self, partition_path},
    steps::encrypt::{mapper_path, CRYPTROOT},
    ui,
};

const ENTRIES_DIR: &str = "/boot/loader/entries";
const ENTRY_FILE: &str = "/boot/loader/entries/arch.conf";
const LOADER_FILE: &str = "/boot/loader/loader.conf";

pub const LOADER_CONF: &str = "default arch.conf\ntimeout 5\nconsole-mode max\neditor no\n";

/// How the kernel finds the root filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootAddress {
    /// Plain partition, addressed by its GPT partition UUID.
    PartUuid(String),
    /// LUKS container, unlocked by the `encrypt` hook as `cryptroot`.
    Luks { uuid: String },
}

impl RootAddress {
    pub fn kernel_options(&self) -> String {
        match self {
            RootAddress::PartUuid(partuuid) => format!("root=PARTUUID={} rw", partuuid),
            RootAddress::Luks { uuid } => format!(
                "cryptdevice=UUID={}:{} root={} rw",
                uuid,
                CRYPTROOT,
                mapper_path(CRYPTROOT)
            ),
        }
    }
}

pub fn boot_entry(cpu_vendor: &str, root: &RootAddress) -> String {
    format!(
        "title Arch Linux\n\
         linux   /vmlinuz-linux\n\
         initrd  /{}-ucode.img\n\
         initrd  /initramfs-linux.img\n\
         options {}\n",
        cpu_vendor,
        root.kernel_options()
    )
}

/// Partition 2 is only addressed through LUKS when it really carries a LUKS
/// header; the flag alone also covers an encrypted home.
fn root_address(ctx: &mut ConfigureContext) -> Result<RootAddress> {
    let root = partition_path(&ctx.device.path, 2);

    if ctx.has_encrypted_partition && lsblk::is_luks(ctx.host, &root)? {
        let uuid = lsblk::blkid(ctx.host, "UUID", &root)?;
        Ok(RootAddress::Luks { uuid })
    } else {
        Ok(RootAddress::PartUuid(lsblk::blkid(ctx.host, "PARTUUID", &root)?))
    }
}

/// Installs systemd-boot and writes its loader and Arch entry.
pub fn configure_boot_loader(ctx: &mut ConfigureContext) -> Result<()> {
    let vendor = cpu::vendor(&*ctx.host)?;

    ctx.host.run("bootctl", &["install"])?;

    let root = root_address(ctx)?;
    info!(?root, vendor, "boot entry");

    ctx.host.create_dir_all(Path::new(ENTRIES_DIR))?;
    ctx.host
        .write(Path::new(ENTRY_FILE), &boot_entry(vendor, &root))?;
    ctx.host.write(Path::new(LOADER_FILE), LOADER_CONF)?;

    ui::print_success("systemd-boot configured.");
    Ok(())
}
