use console::style;
use tracing::info;

use crate::{
    error::{InstallerError, Result},
    install::InstallContext,
    lsblk::{self, partition_path, Device},
    prompt::{self, Prompter},
    steps::unmount,
    ui,
};

pub const BOOT_SIZE: &str = "+512M";

// fdisk GPT partition type aliases.
const TYPE_EFI_SYSTEM: &str = "1";
const TYPE_LINUX_ROOT_X86_64: &str = "20";
const TYPE_LINUX_HOME: &str = "41";

const ROOT_SIZE_PROMPT: &str = "Size of the root partition (forward to fdisk)?";
const HOME_SIZE_PROMPT: &str = "Size of the home partition (forward to fdisk)?";

/// The operator's partitioning choices for one disk.
///
/// Fixed layout: 1 = EFI boot, 2 = root, 3 = optional home.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskPlan {
    pub disk: Device,
    pub separate_home: bool,
    pub encrypt_root: bool,
    pub encrypt_home: bool,
    /// Passed to fdisk verbatim; empty means "up to the end of the disk".
    pub root_size: String,
    /// Set exactly when `separate_home` is.
    pub home_size: Option<String>,
}

impl DiskPlan {
    pub fn boot_partition(&self) -> String {
        partition_path(&self.disk.path, 1)
    }

    pub fn root_partition(&self) -> String {
        partition_path(&self.disk.path, 2)
    }

    pub fn home_partition(&self) -> Option<String> {
        self.separate_home
            .then(|| partition_path(&self.disk.path, 3))
    }

    pub fn has_encrypted_partition(&self) -> bool {
        self.encrypt_root || self.encrypt_home
    }

    /// Keystrokes fed to `fdisk`, one answer per line. Empty answers accept
    /// fdisk's default (first free sector, or last sector for an empty size).
    pub fn fdisk_script(&self) -> String {
        let mut keys: Vec<&str> = vec![
            "g",
            "n", "1", "", BOOT_SIZE,
            "t", TYPE_EFI_SYSTEM,
            "n", "2", "", self.root_size.as_str(),
            "t", "2", TYPE_LINUX_ROOT_X86_64,
        ];
        if let Some(home_size) = self.home_size.as_deref() {
            keys.extend(["n", "3", "", home_size, "t", "3", TYPE_LINUX_HOME]);
        }
        keys.push("w");

        let mut script = keys.join("\n");
        script.push('\n');
        script
    }
}

/// Asks which disk to use and how to lay it out. Nothing is touched yet.
pub fn ask_plan(input: &mut dyn Prompter, devices: Vec<Device>) -> Result<DiskPlan> {
    let options: Vec<(String, Device)> = devices
        .into_iter()
        .filter(Device::is_disk)
        .map(|d| (d.label(), d))
        .collect();

    if options.is_empty() {
        return Err(InstallerError::NoDisks);
    }

    let disk = prompt::select(input, &options, "disk", None)?;
    let separate_home = prompt::ask_yes_no(input, "Separated home partition from root one?")?;
    let encrypt_root = prompt::ask_yes_no(input, "Should the root partition be encrypted?")?;
    let encrypt_home = if separate_home {
        prompt::ask_yes_no(input, "Should the home partition be encrypted?")?
    } else {
        false
    };

    let mut root_size = prompt::ask_text(input, ROOT_SIZE_PROMPT)?;
    let home_size = if separate_home {
        while root_size.is_empty() {
            ui::print_warning(
                "Root partition can't take the whole disk if you want a separated home partition",
            );
            root_size = prompt::ask_text(input, ROOT_SIZE_PROMPT)?;
        }
        Some(prompt::ask_text(input, HOME_SIZE_PROMPT)?)
    } else {
        None
    };

    Ok(DiskPlan {
        disk,
        separate_home,
        encrypt_root,
        encrypt_home,
        root_size,
        home_size,
    })
}

/// Picks a disk, clears its mounts and writes a fresh GPT layout with fdisk.
pub fn run(ctx: &mut InstallContext) -> Result<()> {
    println!("{}", lsblk::table(ctx.host)?);
    let devices = lsblk::list_devices(ctx.host)?;
    let plan = ask_plan(ctx.input, devices)?;

    println!();
    print_plan(&plan);
    println!();
    println!(
        "  {}",
        style(format!(
            "⚠  ALL DATA ON {} WILL BE PERMANENTLY ERASED.",
            plan.disk.path
        ))
        .red()
        .bold()
    );
    println!();

    if !prompt::ask_yes_no(ctx.input, "Write this partition table?")? {
        return Err(InstallerError::Cancelled);
    }

    unmount::run(ctx.host, &plan.disk)?;

    ctx.host
        .run_with_input("fdisk", &[&plan.disk.path], &plan.fdisk_script())?;

    info!(
        disk = %plan.disk.path,
        separate_home = plan.separate_home,
        encrypt_root = plan.encrypt_root,
        encrypt_home = plan.encrypt_home,
        "disk partitioned"
    );
    ui::print_success(&format!("{} partitioned.", plan.disk.path));

    ctx.plan = Some(plan);
    Ok(())
}

fn describe(partition: &str, size: &str, fs: &str, encrypted: bool) -> String {
    let size = if size.is_empty() { "rest of disk" } else { size };
    let luks = if encrypted { " + LUKS" } else { "" };
    format!("{}  {}  {}{}", partition, size, fs, luks)
}

fn print_plan(plan: &DiskPlan) {
    let boot = describe(&plan.boot_partition(), BOOT_SIZE, "FAT32", false);
    let root = describe(&plan.root_partition(), &plan.root_size, "ext4", plan.encrypt_root);
    let home = plan.home_partition().map(|p| {
        describe(
            &p,
            plan.home_size.as_deref().unwrap_or_default(),
            "ext4",
            plan.encrypt_home,
        )
    });

    let mut rows = vec![
        ("Disk", plan.disk.path.as_str()),
        ("Boot", boot.as_str()),
        ("Root", root.as_str()),
    ];
    if let Some(ref home) = home {
        rows.push(("Home", home.as_str()));
    }
    ui::print_kv_box("Partition Layout", &rows);
}
