use console::style;

use crate::{cpu, error::Result, install::InstallContext, ui};

/// Packages bootstrapped into the new root, besides the CPU microcode.
pub const BASE_PACKAGES: [&str; 11] = [
    "archlinux-keyring",
    "base",
    "base-devel",
    "git",
    "linux",
    "linux-firmware",
    "man-db",
    "man-pages",
    "neovim",
    "networkmanager",
    "python",
];

pub fn package_list(cpu_vendor: &str) -> Vec<String> {
    let mut packages: Vec<String> = BASE_PACKAGES.iter().map(|p| p.to_string()).collect();
    packages.push(format!("{}-ucode", cpu_vendor));
    packages
}

/// Installs the base system via `pacstrap`.
pub fn run(ctx: &mut InstallContext) -> Result<()> {
    let vendor = cpu::vendor(ctx.host)?;
    let packages = package_list(vendor);

    ui::print_info(&format!(
        "Installing {} packages (with {})…",
        packages.len(),
        style(format!("{}-ucode", vendor)).cyan().bold()
    ));
    println!();

    let root = ctx.paths.target_root.to_string_lossy().into_owned();
    let mut args = vec![root.as_str()];
    args.extend(packages.iter().map(String::as_str));

    // pacstrap shows download progress, keep it interactive.
    ctx.host.run("pacstrap", &args)?;

    ui::print_success("Base system installed.");
    Ok(())
}
