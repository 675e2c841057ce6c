use std::path::Path;

use arch_installer::{
    config::Config,
    error::InstallerError,
    host::LiveHost,
    install::{self, InstallContext, InstallPaths},
    logging,
    prompt::TerminalPrompter,
    ui,
};
use tracing::{error, info};

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // The only supported flag.
    let dry_run = std::env::args().skip(1).any(|a| a == "--dry-run");

    logging::init(Path::new(logging::INSTALLER_LOG));

    if let Err(e) = ctrlc::set_handler(|| {
        println!();
        ui::print_warning("Script interrupted by keyboard.");
        std::process::exit(0);
    }) {
        error!(%e, "cannot install Ctrl-C handler");
    }

    if let Err(e) = run(dry_run) {
        error!(%e, "installation aborted");
        println!();
        ui::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}

fn run(dry_run: bool) -> Result<(), InstallerError> {
    // ── Welcome ───────────────────────────────────────────────────────────────
    ui::print_banner();

    if dry_run {
        ui::print_warning("DRY-RUN MODE — no disk will be touched, no command will run.");
    }

    // A broken config must stop us before the disk is wiped.
    let paths = InstallPaths::live()?;
    let config = Config::load(&paths.config_file)?;
    info!(dry_run, hostname = %config.hostname, profile = ?config.profile, "installer started");

    ui::print_info("This wizard will guide you through a full Arch Linux installation.");
    ui::print_info("You will be asked before the disk is erased.");

    let mut host = LiveHost::new(dry_run);
    let mut input = TerminalPrompter;
    let mut ctx = InstallContext::new(&mut host, &mut input, paths);

    install::run_installer(&mut ctx)
}
