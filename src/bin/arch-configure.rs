//! Runs inside `arch-chroot`, staged there by `arch-installer`.

use std::path::Path;

use arch_installer::{
    config::{Config, CONFIG_FILE},
    configure::{self, ConfigureContext},
    error::InstallerError,
    host::LiveHost,
    logging,
    lsblk::Device,
    ui,
};
use tracing::{error, info};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let (device, has_encrypted_partition) = match configure::parse_args(&args) {
        Ok(parsed) => parsed,
        Err(InstallerError::Usage(usage)) => {
            ui::print_error(&usage);
            std::process::exit(1);
        }
        Err(e) => {
            ui::print_error(&format!("Invalid device argument: {}", e));
            std::process::exit(1);
        }
    };

    logging::init(Path::new(logging::CONFIGURE_LOG));
    info!(device = %device.path, has_encrypted_partition, "configurator started");

    if let Err(e) = run(device, has_encrypted_partition) {
        error!(%e, "configuration aborted");
        println!();
        ui::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}

fn run(device: Device, has_encrypted_partition: bool) -> Result<(), InstallerError> {
    let config = Config::load(Path::new(CONFIG_FILE))?;

    let mut host = LiveHost::new(false);
    let mut ctx = ConfigureContext {
        host: &mut host,
        config,
        device,
        has_encrypted_partition,
    };

    configure::run_configurator(&mut ctx)
}
