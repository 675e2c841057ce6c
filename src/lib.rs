//! Arch Linux installer: a live-environment bootstrap (`arch-installer`) and
//! the configurator it runs inside the new root (`arch-configure`).

pub mod config;
pub mod configure;
pub mod cpu;
pub mod error;
pub mod host;
pub mod install;
pub mod logging;
pub mod lsblk;
pub mod pipeline;
pub mod prompt;
pub mod steps;
pub mod ui;
