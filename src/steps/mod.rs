pub mod chroot;
pub mod clock;
pub mod encrypt;
pub mod format;
pub mod fstab;
pub mod mount;
pub mod packages;
pub mod partition;
pub mod preflight;
pub mod unmount;
