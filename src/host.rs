//! Everything the installer does to the machine goes through [`Host`]:
//! external commands, mount-table and network probes, and file edits.
//!
//! [`LiveHost`] is the real thing. Commands fail fast: a non-zero exit
//! becomes [`InstallerError::CommandFailed`] and nothing is retried.

use std::{
    fs,
    io::{self, Write},
    net::TcpStream,
    os::unix::fs::PermissionsExt,
    path::Path,
    process::{Command, ExitStatus, Stdio},
};

use tracing::{debug, info, warn};

use crate::{
    error::{InstallerError, Result},
    ui,
};

const MOUNT_TABLE: &str = "/proc/self/mounts";

pub trait Host {
    /// Runs a command that **takes over the terminal** (stdin/stdout/stderr
    /// inherited). Use for interactive or chatty programs: `cryptsetup`,
    /// `pacstrap`, `arch-chroot`, `passwd`.
    fn run(&mut self, program: &str, args: &[&str]) -> Result<()>;

    /// Runs a command silently while displaying a spinner.
    fn run_with_spinner(
        &mut self,
        program: &str,
        args: &[&str],
        spin_msg: &str,
        done_msg: &str,
    ) -> Result<()>;

    /// Runs a command and returns its stdout.
    fn capture(&mut self, program: &str, args: &[&str]) -> Result<String>;

    /// Runs a command with `input` written to its stdin.
    fn run_with_input(&mut self, program: &str, args: &[&str], input: &str) -> Result<()>;

    fn is_mountpoint(&self, path: &Path) -> bool;
    fn exists(&self, path: &Path) -> bool;
    fn can_reach(&self, host: &str, port: u16) -> bool;
    fn is_root(&self) -> bool;

    fn is_dry_run(&self) -> bool {
        false
    }

    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn write(&mut self, path: &Path, contents: &str) -> Result<()>;
    fn create_dir_all(&mut self, path: &Path) -> Result<()>;
    fn copy(&mut self, from: &Path, to: &Path) -> Result<()>;
    fn remove_file(&mut self, path: &Path) -> Result<()>;
    fn remove_dir(&mut self, path: &Path) -> Result<()>;

    /// Points `link` at `target`, replacing whatever `link` was before.
    fn symlink(&mut self, target: &Path, link: &Path) -> Result<()>;

    fn mode(&self, path: &Path) -> Result<u32>;
    fn set_mode(&mut self, path: &Path, mode: u32) -> Result<()>;
}

/// Joins a program and its arguments the way a shell user would type them.
pub fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn not_found_or_io(program: &str, err: io::Error) -> InstallerError {
    if err.kind() == io::ErrorKind::NotFound {
        InstallerError::CommandNotFound(program.to_string())
    } else {
        InstallerError::Io(err)
    }
}

fn check_status(program: &str, status: ExitStatus) -> Result<()> {
    if status.success() {
        return Ok(());
    }
    let code = status.code().unwrap_or(-1);
    warn!(program, code, "command failed");
    Err(InstallerError::CommandFailed(program.to_string(), code))
}

fn print_captured_output(stdout: &[u8], stderr: &[u8]) {
    let out = String::from_utf8_lossy(stdout);
    let err = String::from_utf8_lossy(stderr);
    if !out.trim().is_empty() {
        eprintln!("{}", out.trim());
    }
    if !err.trim().is_empty() {
        eprintln!("{}", err.trim());
    }
}

/// Decodes the octal escapes (`\040` for a space, ...) used by the kernel in
/// `/proc/self/mounts`.
fn decode_mount_field(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() {
            let digits = std::str::from_utf8(&bytes[i + 1..i + 4]).ok();
            if let Some(value) = digits.and_then(|d| u8::from_str_radix(d, 8).ok()) {
                out.push(value);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Whether `path` is the mount target of any line of a mount table.
pub fn mount_table_contains(table: &str, path: &Path) -> bool {
    table
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .any(|target| Path::new(&decode_mount_field(target)) == path)
}

// ── Live implementation ───────────────────────────────────────────────────────

/// Acts on the real machine. With `dry_run` set, every mutating action is
/// echoed and logged but skipped; read-only queries still run.
#[derive(Debug, Default)]
pub struct LiveHost {
    dry_run: bool,
}

impl LiveHost {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Returns `true` when the action must be skipped.
    fn skip(&self, action: &str) -> bool {
        if self.dry_run {
            ui::print_command(action, true);
            info!(action, "skipped (dry run)");
        }
        self.dry_run
    }
}

impl Host for LiveHost {
    fn run(&mut self, program: &str, args: &[&str]) -> Result<()> {
        let line = command_line(program, args);
        if self.skip(&line) {
            return Ok(());
        }
        ui::print_command(&line, false);
        info!(command = %line, "running");

        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|e| not_found_or_io(program, e))?;
        check_status(program, status)
    }

    fn run_with_spinner(
        &mut self,
        program: &str,
        args: &[&str],
        spin_msg: &str,
        done_msg: &str,
    ) -> Result<()> {
        let line = command_line(program, args);
        if self.skip(&line) {
            ui::print_success(done_msg);
            return Ok(());
        }
        info!(command = %line, "running");

        let pb = ui::spinner(spin_msg);
        let output = match Command::new(program)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
        {
            Ok(output) if output.status.success() => output,
            Ok(output) => {
                pb.finish_and_clear();
                print_captured_output(&output.stdout, &output.stderr);
                return check_status(program, output.status);
            }
            Err(err) => {
                pb.finish_and_clear();
                return Err(not_found_or_io(program, err));
            }
        };

        debug!(program, bytes = output.stdout.len(), "command succeeded");
        ui::done_spinner(pb, done_msg);
        Ok(())
    }

    fn capture(&mut self, program: &str, args: &[&str]) -> Result<String> {
        let line = command_line(program, args);
        ui::print_command(&line, false);
        debug!(command = %line, "capturing");

        let output = Command::new(program)
            .args(args)
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| not_found_or_io(program, e))?;
        check_status(program, output.status)?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn run_with_input(&mut self, program: &str, args: &[&str], input: &str) -> Result<()> {
        let line = command_line(program, args);
        if self.skip(&line) {
            return Ok(());
        }
        ui::print_command(&line, false);
        info!(command = %line, "running with scripted input");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| not_found_or_io(program, e))?;

        // The pipe closes when stdin drops. A child that exits early breaks
        // the pipe, so its exit status is checked before the write result.
        let written = child
            .stdin
            .take()
            .map(|mut stdin| stdin.write_all(input.as_bytes()))
            .transpose();

        let status = child.wait()?;
        check_status(program, status)?;

        if let Err(err) = written {
            warn!(program, %err, "scripted input was not fully written");
            return Err(err.into());
        }
        Ok(())
    }

    fn is_mountpoint(&self, path: &Path) -> bool {
        fs::read_to_string(MOUNT_TABLE)
            .map(|table| mount_table_contains(&table, path))
            .unwrap_or(false)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn can_reach(&self, host: &str, port: u16) -> bool {
        match TcpStream::connect((host, port)) {
            Ok(_) => true,
            Err(err) => {
                warn!(host, port, %err, "connection failed");
                false
            }
        }
    }

    /// Checks that the process is running as root (UID 0).
    /// Always true in dry-run mode.
    fn is_root(&self) -> bool {
        if self.dry_run {
            return true;
        }

        fs::read_to_string("/proc/self/status")
            .ok()
            .and_then(|s| {
                s.lines()
                    .find(|l| l.starts_with("Uid:"))
                    .and_then(|l| l.split_whitespace().nth(1))
                    .and_then(|v| v.parse::<u32>().ok())
            })
            .map(|uid| uid == 0)
            .unwrap_or(false)
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path)?)
    }

    fn write(&mut self, path: &Path, contents: &str) -> Result<()> {
        if self.skip(&format!("write {}", path.display())) {
            return Ok(());
        }
        debug!(path = %path.display(), bytes = contents.len(), "writing file");
        Ok(fs::write(path, contents)?)
    }

    fn create_dir_all(&mut self, path: &Path) -> Result<()> {
        if self.skip(&format!("mkdir -p {}", path.display())) {
            return Ok(());
        }
        Ok(fs::create_dir_all(path)?)
    }

    fn copy(&mut self, from: &Path, to: &Path) -> Result<()> {
        if self.skip(&format!("cp {} {}", from.display(), to.display())) {
            return Ok(());
        }
        debug!(from = %from.display(), to = %to.display(), "copying file");
        fs::copy(from, to)?;
        Ok(())
    }

    fn remove_file(&mut self, path: &Path) -> Result<()> {
        if self.skip(&format!("rm {}", path.display())) {
            return Ok(());
        }
        Ok(fs::remove_file(path)?)
    }

    fn remove_dir(&mut self, path: &Path) -> Result<()> {
        if self.skip(&format!("rmdir {}", path.display())) {
            return Ok(());
        }
        Ok(fs::remove_dir(path)?)
    }

    fn symlink(&mut self, target: &Path, link: &Path) -> Result<()> {
        if self.skip(&format!("ln -sf {} {}", target.display(), link.display())) {
            return Ok(());
        }
        if fs::symlink_metadata(link).is_ok() {
            fs::remove_file(link)?;
        }
        Ok(std::os::unix::fs::symlink(target, link)?)
    }

    fn mode(&self, path: &Path) -> Result<u32> {
        Ok(fs::metadata(path)?.permissions().mode())
    }

    fn set_mode(&mut self, path: &Path, mode: u32) -> Result<()> {
        if self.skip(&format!("chmod {:o} {}", mode & 0o7777, path.display())) {
            return Ok(());
        }
        Ok(fs::set_permissions(path, fs::Permissions::from_mode(mode))?)
    }
}
