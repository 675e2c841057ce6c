//! Shared fakes for the integration tests: a recording [`FakeHost`] and a
//! scripted [`Prompter`].
#![allow(dead_code)]

use std::{
    collections::{BTreeMap, BTreeSet, HashMap, VecDeque},
    io,
    path::{Path, PathBuf},
};

use arch_installer::{
    error::{InstallerError, Result},
    host::{command_line, Host},
    install::{InstallPaths, CONFIGURE_BINARY, PACMAN_CONF},
    lsblk::Device,
    prompt::Prompter,
};

pub const LSBLK_JSON: &str = "lsblk --json --output NAME,PATH,TYPE,SIZE,MODEL,MOUNTPOINTS";
pub const LSBLK_TABLE: &str = "lsblk --output NAME,TYPE,FSAVAIL,SIZE,PATH,MOUNTPOINTS";
pub const INTEL_CPUINFO: &str = "processor\t: 0\nmodel name\t: Intel(R) Core(TM) i5-8250U CPU @ 1.60GHz\n";

/// In-memory machine. Commands are recorded instead of run; a few of them
/// (`mount`, `umount -R`, `cryptsetup open/close`) update the fake state.
#[derive(Debug, Default)]
pub struct FakeHost {
    pub commands: Vec<String>,
    /// stdin fed to commands run with scripted input, keyed by command line.
    pub inputs: Vec<(String, String)>,
    /// stdout returned by `capture`, keyed by command line.
    pub outputs: HashMap<String, String>,
    /// Every write, in order, including files removed since.
    pub writes: Vec<(PathBuf, String)>,
    pub files: BTreeMap<PathBuf, String>,
    pub modes: BTreeMap<PathBuf, u32>,
    pub symlinks: BTreeMap<PathBuf, PathBuf>,
    pub dirs: BTreeSet<PathBuf>,
    pub mounted: BTreeSet<PathBuf>,
    /// Paths that exist without being files or dirs (devices, efivars).
    pub existing: BTreeSet<PathBuf>,
    pub read_only: BTreeSet<PathBuf>,
    /// Program whose invocations exit with status 1.
    pub fail_program: Option<String>,
    pub offline: bool,
    pub non_root: bool,
    pub dry_run: bool,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, contents: &str) -> Self {
        self.files.insert(PathBuf::from(path), contents.to_string());
        self
    }

    pub fn with_output(mut self, command: &str, stdout: &str) -> Self {
        self.outputs.insert(command.to_string(), stdout.to_string());
        self
    }

    pub fn with_existing(mut self, path: &str) -> Self {
        self.existing.insert(PathBuf::from(path));
        self
    }

    pub fn with_mounted(mut self, path: &str) -> Self {
        self.mounted.insert(PathBuf::from(path));
        self
    }

    pub fn file(&self, path: &str) -> Option<&str> {
        self.files.get(Path::new(path)).map(String::as_str)
    }

    /// Index of the first recorded command starting with `prefix`.
    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.commands.iter().position(|c| c.starts_with(prefix))
    }

    pub fn ran(&self, prefix: &str) -> bool {
        self.position(prefix).is_some()
    }

    /// Asserts the commands starting with each prefix ran in this order.
    pub fn assert_order(&self, prefixes: &[&str]) {
        let mut last = None;
        for prefix in prefixes {
            let at = self
                .position(prefix)
                .unwrap_or_else(|| panic!("`{}` never ran; commands: {:#?}", prefix, self.commands));
            if let Some((before, index)) = last {
                assert!(
                    at > index,
                    "`{}` ran before `{}`; commands: {:#?}",
                    prefix,
                    before,
                    self.commands
                );
            }
            last = Some((*prefix, at));
        }
    }

    fn record(&mut self, program: &str, args: &[&str]) -> Result<()> {
        self.commands.push(command_line(program, args));
        if self.fail_program.as_deref() == Some(program) {
            return Err(InstallerError::CommandFailed(program.to_string(), 1));
        }

        match (program, args) {
            ("umount", ["-R", path]) => {
                let path = Path::new(path);
                self.mounted.retain(|m| !m.starts_with(path));
            }
            ("mount", [_, target]) => {
                self.mounted.insert(PathBuf::from(target));
            }
            ("cryptsetup", ["open", partition, name]) => {
                self.existing.insert(PathBuf::from(format!("/dev/mapper/{}", name)));
                self.existing.insert(PathBuf::from(partition));
            }
            ("cryptsetup", ["close", name]) => {
                self.existing
                    .remove(Path::new(&format!("/dev/mapper/{}", name)));
            }
            _ => {}
        }
        Ok(())
    }
}

fn not_found(path: &Path) -> InstallerError {
    InstallerError::Io(io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} not found", path.display()),
    ))
}

impl Host for FakeHost {
    fn run(&mut self, program: &str, args: &[&str]) -> Result<()> {
        self.record(program, args)
    }

    fn run_with_spinner(
        &mut self,
        program: &str,
        args: &[&str],
        _spin_msg: &str,
        _done_msg: &str,
    ) -> Result<()> {
        self.record(program, args)
    }

    fn capture(&mut self, program: &str, args: &[&str]) -> Result<String> {
        self.record(program, args)?;
        Ok(self
            .outputs
            .get(&command_line(program, args))
            .cloned()
            .unwrap_or_default())
    }

    fn run_with_input(&mut self, program: &str, args: &[&str], input: &str) -> Result<()> {
        self.inputs
            .push((command_line(program, args), input.to_string()));
        self.record(program, args)
    }

    fn is_mountpoint(&self, path: &Path) -> bool {
        self.mounted.contains(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.existing.contains(path)
            || self.files.contains_key(path)
            || self.dirs.contains(path)
            || self.symlinks.contains_key(path)
    }

    fn can_reach(&self, _host: &str, _port: u16) -> bool {
        !self.offline
    }

    fn is_root(&self) -> bool {
        !self.non_root
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.files.get(path).cloned().ok_or_else(|| not_found(path))
    }

    fn write(&mut self, path: &Path, contents: &str) -> Result<()> {
        if self.read_only.contains(path) {
            return Err(InstallerError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} is read-only", path.display()),
            )));
        }
        self.writes.push((path.to_path_buf(), contents.to_string()));
        self.files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn create_dir_all(&mut self, path: &Path) -> Result<()> {
        self.dirs.insert(path.to_path_buf());
        Ok(())
    }

    fn copy(&mut self, from: &Path, to: &Path) -> Result<()> {
        let contents = self.read_to_string(from)?;
        self.files.insert(to.to_path_buf(), contents);
        Ok(())
    }

    fn remove_file(&mut self, path: &Path) -> Result<()> {
        self.files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| not_found(path))
    }

    fn remove_dir(&mut self, path: &Path) -> Result<()> {
        if self.dirs.remove(path) {
            Ok(())
        } else {
            Err(not_found(path))
        }
    }

    fn symlink(&mut self, target: &Path, link: &Path) -> Result<()> {
        self.symlinks.insert(link.to_path_buf(), target.to_path_buf());
        Ok(())
    }

    fn mode(&self, path: &Path) -> Result<u32> {
        self.modes.get(path).copied().ok_or_else(|| not_found(path))
    }

    fn set_mode(&mut self, path: &Path, mode: u32) -> Result<()> {
        self.modes.insert(path.to_path_buf(), mode);
        Ok(())
    }
}

/// Answers prompts from a fixed script; running out means the operator quit.
pub struct ScriptedInput {
    answers: VecDeque<String>,
    pub prompts: Vec<String>,
}

impl ScriptedInput {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            prompts: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().ok_or(InstallerError::Cancelled)
    }
}

pub fn test_paths() -> InstallPaths {
    InstallPaths {
        target_root: PathBuf::from("/mnt"),
        config_file: PathBuf::from("/usr/local/share/installer/config.json"),
        configure_binary: PathBuf::from("/opt/installer/arch-configure"),
        pacman_conf: PathBuf::from(PACMAN_CONF),
    }
}

/// A host ready for the whole installer run: one 20G disk, UEFI, online.
pub fn install_host(lsblk_json: &str) -> FakeHost {
    let paths = test_paths();
    FakeHost::new()
        .with_existing("/sys/firmware/efi/efivars")
        .with_output(LSBLK_JSON, lsblk_json)
        .with_output(LSBLK_TABLE, "NAME TYPE FSAVAIL SIZE PATH MOUNTPOINTS\n")
        .with_output("genfstab -U /mnt", "UUID=1111 / ext4 rw 0 1\n")
        .with_file("/proc/cpuinfo", INTEL_CPUINFO)
        .with_file(&paths.config_file.to_string_lossy(), r#"{"hostname": "archbox"}"#)
        .with_file(&paths.configure_binary.to_string_lossy(), "\x7fELF")
        .with_file(PACMAN_CONF, "[options]\nParallelDownloads = 5\n")
}

pub fn disk(path: &str, children: Vec<Device>) -> Device {
    Device {
        name: path.trim_start_matches("/dev/").to_string(),
        kind: "disk".to_string(),
        path: path.to_string(),
        size: Some("20G".to_string()),
        model: Some("QEMU HARDDISK".to_string()),
        mountpoints: vec![None],
        children,
    }
}

pub fn part(path: &str, mountpoint: Option<&str>) -> Device {
    Device {
        name: path.trim_start_matches("/dev/").to_string(),
        kind: "part".to_string(),
        path: path.to_string(),
        size: None,
        model: None,
        mountpoints: vec![mountpoint.map(str::to_string)],
        children: vec![],
    }
}

pub fn staged_binary() -> PathBuf {
    PathBuf::from("/mnt").join(CONFIGURE_BINARY.trim_start_matches('/'))
}
