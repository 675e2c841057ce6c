use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::{InstallerError, Result};

/// Where the live image keeps the installer's data files.
pub const CONFIG_DIR: &str = "/usr/local/share/installer";
pub const CONFIG_FILE: &str = "/usr/local/share/installer/config.json";

pub const DEFAULT_TIMEZONE: &str = "Europe/Paris";
pub const DEFAULT_LANG: &str = "en_US.UTF-8";
pub const DEFAULT_LOCALE_GEN: [&str; 2] = ["en_US.UTF-8 UTF-8", "en_US ISO-8859-1"];

const DEFAULT_DOTFILES_REPOSITORY: &str = "https://github.com/krapaince/dotfiles_linux";
const DEFAULT_DOTFILES_DIRECTORY: &str = "~/Desktop/GIT/dotfiles_linux";
const DEFAULT_LOGIN_SHELL: &str = "/usr/bin/fish";

/// Which flavour of system gets configured inside the chroot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Locale, network files, initramfs, boot loader. Nothing else.
    Minimal,
    /// Adds NetworkManager, wheel sudo, a user account and dotfiles.
    #[default]
    Desktop,
}

/// Holds every installer choice read from the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub timezone: String,
    pub lang: String,
    pub locale_gen: Vec<String>,
    pub hostname: String,
    pub profile: Profile,
    pub username: Option<String>,
    /// Directories created under `/etc/skel` before the user is added.
    pub skel: Vec<String>,
    pub dotfiles: Option<DotfilesConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DotfilesConfig {
    pub install: bool,
    pub dotdrop_profile: String,
    #[serde(default = "default_repository")]
    pub repository: String,
    #[serde(default = "default_directory")]
    pub directory: String,
    /// Login shell set for the user afterwards; `null` leaves it alone.
    #[serde(default = "default_shell")]
    pub shell: Option<String>,
}

fn default_repository() -> String {
    DEFAULT_DOTFILES_REPOSITORY.to_string()
}

fn default_directory() -> String {
    DEFAULT_DOTFILES_DIRECTORY.to_string()
}

fn default_shell() -> Option<String> {
    Some(DEFAULT_LOGIN_SHELL.to_string())
}

/// On-disk shape. Optional strings may be missing or `null`.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    lang: Option<String>,
    #[serde(default)]
    locale_gen: Option<Vec<String>>,
    hostname: String,
    #[serde(default)]
    profile: Profile,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    skel: Vec<String>,
    #[serde(default)]
    dotfiles: Option<DotfilesConfig>,
}

impl From<ConfigFile> for Config {
    fn from(file: ConfigFile) -> Self {
        Config {
            timezone: file.timezone.unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            lang: file.lang.unwrap_or_else(|| DEFAULT_LANG.to_string()),
            locale_gen: file
                .locale_gen
                .unwrap_or_else(|| DEFAULT_LOCALE_GEN.iter().map(|s| s.to_string()).collect()),
            hostname: file.hostname,
            profile: file.profile,
            username: file.username,
            skel: file.skel,
            dotfiles: file.dotfiles,
        }
    }
}

impl Config {
    /// Parses a config from JSON text, substituting defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<ConfigFile>(json).map(Config::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Config::from_json(&text).map_err(|source| InstallerError::InvalidConfig {
            path: PathBuf::from(path),
            source,
        })
    }

    /// The user to provision, if this profile provisions one.
    pub fn desktop_user(&self) -> Option<&str> {
        match self.profile {
            Profile::Desktop => self.username.as_deref(),
            Profile::Minimal => None,
        }
    }

    /// Dotfile settings, when the desktop user should get them.
    pub fn dotfiles_to_install(&self) -> Option<&DotfilesConfig> {
        self.desktop_user()?;
        self.dotfiles.as_ref().filter(|d| d.install)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn missing_fields_get_defaults() {
        let config = Config::from_json(r#"{"hostname": "archbox"}"#).unwrap();
        assert_eq!(config.timezone, "Europe/Paris");
        assert_eq!(config.lang, "en_US.UTF-8");
        assert_eq!(
            config.locale_gen,
            vec!["en_US.UTF-8 UTF-8".to_string(), "en_US ISO-8859-1".to_string()]
        );
        assert_eq!(config.profile, Profile::Desktop);
        assert!(config.username.is_none());
        assert!(config.skel.is_empty());
    }

    #[test]
    fn null_fields_get_defaults() {
        let config = Config::from_json(
            r#"{"hostname": "archbox", "timezone": null, "lang": null, "locale_gen": null}"#,
        )
        .unwrap();
        assert_eq!(config.timezone, DEFAULT_TIMEZONE);
        assert_eq!(config.lang, DEFAULT_LANG);
        assert_eq!(config.locale_gen.len(), 2);
    }

    #[test]
    fn supplied_values_are_kept_verbatim() {
        let config = Config::from_json(
            r#"{
                "hostname": "archbox",
                "timezone": "America/New_York",
                "lang": "fr_FR.UTF-8",
                "locale_gen": ["fr_FR.UTF-8 UTF-8"]
            }"#,
        )
        .unwrap();
        assert_eq!(config.timezone, "America/New_York");
        assert_eq!(config.lang, "fr_FR.UTF-8");
        assert_eq!(config.locale_gen, vec!["fr_FR.UTF-8 UTF-8".to_string()]);
    }

    #[test]
    fn dotfiles_defaults_fill_in() {
        let config = Config::from_json(
            r#"{
                "hostname": "archbox",
                "username": "alice",
                "dotfiles": {"install": true, "dotdrop_profile": "laptop"}
            }"#,
        )
        .unwrap();
        let dotfiles = config.dotfiles_to_install().unwrap();
        assert_eq!(dotfiles.repository, DEFAULT_DOTFILES_REPOSITORY);
        assert_eq!(dotfiles.directory, DEFAULT_DOTFILES_DIRECTORY);
        assert_eq!(dotfiles.shell.as_deref(), Some("/usr/bin/fish"));
    }

    #[test]
    fn minimal_profile_never_provisions_a_user() {
        let config = Config::from_json(
            r#"{
                "hostname": "archbox",
                "profile": "minimal",
                "username": "alice",
                "dotfiles": {"install": true, "dotdrop_profile": "laptop"}
            }"#,
        )
        .unwrap();
        assert_eq!(config.desktop_user(), None);
        assert!(config.dotfiles_to_install().is_none());
    }

    #[test]
    fn hostname_is_required() {
        assert!(Config::from_json(r#"{"timezone": "UTC"}"#).is_err());
    }

    #[test]
    fn load_reports_the_broken_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        file.flush().unwrap();

        match Config::load(file.path()) {
            Err(InstallerError::InvalidConfig { path, .. }) => assert_eq!(path, file.path()),
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"hostname": "fromdisk", "lang": "de_DE.UTF-8"}"#)
            .unwrap();
        file.flush().unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.hostname, "fromdisk");
        assert_eq!(config.lang, "de_DE.UTF-8");
        assert_eq!(config.timezone, DEFAULT_TIMEZONE);
    }
}
