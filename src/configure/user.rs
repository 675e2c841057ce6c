use std::path::Path;

use tracing::{info, warn};

use crate::{configure::ConfigureContext, error::Result, ui};

const SUDOERS: &str = "/etc/sudoers";
const SKEL: &str = "/etc/skel";
const USER_SCRIPT: &str = "/tmp/script.sh";
const WHEEL_COMMENTED: &str = "# %wheel ALL=(ALL:ALL) ALL";

const AUR_HELPER_REPO: &str = "https://aur.archlinux.org/paru-bin";
const AUR_HELPER_CLONE: &str = "/tmp/paru-bin";

/// Uncomments the rule granting the `wheel` group full sudo access.
pub fn enable_wheel_sudo(sudoers: &str) -> String {
    let mut out = sudoers
        .lines()
        .map(|line| match line.strip_prefix("# ") {
            Some(rule) if line == WHEEL_COMMENTED => rule,
            _ => line,
        })
        .collect::<Vec<_>>()
        .join("\n");
    if sudoers.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Shell script run as the new user; each command on its own line.
pub fn user_script(commands: &[String]) -> String {
    format!("#!/usr/bin/env bash\n{}\n", commands.join("\n"))
}

pub fn aur_helper_commands() -> Vec<String> {
    vec![
        format!("git clone --depth 1 {} {}", AUR_HELPER_REPO, AUR_HELPER_CLONE),
        format!("cd {}", AUR_HELPER_CLONE),
        "makepkg -si".to_string(),
    ]
}

pub fn dotfiles_commands(repository: &str, directory: &str, profile: &str) -> Vec<String> {
    vec![
        format!("mkdir -p {}", directory),
        format!("git clone {} {}", repository, directory),
        format!("cd {}/packages", directory),
        format!("python ./install.py {}", profile),
        "cd ..".to_string(),
        format!("dotdrop install -c dotdrop/config.yaml -p {} -D", profile),
    ]
}

/// Writes `commands` to a throwaway script and runs it as `username`.
/// The script is removed even if it fails.
fn run_as_user(ctx: &mut ConfigureContext, username: &str, commands: &[String]) -> Result<()> {
    let script = Path::new(USER_SCRIPT);
    ctx.host.write(script, &user_script(commands))?;
    ctx.host.set_mode(script, 0o755)?;

    info!(username, commands = commands.len(), "running script as user");
    let result = ctx.host.run("su", &[username, "-P", "-c", USER_SCRIPT]);

    if let Err(err) = ctx.host.remove_file(script) {
        warn!(%err, "could not remove user script");
    }
    result
}

/// Lets members of `wheel` use sudo. The file is read-only for everyone, so
/// the owner write bit is added for the edit and the mode put back after.
pub fn setup_sudo(ctx: &mut ConfigureContext) -> Result<()> {
    let sudoers = Path::new(SUDOERS);
    let mode = ctx.host.mode(sudoers)?;
    ctx.host.set_mode(sudoers, mode | 0o200)?;

    let edited = ctx
        .host
        .read_to_string(sudoers)
        .and_then(|current| ctx.host.write(sudoers, &enable_wheel_sudo(&current)));

    ctx.host.set_mode(sudoers, mode)?;
    edited?;

    ui::print_success("wheel group can use sudo.");
    Ok(())
}

pub fn create_skeleton(ctx: &mut ConfigureContext) -> Result<()> {
    for dir in ctx.config.skel.clone() {
        ctx.host.create_dir_all(&Path::new(SKEL).join(&dir))?;
    }
    ui::print_success(&format!("{} skeleton director(ies) created.", ctx.config.skel.len()));
    Ok(())
}

pub fn create_user(ctx: &mut ConfigureContext) -> Result<()> {
    let username = ctx.username()?;

    ctx.host.run("useradd", &["-mG", "wheel", username.as_str()])?;
    ui::print_info(&format!("Choose the password of {}.", username));
    ctx.host.run("passwd", &[username.as_str()])
}

pub fn install_aur_helper(ctx: &mut ConfigureContext) -> Result<()> {
    let username = ctx.username()?;
    run_as_user(ctx, &username, &aur_helper_commands())
}

pub fn install_dotfile_manager(ctx: &mut ConfigureContext) -> Result<()> {
    let username = ctx.username()?;
    run_as_user(
        ctx,
        &username,
        &["paru --skipreview -Sy dotdrop".to_string()],
    )
}

pub fn install_dotfiles(ctx: &mut ConfigureContext) -> Result<()> {
    let username = ctx.username()?;
    let Some(dotfiles) = ctx.config.dotfiles_to_install().cloned() else {
        return Ok(());
    };

    let commands = dotfiles_commands(
        &dotfiles.repository,
        &dotfiles.directory,
        &dotfiles.dotdrop_profile,
    );
    run_as_user(ctx, &username, &commands)?;

    if let Some(shell) = dotfiles.shell.as_deref() {
        ctx.host.run("chsh", &["-s", shell, username.as_str()])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_exact_wheel_rule_is_uncommented() {
        let sudoers = "root ALL=(ALL:ALL) ALL\n# %wheel ALL=(ALL:ALL) ALL\n# %wheel ALL=(ALL:ALL) NOPASSWD: ALL\n";
        assert_eq!(
            enable_wheel_sudo(sudoers),
            "root ALL=(ALL:ALL) ALL\n%wheel ALL=(ALL:ALL) ALL\n# %wheel ALL=(ALL:ALL) NOPASSWD: ALL\n"
        );
    }

    #[test]
    fn script_has_shebang_and_one_command_per_line() {
        let script = user_script(&aur_helper_commands());
        assert_eq!(
            script,
            "#!/usr/bin/env bash\n\
             git clone --depth 1 https://aur.archlinux.org/paru-bin /tmp/paru-bin\n\
             cd /tmp/paru-bin\n\
             makepkg -si\n"
        );
    }

    #[test]
    fn dotfiles_are_applied_from_the_clone() {
        let commands = dotfiles_commands("https://example.org/dots", "~/dots", "laptop");
        assert_eq!(commands[1], "git clone https://example.org/dots ~/dots");
        assert_eq!(commands[2], "cd ~/dots/packages");
        assert_eq!(commands[3], "python ./install.py laptop");
        assert_eq!(
            commands.last().map(String::as_str),
            Some("dotdrop install -c dotdrop/config.yaml -p laptop -D")
        );
    }
}
