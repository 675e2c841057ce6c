//! Operator input. Every question the installer asks goes through a
//! [`Prompter`], so a scripted provider can stand in for the terminal.

use dialoguer::Input;

use crate::{
    error::{InstallerError, Result},
    ui,
};

pub trait Prompter {
    /// Reads one line of free text. An empty answer is allowed.
    fn read_line(&mut self, prompt: &str) -> Result<String>;
}

/// Reads answers from the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        let line: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(line)
    }
}

/// Shows a numbered menu and loops until the operator enters a valid
/// number, then returns the value paired with the chosen label.
///
/// `name` labels the answer line; `prompt` defaults to `Select a <name>:`.
pub fn select<K, V>(
    input: &mut dyn Prompter,
    options: &[(K, V)],
    name: &str,
    prompt: Option<&str>,
) -> Result<V>
where
    K: AsRef<str>,
    V: Clone,
{
    if options.is_empty() {
        return Err(InstallerError::NoOptions(name.to_string()));
    }

    let title = prompt
        .map(str::to_string)
        .unwrap_or_else(|| format!("Select a {}:", name));
    ui::print_menu_title(&title);

    for (index, (label, _)) in options.iter().enumerate() {
        ui::print_menu_item(index + 1, label.as_ref());
    }

    loop {
        let raw = input.read_line(name)?;
        let picked = raw
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| options.get(i));

        match picked {
            Some((label, value)) => {
                println!("Selected {}: {}\n", name, label.as_ref());
                return Ok(value.clone());
            }
            None => println!("Please select a valid {} number", name),
        }
    }
}

pub fn ask_yes_no(input: &mut dyn Prompter, prompt: &str) -> Result<bool> {
    select(input, &[("No", false), ("Yes", true)], "answer", Some(prompt))
}

/// Returns the answer as typed, minus the line ending.
pub fn ask_text(input: &mut dyn Prompter, prompt: &str) -> Result<String> {
    let answer = input.read_line(prompt)?;
    Ok(answer.trim_end_matches(['\r', '\n']).to_string())
}
