//! Interactive prompts read from a line source

use std::io::{self, BufRead, Write};

use crate::errors::CliError;

/// Print `prompt` and read one line. `None` at end of input.
fn ask(input: &mut dyn BufRead, prompt: &str) -> Result<Option<String>, CliError> {
    print!("{} ", prompt);
    io::stdout().flush()?;

    let mut response = String::new();
    if input.read_line(&mut response)? == 0 {
        return Ok(None);
    }
    Ok(Some(response.trim().to_string()))
}

/// Ask for a `y/N` answer; anything but `y` is a no
pub fn confirm(input: &mut dyn BufRead, prompt: &str) -> Result<bool, CliError> {
    let answer = ask(input, &format!("{} (y/N)", prompt))?;
    Ok(answer.is_some_and(|a| a.eq_ignore_ascii_case("y")))
}

/// Ask for a 1-based choice among `count` entries and return its index.
///
/// End of input is [`CliError::Cancelled`]; a number out of range or text
/// that is not a number is a [`CliError::Config`].
pub fn choose(input: &mut dyn BufRead, prompt: &str, count: usize) -> Result<usize, CliError> {
    let answer = ask(input, &format!("{}:", prompt))?.ok_or(CliError::Cancelled)?;
    match answer.parse::<usize>() {
        Ok(choice) if (1..=count).contains(&choice) => Ok(choice - 1),
        _ => Err(CliError::Config(format!("Invalid selection: {}", answer))),
    }
}
