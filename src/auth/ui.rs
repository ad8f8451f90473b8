use std::fmt;
use std::io::{self, BufRead, Write};

#[derive(Debug, Clone)]
pub struct UiError {
    message: String,
}

impl UiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for UiError {}

fn prompt_line(label: &str) -> Result<String, UiError> {
    print!("{label}");
    io::stdout()
        .flush()
        .map_err(|err| UiError::new(err.to_string()))?;

    let mut input = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut input)
        .map_err(|err| UiError::new(err.to_string()))?;
    if read == 0 {
        return Err(UiError::new("Input closed"));
    }
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

/// Asks for whichever of username and password is still missing.
pub fn prompt_credentials(username: Option<String>) -> Result<(String, String), UiError> {
    let username = match username.filter(|name| !name.trim().is_empty()) {
        Some(name) => name,
        None => prompt_line("Username: ")?,
    };
    // no masked input without a raw-mode terminal; say so up front
    let password = prompt_line("Password (input is visible): ")?;
    Ok((username, password))
}
