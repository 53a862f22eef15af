//! Shell command execution with stdout and stderr merged.

use std::process::Stdio;

#[cfg(not(windows))]
use shlex::try_join;
use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::CompilerError;
use crate::domain::models::ExecutionResult;

/// Exit code reported when the process was killed by a signal.
const SIGNAL_EXIT_CODE: i32 = -1;

/// Runs an argument list through the platform shell.
///
/// Stderr is redirected into stdout so the captured message keeps the
/// interleaving the user would see in a terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandLineRunner;

impl CommandLineRunner {
    pub fn new() -> Self {
        Self
    }

    /// Shell line for `args`, quoted for a POSIX shell.
    #[cfg(not(windows))]
    pub fn command_line(args: &[String]) -> Result<String, CompilerError> {
        try_join(args.iter().map(String::as_str)).map_err(|err| CompilerError::Io {
            command: args.join(" "),
            message: err.to_string(),
        })
    }

    /// Shell line for `args`, double-quoted for `cmd`.
    #[cfg(windows)]
    pub fn command_line(args: &[String]) -> Result<String, CompilerError> {
        Ok(args
            .iter()
            .map(|arg| quote_for_cmd(arg))
            .collect::<Vec<_>>()
            .join(" "))
    }

    /// Run `args` and wait for it to exit.
    ///
    /// A non-zero exit is a normal result; only a failure to spawn the shell
    /// is an error.
    pub async fn run(&self, args: &[String]) -> Result<ExecutionResult, CompilerError> {
        let command_line = format!("{} 2>&1", Self::command_line(args)?);
        debug!(command = %command_line, "Running command");

        let output = shell_command(&command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|err| CompilerError::Io {
                command: command_line.clone(),
                message: err.to_string(),
            })?;

        let mut execution_message = String::from_utf8_lossy(&output.stdout).into_owned();
        // The redirect covers the command itself; the shell's own complaints
        // (e.g. command not found) still land on stderr.
        execution_message.push_str(&String::from_utf8_lossy(&output.stderr));

        let exit_code = output.status.code().unwrap_or(SIGNAL_EXIT_CODE);
        debug!(exit_code, "Command finished");

        Ok(ExecutionResult::new(exit_code, execution_message))
    }
}

#[cfg(unix)]
fn shell_command(command_line: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(command_line);
    command
}

/// Quote one argument the way the MSVC runtime splits command lines.
///
/// Backslashes are literal unless they precede a double quote.
#[cfg_attr(not(windows), allow(dead_code))]
fn quote_for_cmd(arg: &str) -> String {
    const SPECIAL: &[char] = &[' ', '\t', '"', '&', '|', '<', '>', '^', '(', ')', '%', '!'];
    if !arg.is_empty() && !arg.contains(SPECIAL) {
        return arg.to_string();
    }

    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    let mut backslashes = 0usize;
    for ch in arg.chars() {
        match ch {
            '\\' => backslashes += 1,
            '"' => {
                quoted.push_str(&"\\".repeat(backslashes * 2 + 1));
                quoted.push('"');
                backslashes = 0;
            }
            _ => {
                quoted.push_str(&"\\".repeat(backslashes));
                quoted.push(ch);
                backslashes = 0;
            }
        }
    }
    quoted.push_str(&"\\".repeat(backslashes * 2));
    quoted.push('"');
    quoted
}

#[cfg(windows)]
fn shell_command(command_line: &str) -> Command {
    let mut command = Command::new("cmd");
    // `/S` strips exactly the outer pair of quotes and keeps the rest verbatim.
    command
        .arg("/S")
        .arg("/C")
        .raw_arg(format!("\"{command_line}\""));
    command
}
