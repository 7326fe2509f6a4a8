//! Interactive input used when an action is missing a username or needs a password.

// std
use std::{collections::VecDeque, io};
// self
use crate::{_prelude::*, auth::Password, error::ConfigError};

/// Source of interactive answers.
pub trait Prompt
where
	Self: Send + Sync,
{
	/// Shows `prompt` and reads one visible line, without the trailing newline.
	fn read_line(&self, prompt: &str) -> Result<String, ConfigError>;

	/// Shows `prompt` and reads one line without echoing it.
	fn read_secret(&self, prompt: &str) -> Result<Password, ConfigError>;
}

/// Prompt reading from the controlling terminal.
#[cfg(feature = "cli")]
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalPrompt;
#[cfg(feature = "cli")]
impl Prompt for TerminalPrompt {
	fn read_line(&self, prompt: &str) -> Result<String, ConfigError> {
		// std
		use std::io::Write;

		let mut stdout = io::stdout().lock();

		stdout.write_all(prompt.as_bytes())?;
		stdout.flush()?;

		let mut line = String::new();

		io::stdin().read_line(&mut line)?;

		Ok(line.trim_end_matches(['\r', '\n']).to_owned())
	}

	fn read_secret(&self, prompt: &str) -> Result<Password, ConfigError> {
		Ok(Password::new(rpassword::prompt_password(prompt)?))
	}
}

/// Prompt answering from pre-recorded lines; used by tests and demos.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
	lines: Mutex<VecDeque<String>>,
	secrets: Mutex<VecDeque<String>>,
	asked: Mutex<Vec<String>>,
}
impl ScriptedPrompt {
	/// Creates a prompt with no answers queued.
	pub fn new() -> Self {
		Self::default()
	}

	/// Queues a visible answer.
	pub fn with_line(self, line: impl Into<String>) -> Self {
		self.lines.lock().push_back(line.into());

		self
	}

	/// Queues a hidden answer.
	pub fn with_secret(self, secret: impl Into<String>) -> Self {
		self.secrets.lock().push_back(secret.into());

		self
	}

	/// Prompts shown so far, in order.
	pub fn asked(&self) -> Vec<String> {
		self.asked.lock().clone()
	}

	fn answer(&self, queue: &Mutex<VecDeque<String>>, prompt: &str) -> Result<String, ConfigError> {
		self.asked.lock().push(prompt.to_owned());

		queue.lock().pop_front().ok_or_else(|| {
			ConfigError::prompt(io::Error::new(
				io::ErrorKind::UnexpectedEof,
				format!("no scripted answer for prompt `{prompt}`"),
			))
		})
	}
}
impl Prompt for ScriptedPrompt {
	fn read_line(&self, prompt: &str) -> Result<String, ConfigError> {
		self.answer(&self.lines, prompt)
	}

	fn read_secret(&self, prompt: &str) -> Result<Password, ConfigError> {
		self.answer(&self.secrets, prompt).map(Password::new)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn scripted_prompt_answers_in_order_then_fails() {
		let prompt = ScriptedPrompt::new().with_line("alice").with_secret("Sup3r!secret");

		assert_eq!(prompt.read_line("user: ").expect("Line should be queued."), "alice");
		assert_eq!(
			prompt.read_secret("password: ").expect("Secret should be queued.").expose(),
			"Sup3r!secret"
		);
		assert!(matches!(prompt.read_line("again: "), Err(ConfigError::Prompt { .. })));
		assert_eq!(prompt.asked(), vec!["user: ", "password: ", "again: "]);
	}
}
