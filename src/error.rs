//! Crate-level error types shared by the stack synthesizer, the directory clients, and the
//! helper actions.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Stack definition failed synthesis-time validation.
	#[error(transparent)]
	Stack(#[from] crate::stack::StackDefinitionError),
	/// Cloud assembly could not be written or read.
	#[error(transparent)]
	Assembly(#[from] crate::stack::AssemblyError),
	/// Identity directory rejected or failed an admin call.
	#[error(transparent)]
	Directory(#[from] crate::idp::DirectoryError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// Email address failed the local format check.
	#[error("Email address `{email}` is not valid.")]
	InvalidEmail {
		/// Address that was rejected.
		email: String,
	},
	/// Authentication succeeded but the requested token was not issued.
	#[error("Authentication result is missing the {token} token.")]
	MissingToken {
		/// Wire name of the missing token.
		token: &'static str,
	},
	/// Directory answered without an authentication result or a challenge.
	#[error("Directory response is missing the authentication result.")]
	MissingAuthenticationResult,
	/// Directory asked for more input instead of issuing tokens.
	#[error("Directory requires the {challenge} challenge before issuing tokens.")]
	ChallengeRequired {
		/// Challenge name reported by the directory.
		challenge: String,
	},
}

/// Configuration and input failures raised before any remote call is made.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// An identifier failed validation.
	#[error(transparent)]
	Identifier(#[from] crate::auth::IdentifierError),
	/// A required argument was not supplied.
	#[error("Missing required argument `{argument}`.")]
	MissingArgument {
		/// Flag or parameter name.
		argument: &'static str,
	},
	/// Interactive prompt could not read from the terminal.
	#[error("Failed to read from the prompt.")]
	Prompt {
		/// Underlying terminal failure.
		#[source]
		source: BoxError,
	},
	/// A template document could not be parsed.
	#[error("Template is not valid JSON for the expected shape.")]
	TemplateParse {
		/// Structured parsing failure with the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl ConfigError {
	/// Wraps a prompt failure inside [`ConfigError`].
	pub fn prompt(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Prompt { source: Box::new(src) }
	}
}
impl From<std::io::Error> for ConfigError {
	fn from(e: std::io::Error) -> Self {
		Self::prompt(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn errors_render_context() {
		let err = Error::from(ConfigError::MissingArgument { argument: "--client-id" });

		assert_eq!(err.to_string(), "Missing required argument `--client-id`.");
		assert_eq!(
			Error::MissingToken { token: "RefreshToken" }.to_string(),
			"Authentication result is missing the RefreshToken token."
		);
	}
}
