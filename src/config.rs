//! Typed configuration for the directory connection, the helper actions, and synthesis.

// self
use crate::{
	_prelude::*,
	auth::{AppClientId, TokenType, UserPoolId, Username},
};

/// Shared AWS profile used when none is given.
pub const DEFAULT_AWS_PROFILE: &str = "default";
/// Cloud assembly directory used when none is given.
pub const DEFAULT_OUT_DIR: &str = "cdk.out";

/// How to reach the deployed directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryConfig {
	/// Shared configuration profile providing credentials (and usually the region).
	pub aws_profile: String,
	/// Region override.
	pub region: Option<String>,
}
impl Default for DirectoryConfig {
	fn default() -> Self {
		Self { aws_profile: DEFAULT_AWS_PROFILE.into(), region: None }
	}
}

/// Inputs shared by every helper action.
///
/// Anything left unset is asked for interactively, or reported as a missing argument when
/// prompting makes no sense (the client id).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HelperConfig {
	/// Target user pool.
	pub user_pool_id: UserPoolId,
	/// App client used for token generation.
	pub client_id: Option<AppClientId>,
	/// User to act on.
	pub username: Option<Username>,
	/// Email attribute for newly created users.
	pub email: Option<String>,
	/// Token(s) printed by token generation.
	pub token_type: TokenType,
}
impl HelperConfig {
	/// Creates a configuration targeting `user_pool_id` with everything else unset.
	pub fn new(user_pool_id: UserPoolId) -> Self {
		Self {
			user_pool_id,
			client_id: None,
			username: None,
			email: None,
			token_type: TokenType::default(),
		}
	}

	/// Sets the app client.
	pub fn with_client_id(mut self, client_id: AppClientId) -> Self {
		self.client_id = Some(client_id);

		self
	}

	/// Sets the user.
	pub fn with_username(mut self, username: Username) -> Self {
		self.username = Some(username);

		self
	}

	/// Sets the email attribute.
	pub fn with_email(mut self, email: impl Into<String>) -> Self {
		self.email = Some(email.into());

		self
	}

	/// Sets the token selection.
	pub fn with_token_type(mut self, token_type: TokenType) -> Self {
		self.token_type = token_type;

		self
	}
}

/// Where synthesized output goes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthConfig {
	/// Cloud assembly directory.
	pub out_dir: PathBuf,
}
impl Default for SynthConfig {
	fn default() -> Self {
		Self { out_dir: PathBuf::from(DEFAULT_OUT_DIR) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_match_the_cli() {
		assert_eq!(DirectoryConfig::default().aws_profile, "default");
		assert_eq!(SynthConfig::default().out_dir, PathBuf::from("cdk.out"));

		let pool = UserPoolId::new("us-east-1_abc123").expect("Pool id should be valid.");
		let config = HelperConfig::new(pool).with_email("a@example.com");

		assert_eq!(config.token_type, TokenType::IdToken);
		assert_eq!(config.email.as_deref(), Some("a@example.com"));
		assert!(config.client_id.is_none());
	}
}
