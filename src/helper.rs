//! Operator actions against a deployed user pool: create administrator users, set their
//! permanent password, and generate tokens through the admin password flow.
//!
//! [`Helper`] is directory-agnostic; the CLI wires it to
//! [`CognitoDirectory`](crate::idp::CognitoDirectory) and a terminal prompt, tests wire it to
//! [`MemoryDirectory`](crate::idp::MemoryDirectory) and a [`ScriptedPrompt`].

pub mod email;
pub mod prompt;

pub use email::*;
pub use prompt::*;

// self
use crate::{
	_prelude::*,
	auth::{TokenOutput, Username},
	config::HelperConfig,
	error::ConfigError,
	idp::{AuthOutcome, IdentityDirectory},
	obs::{self, ActionKind, ActionOutcome, ActionSpan},
};

/// Actions the helper can run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
	/// Create a user only.
	CreateUser,
	/// Set the permanent password of an existing user.
	ConfirmUser,
	/// Create a user and set its permanent password.
	CreateNewUser,
	/// Generate token(s) for an existing user.
	GenerateToken,
	/// Create, confirm, then generate token(s) for the new user.
	FullFlow,
}
impl Action {
	/// Every action, in CLI order.
	pub const ALL: [Action; 5] = [
		Action::CreateNewUser,
		Action::CreateUser,
		Action::FullFlow,
		Action::GenerateToken,
		Action::ConfirmUser,
	];

	/// Observability label of the action.
	pub const fn kind(self) -> ActionKind {
		match self {
			Action::CreateUser => ActionKind::CreateUser,
			Action::ConfirmUser => ActionKind::ConfirmUser,
			Action::CreateNewUser => ActionKind::CreateNewUser,
			Action::GenerateToken => ActionKind::GenerateToken,
			Action::FullFlow => ActionKind::FullFlow,
		}
	}

	/// Returns true when the action prints tokens.
	pub const fn issues_tokens(self) -> bool {
		matches!(self, Action::GenerateToken | Action::FullFlow)
	}
}
impl Display for Action {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.kind().as_str())
	}
}
impl FromStr for Action {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Action::ALL
			.into_iter()
			.find(|action| action.kind().as_str() == s)
			.ok_or_else(|| format!("unknown action `{s}`"))
	}
}

/// What an action did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionReport {
	/// Action that ran.
	pub action: Action,
	/// User the action applied to.
	pub username: Username,
	/// Token(s) produced by token-issuing actions.
	pub tokens: Option<TokenOutput>,
}

/// Runs actions against one user pool.
pub struct Helper {
	directory: Arc<dyn IdentityDirectory>,
	prompt: Arc<dyn Prompt>,
	config: HelperConfig,
}
impl Helper {
	/// Creates a helper bound to `directory`, asking `prompt` for anything `config` lacks.
	pub fn new(
		directory: Arc<dyn IdentityDirectory>,
		prompt: Arc<dyn Prompt>,
		config: HelperConfig,
	) -> Self {
		Self { directory, prompt, config }
	}

	/// Configuration the helper runs with.
	pub fn config(&self) -> &HelperConfig {
		&self.config
	}

	/// Runs `action`, recording its span and outcome.
	pub async fn run(&self, action: Action) -> Result<ActionReport> {
		let kind = action.kind();
		let span = ActionSpan::new(kind, "run");

		obs::record_action_outcome(kind, ActionOutcome::Attempt);

		let result = span.instrument(self.run_inner(action)).await;

		match &result {
			Ok(_) => obs::record_action_outcome(kind, ActionOutcome::Success),
			Err(e) => {
				obs::record_action_outcome(kind, ActionOutcome::Failure);

				tracing::error!(action = %action, error = %e, "action failed");
			},
		}

		result
	}

	async fn run_inner(&self, action: Action) -> Result<ActionReport> {
		let (username, tokens) = match action {
			Action::CreateUser => (self.create_admin_user().await?, None),
			Action::ConfirmUser => (self.confirm_user(None).await?, None),
			Action::CreateNewUser => {
				let username = self.create_admin_user().await?;

				(self.confirm_user(Some(&username)).await?, None)
			},
			Action::GenerateToken => {
				let (username, tokens) = self.issue_tokens(None).await?;

				(username, Some(tokens))
			},
			Action::FullFlow => {
				let username = self.create_admin_user().await?;

				self.confirm_user(Some(&username)).await?;

				let (username, tokens) = self.issue_tokens(Some(&username)).await?;

				(username, Some(tokens))
			},
		};

		Ok(ActionReport { action, username, tokens })
	}

	/// Creates an administrator user with a temporary password.
	///
	/// The username comes from the configuration or the prompt. A configured email is checked
	/// locally before the directory is called and stored as the `email` attribute.
	pub async fn create_admin_user(&self) -> Result<Username> {
		tracing::info!("attempting to create admin user");

		let username = match &self.config.username {
			Some(username) => {
				tracing::info!(username = %username, "attempting to create username");

				username.clone()
			},
			None => self.prompt_username("Please enter the username to be created: ")?,
		};
		let email = self.config.email.as_deref();

		if let Some(email) = email {
			validate_email(email)?;
		}

		let user =
			self.directory.admin_create_user(&self.config.user_pool_id, &username, email).await?;

		tracing::info!(
			username = %user.username,
			user_pool_id = %self.config.user_pool_id,
			status = ?user.status,
			"successfully created user"
		);

		Ok(username)
	}

	/// Sets a permanent password read from the hidden prompt.
	///
	/// Uses `username` when given, else the configured one; there is no interactive fallback.
	pub async fn confirm_user(&self, username: Option<&Username>) -> Result<Username> {
		let username = match username {
			Some(username) => username.clone(),
			None => {
				tracing::info!("attempting to fetch user from CLI arguments");

				self.config
					.username
					.clone()
					.ok_or(ConfigError::MissingArgument { argument: "--username" })?
			},
		};

		tracing::info!(
			username = %username,
			user_pool_id = %self.config.user_pool_id,
			"attempting to confirm user"
		);

		let password =
			self.prompt.read_secret("Please enter the password for the user to be created: ")?;

		self.directory
			.admin_set_user_password(&self.config.user_pool_id, &username, &password, true)
			.await?;

		tracing::info!(username = %username, "successfully set the permanent password for user");

		Ok(username)
	}

	/// Authenticates a user and selects the configured token type.
	///
	/// Needs a configured client id. Uses `username` when given, else the configured one, else
	/// the prompt. A challenge instead of tokens is an error.
	pub async fn generate_token(&self, username: Option<&Username>) -> Result<TokenOutput> {
		self.issue_tokens(username).await.map(|(_, tokens)| tokens)
	}

	async fn issue_tokens(&self, username: Option<&Username>) -> Result<(Username, TokenOutput)> {
		let client_id = self
			.config
			.client_id
			.as_ref()
			.ok_or(ConfigError::MissingArgument { argument: "--client-id" })?;
		let username = self.resolve_username_or_prompt(
			username,
			"Enter the username to generate the token for: ",
		)?;

		tracing::info!(username = %username, "generating token(s) for user");

		let password = self.prompt.read_secret(&format!(
			"enter the password for {username} to generate the auth token: "
		))?;
		let outcome = self
			.directory
			.admin_initiate_auth(&self.config.user_pool_id, client_id, &username, &password)
			.await?;
		let tokens = match outcome {
			AuthOutcome::Authenticated(tokens) => tokens,
			AuthOutcome::Challenge { name } =>
				return Err(Error::ChallengeRequired { challenge: name }),
			AuthOutcome::Empty => return Err(Error::MissingAuthenticationResult),
		};
		let token_type = self.config.token_type;

		tracing::info!(token_type = %token_type, "token type requested");

		Ok((username, tokens.select(token_type)?))
	}

	fn resolve_username_or_prompt(
		&self,
		username: Option<&Username>,
		prompt: &str,
	) -> Result<Username> {
		if let Some(username) = username.or(self.config.username.as_ref()) {
			return Ok(username.clone());
		}

		self.prompt_username(prompt)
	}

	fn prompt_username(&self, prompt: &str) -> Result<Username> {
		let line = self.prompt.read_line(prompt)?;

		Username::new(line.trim()).map_err(|e| ConfigError::from(e).into())
	}
}
impl Debug for Helper {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Helper").field("config", &self.config).finish_non_exhaustive()
	}
}
