//! Identity directory contracts used by the helper actions.
//!
//! [`IdentityDirectory`] covers the three administrator calls the helper needs. The
//! `cognito` module talks to a deployed user pool through the AWS SDK; `memory` keeps a
//! provisioned stack in-process for tests and demos.

#[cfg(feature = "aws")] pub mod cognito;
pub mod memory;

#[cfg(feature = "aws")] pub use cognito::*;
pub use memory::*;

// self
use crate::{
	_prelude::*,
	auth::{AppClientId, AuthenticationTokens, Password, UserPoolId, Username},
};

/// Boxed future returned by [`IdentityDirectory`] calls.
pub type DirectoryFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, DirectoryError>> + 'a + Send>>;

/// Administrator API of a user directory.
pub trait IdentityDirectory
where
	Self: Send + Sync,
{
	/// Creates a user with a temporary password; `email` is stored as the `email` attribute.
	fn admin_create_user<'a>(
		&'a self,
		pool: &'a UserPoolId,
		username: &'a Username,
		email: Option<&'a str>,
	) -> DirectoryFuture<'a, DirectoryUser>;

	/// Sets a user's password; a permanent password confirms the user.
	fn admin_set_user_password<'a>(
		&'a self,
		pool: &'a UserPoolId,
		username: &'a Username,
		password: &'a Password,
		permanent: bool,
	) -> DirectoryFuture<'a, ()>;

	/// Authenticates a user through the `ADMIN_USER_PASSWORD_AUTH` flow.
	fn admin_initiate_auth<'a>(
		&'a self,
		pool: &'a UserPoolId,
		client: &'a AppClientId,
		username: &'a Username,
		password: &'a Password,
	) -> DirectoryFuture<'a, AuthOutcome>;
}

/// Lifecycle status of a directory user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserStatus {
	/// Created by an administrator; must replace the temporary password.
	ForceChangePassword,
	/// Has a permanent password.
	Confirmed,
	/// Signed up but not yet verified.
	Unconfirmed,
	/// Any other status reported by the directory.
	Other(String),
}
impl UserStatus {
	/// Parses the status name used on the wire.
	pub fn parse(value: &str) -> Self {
		match value {
			"FORCE_CHANGE_PASSWORD" => UserStatus::ForceChangePassword,
			"CONFIRMED" => UserStatus::Confirmed,
			"UNCONFIRMED" => UserStatus::Unconfirmed,
			other => UserStatus::Other(other.to_owned()),
		}
	}
}

/// User record returned by [`IdentityDirectory::admin_create_user`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryUser {
	/// User name.
	pub username: Username,
	/// Lifecycle status.
	pub status: UserStatus,
	/// Whether the user may sign in.
	pub enabled: bool,
	/// Email attribute, if set.
	pub email: Option<String>,
}

/// Result of an authentication attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthOutcome {
	/// Tokens were issued.
	Authenticated(AuthenticationTokens),
	/// The directory needs another step (e.g. `NEW_PASSWORD_REQUIRED`).
	Challenge {
		/// Challenge name.
		name: String,
	},
	/// The directory answered with neither tokens nor a challenge.
	Empty,
}

/// Errors raised by [`IdentityDirectory`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum DirectoryError {
	/// The user pool (or app client) does not exist.
	#[error("User pool or app client not found: {message}.")]
	UserPoolNotFound {
		/// Directory-supplied message.
		message: String,
	},
	/// The user does not exist.
	#[error("User `{username}` does not exist.")]
	UserNotFound {
		/// Requested user name.
		username: String,
	},
	/// A user with that name already exists.
	#[error("User `{username}` already exists.")]
	UsernameExists {
		/// Requested user name.
		username: String,
	},
	/// Credentials were rejected or the flow is not allowed.
	#[error("Not authorized: {message}.")]
	NotAuthorized {
		/// Directory-supplied message.
		message: String,
	},
	/// The password does not satisfy the pool's password policy.
	#[error("Password does not conform to policy: {message}.")]
	InvalidPassword {
		/// Directory-supplied message.
		message: String,
	},
	/// A parameter was rejected (e.g. the auth flow is not enabled for the client).
	#[error("Invalid parameter: {message}.")]
	InvalidParameter {
		/// Directory-supplied message.
		message: String,
	},
	/// The call was throttled; retry with backoff.
	#[error("Request was throttled: {message}.")]
	Throttled {
		/// Directory-supplied message.
		message: String,
	},
	/// Any other service-side failure.
	#[error("Directory service error: {message}.")]
	Service {
		/// Directory-supplied message.
		message: String,
	},
	/// The request never reached the service (credentials, DNS, TLS, timeouts).
	#[error("Transport error: {message}.")]
	Transport {
		/// Transport-supplied message.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn user_status_parses_wire_names() {
		assert_eq!(UserStatus::parse("FORCE_CHANGE_PASSWORD"), UserStatus::ForceChangePassword);
		assert_eq!(UserStatus::parse("CONFIRMED"), UserStatus::Confirmed);
		assert_eq!(UserStatus::parse("ARCHIVED"), UserStatus::Other("ARCHIVED".into()));
	}
}
