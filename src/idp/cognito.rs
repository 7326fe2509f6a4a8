//! [`IdentityDirectory`] backed by the Cognito Identity Provider admin API.

// crates.io
use aws_sdk_cognitoidentityprovider::{
	Client,
	error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
	types::{AttributeType, AuthFlowType},
};
// self
use crate::{
	_prelude::*,
	auth::{AppClientId, AuthenticationTokens, Password, TokenSecret, UserPoolId, Username},
	config::DirectoryConfig,
	idp::{
		AuthOutcome, DirectoryError, DirectoryFuture, DirectoryUser, IdentityDirectory,
		UserStatus,
	},
};

/// Directory client for a deployed user pool.
#[derive(Clone, Debug)]
pub struct CognitoDirectory {
	client: Client,
}
impl CognitoDirectory {
	/// Loads credentials and region from the shared AWS configuration.
	///
	/// The named profile is used for both; an explicit region overrides the profile's.
	pub async fn connect(config: &DirectoryConfig) -> Self {
		let mut loader = aws_config::from_env().profile_name(&config.aws_profile);

		if let Some(region) = &config.region {
			loader = loader.region(aws_config::Region::new(region.clone()));
		}

		let sdk_config = loader.load().await;

		tracing::debug!(
			profile = %config.aws_profile,
			region = ?sdk_config.region(),
			"loaded AWS configuration"
		);

		Self::from_client(Client::new(&sdk_config))
	}

	/// Wraps an already configured SDK client.
	pub fn from_client(client: Client) -> Self {
		Self { client }
	}
}
impl IdentityDirectory for CognitoDirectory {
	fn admin_create_user<'a>(
		&'a self,
		pool: &'a UserPoolId,
		username: &'a Username,
		email: Option<&'a str>,
	) -> DirectoryFuture<'a, DirectoryUser> {
		Box::pin(async move {
			let mut request = self
				.client
				.admin_create_user()
				.user_pool_id(pool.to_string())
				.username(username.to_string());

			if let Some(email) = email {
				let attribute = AttributeType::builder()
					.name("email")
					.value(email)
					.build()
					.map_err(|e| DirectoryError::InvalidParameter { message: e.to_string() })?;

				request = request.user_attributes(attribute);
			}

			let output = request.send().await.map_err(|e| map_sdk_error(e, username))?;
			let user = output.user();

			Ok(DirectoryUser {
				username: username.clone(),
				status: user
					.and_then(|u| u.user_status())
					.map(|s| UserStatus::parse(s.as_str()))
					.unwrap_or(UserStatus::ForceChangePassword),
				enabled: user.map(|u| u.enabled()).unwrap_or(true),
				email: user
					.and_then(|u| u.attributes().iter().find(|a| a.name() == "email"))
					.and_then(|a| a.value())
					.map(str::to_owned),
			})
		})
	}

	fn admin_set_user_password<'a>(
		&'a self,
		pool: &'a UserPoolId,
		username: &'a Username,
		password: &'a Password,
		permanent: bool,
	) -> DirectoryFuture<'a, ()> {
		Box::pin(async move {
			self.client
				.admin_set_user_password()
				.user_pool_id(pool.to_string())
				.username(username.to_string())
				.password(password.expose())
				.permanent(permanent)
				.send()
				.await
				.map_err(|e| map_sdk_error(e, username))?;

			Ok(())
		})
	}

	fn admin_initiate_auth<'a>(
		&'a self,
		pool: &'a UserPoolId,
		client: &'a AppClientId,
		username: &'a Username,
		password: &'a Password,
	) -> DirectoryFuture<'a, AuthOutcome> {
		Box::pin(async move {
			let output = self
				.client
				.admin_initiate_auth()
				.user_pool_id(pool.to_string())
				.client_id(client.to_string())
				.auth_flow(AuthFlowType::AdminUserPasswordAuth)
				.auth_parameters("USERNAME", username.to_string())
				.auth_parameters("PASSWORD", password.expose())
				.send()
				.await
				.map_err(|e| map_sdk_error(e, username))?;

			if let Some(result) = output.authentication_result() {
				let secret = |token: Option<&str>| token.map(TokenSecret::new);

				return Ok(AuthOutcome::Authenticated(AuthenticationTokens {
					id_token: secret(result.id_token()),
					access_token: secret(result.access_token()),
					refresh_token: secret(result.refresh_token()),
					expires_in: Some(i64::from(result.expires_in())),
					token_type: result.token_type().map(str::to_owned),
				}));
			}

			Ok(match output.challenge_name() {
				Some(challenge) => AuthOutcome::Challenge { name: challenge.as_str().to_owned() },
				None => AuthOutcome::Empty,
			})
		})
	}
}

fn map_sdk_error<E, R>(err: SdkError<E, R>, username: &Username) -> DirectoryError
where
	SdkError<E, R>: Into<aws_sdk_cognitoidentityprovider::Error>,
{
	let transport = matches!(err, SdkError::DispatchFailure(_) | SdkError::TimeoutError(_));
	let err: aws_sdk_cognitoidentityprovider::Error = err.into();

	if transport {
		return DirectoryError::Transport { message: DisplayErrorContext(&err).to_string() };
	}

	map_cognito_error(err, username)
}

fn map_cognito_error(
	err: aws_sdk_cognitoidentityprovider::Error,
	username: &Username,
) -> DirectoryError {
	use aws_sdk_cognitoidentityprovider::Error as CognitoError;

	let message = err.message().map(str::to_owned).unwrap_or_else(|| err.to_string());

	match err {
		CognitoError::UserNotFoundException(_) =>
			DirectoryError::UserNotFound { username: username.to_string() },
		CognitoError::UsernameExistsException(_) =>
			DirectoryError::UsernameExists { username: username.to_string() },
		CognitoError::ResourceNotFoundException(_) => DirectoryError::UserPoolNotFound { message },
		CognitoError::NotAuthorizedException(_) | CognitoError::PasswordResetRequiredException(_) =>
			DirectoryError::NotAuthorized { message },
		CognitoError::InvalidPasswordException(_) => DirectoryError::InvalidPassword { message },
		CognitoError::InvalidParameterException(_) => DirectoryError::InvalidParameter { message },
		CognitoError::TooManyRequestsException(_) | CognitoError::LimitExceededException(_) =>
			DirectoryError::Throttled { message },
		_ => DirectoryError::Service { message: DisplayErrorContext(&err).to_string() },
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use aws_sdk_cognitoidentityprovider::types::error::{
		InvalidPasswordException, TooManyRequestsException, UserNotFoundException,
	};
	// self
	use super::*;

	fn alice() -> Username {
		Username::new("alice").expect("Username fixture should be valid.")
	}

	#[test]
	fn service_errors_map_to_directory_errors() {
		use aws_sdk_cognitoidentityprovider::Error as CognitoError;

		let err = CognitoError::UserNotFoundException(
			UserNotFoundException::builder().message("User does not exist.").build(),
		);

		assert_eq!(
			map_cognito_error(err, &alice()),
			DirectoryError::UserNotFound { username: "alice".into() }
		);

		let err = CognitoError::InvalidPasswordException(
			InvalidPasswordException::builder().message("Password not long enough").build(),
		);

		assert_eq!(
			map_cognito_error(err, &alice()),
			DirectoryError::InvalidPassword { message: "Password not long enough".into() }
		);

		let err = CognitoError::TooManyRequestsException(
			TooManyRequestsException::builder().message("Rate exceeded").build(),
		);

		assert!(matches!(map_cognito_error(err, &alice()), DirectoryError::Throttled { .. }));
	}
}
