//! Stack definition: a user pool, the app clients bound to it, and their synthesis into a
//! CloudFormation template.
//!
//! `pool` and `client` hold the declarative constructs, `template` renders them into the
//! deployable document, and `assembly` writes that document (plus a manifest) to disk.

pub mod assembly;
pub mod client;
pub mod logical_id;
pub mod pool;
pub mod template;

pub use assembly::*;
pub use client::*;
pub use logical_id::*;
pub use pool::*;
pub use template::*;

// self
use crate::{
	_prelude::*,
	auth::{ConstructId, OAuthScope},
};

/// Name of the stack declared by [`cognito_stack`].
pub const STACK_NAME: &str = "CognitoCdkStack";

/// Errors raised while declaring or validating a stack.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum StackDefinitionError {
	/// Two sibling constructs share an id.
	#[error("Construct id `{id}` is already used by a sibling.")]
	DuplicateConstructId {
		/// Offending construct id.
		id: String,
	},
	/// A token lifetime is outside the range the platform accepts.
	#[error(
		"The {token} validity of {minutes} minutes must be between {min_minutes} and {max_minutes} minutes."
	)]
	TokenValidityOutOfRange {
		/// Token the validity applies to.
		token: &'static str,
		/// Declared validity, in whole minutes.
		minutes: i64,
		/// Lower bound in minutes.
		min_minutes: i64,
		/// Upper bound in minutes.
		max_minutes: i64,
	},
	/// A token lifetime is not a whole number of minutes.
	#[error("The {token} validity must be a whole number of minutes.")]
	FractionalMinutes {
		/// Token the validity applies to.
		token: &'static str,
	},
	/// An ID or access token would outlive the refresh token.
	#[error("The {token} validity cannot exceed the refresh token validity.")]
	ValidityExceedsRefresh {
		/// Token the validity applies to.
		token: &'static str,
	},
	/// A browser grant is enabled with an explicitly empty callback list.
	#[error("Callback URLs must not be empty when the code or implicit grant is enabled.")]
	EmptyCallbackUrls,
	/// Identifier validation failed.
	#[error(transparent)]
	Identifier(#[from] crate::auth::IdentifierError),
}

/// A deployable unit holding user pools and their clients.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stack {
	name: ConstructId,
	description: Option<String>,
	user_pools: Vec<UserPool>,
}
impl Stack {
	/// Creates an empty stack.
	pub fn new(name: ConstructId) -> Self {
		Self { name, description: None, user_pools: Vec::new() }
	}

	/// Sets the template description.
	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());

		self
	}

	/// Stack name; also the artifact name in the cloud assembly.
	pub fn name(&self) -> &ConstructId {
		&self.name
	}

	/// Template description, if any.
	pub fn description(&self) -> Option<&str> {
		self.description.as_deref()
	}

	/// User pools declared in the stack.
	pub fn user_pools(&self) -> &[UserPool] {
		&self.user_pools
	}

	/// Looks up a user pool by construct id.
	pub fn user_pool(&self, id: &str) -> Option<&UserPool> {
		self.user_pools.iter().find(|p| p.id().as_ref() == id)
	}

	/// Declares a user pool and returns it so clients can be bound to it.
	pub fn add_user_pool(
		&mut self,
		id: ConstructId,
		props: UserPoolProps,
	) -> Result<&mut UserPool, StackDefinitionError> {
		if self.user_pools.iter().any(|p| p.id() == &id) {
			return Err(StackDefinitionError::DuplicateConstructId { id: id.to_string() });
		}

		self.user_pools.push(UserPool::new(id, props));

		let last = self.user_pools.len() - 1;

		Ok(&mut self.user_pools[last])
	}
}

/// Declares the Cognito stack: one user pool destroyed with the stack and one web client
/// using the authorization-code grant with the `openid` scope.
pub fn cognito_stack() -> Result<Stack, StackDefinitionError> {
	let mut stack = Stack::new(ConstructId::new(STACK_NAME)?);
	let user_pool = stack.add_user_pool(
		ConstructId::new("UserPool")?,
		UserPoolProps { removal_policy: RemovalPolicy::Destroy, ..Default::default() },
	)?;
	let web_client = UserPoolClientProps::builder()
		.name("MyAppWebClient")
		.id_token_validity(Duration::days(1))
		.access_token_validity(Duration::days(1))
		.auth_flows(AuthFlows { admin_user_password: true, ..Default::default() })
		.oauth_flows(OAuthFlows { authorization_code_grant: true, ..Default::default() })
		.oauth_scopes([OAuthScope::OpenId])
		.identity_provider(IdentityProviderKind::Cognito)
		.build()?;

	user_pool.add_client(ConstructId::new("WebClient")?, web_client)?;

	tracing::debug!(stack = STACK_NAME, "declared stack");

	Ok(stack)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn cognito_stack_declares_one_pool_with_one_client() {
		let stack = cognito_stack().expect("Literal stack must be valid.");

		assert_eq!(stack.name().as_ref(), STACK_NAME);
		assert_eq!(stack.user_pools().len(), 1);

		let pool = &stack.user_pools()[0];

		assert_eq!(pool.props().removal_policy, RemovalPolicy::Destroy);
		assert_eq!(pool.clients().len(), 1);

		let client = pool.client("WebClient").expect("Web client must be bound to the pool.");
		let props = client.props();

		assert_eq!(props.user_pool_client_name.as_deref(), Some("MyAppWebClient"));
		assert_eq!(props.id_token_validity, Some(Duration::days(1)));
		assert_eq!(props.access_token_validity, Some(Duration::days(1)));
		assert!(props.auth_flows.admin_user_password);
		assert_eq!(props.effective_identity_providers(), vec![IdentityProviderKind::Cognito]);
	}

	#[test]
	fn duplicate_pools_are_rejected() {
		let mut stack = Stack::new(ConstructId::new("Dup").expect("Stack id should be valid."));
		let id = ConstructId::new("Pool").expect("Pool id should be valid.");

		stack.add_user_pool(id.clone(), UserPoolProps::default()).expect("First pool is fine.");

		assert!(matches!(
			stack.add_user_pool(id, UserPoolProps::default()),
			Err(StackDefinitionError::DuplicateConstructId { .. })
		));
	}
}
