//! User pool (identity directory) construct.

// self
use crate::{
	_prelude::*,
	auth::ConstructId,
	stack::{StackDefinitionError, UserPoolClient, UserPoolClientProps},
};

/// What happens to a resource when the stack is torn down or the resource is replaced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
	/// Delete the resource together with the stack.
	Destroy,
	/// Keep the resource in the account after the stack is gone.
	#[default]
	Retain,
}
impl RemovalPolicy {
	/// Returns the CloudFormation `DeletionPolicy` value.
	pub const fn as_deletion_policy(self) -> &'static str {
		match self {
			RemovalPolicy::Destroy => "Delete",
			RemovalPolicy::Retain => "Retain",
		}
	}
}

/// Channels a user can recover their account through, in priority order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRecovery {
	/// Verified phone first, then verified email.
	#[default]
	PhoneAndEmail,
	/// Verified email first, then verified phone.
	EmailAndPhoneWithoutMfa,
	/// Verified email only.
	EmailOnly,
	/// Verified phone only.
	PhoneOnlyWithoutMfa,
	/// No self-service recovery; an administrator must reset the password.
	None,
}
impl AccountRecovery {
	/// Recovery mechanism names in priority order.
	pub fn mechanisms(self) -> &'static [&'static str] {
		match self {
			AccountRecovery::PhoneAndEmail => &["verified_phone_number", "verified_email"],
			AccountRecovery::EmailAndPhoneWithoutMfa => &["verified_email", "verified_phone_number"],
			AccountRecovery::EmailOnly => &["verified_email"],
			AccountRecovery::PhoneOnlyWithoutMfa => &["verified_phone_number"],
			AccountRecovery::None => &["admin_only"],
		}
	}
}

/// Declared properties of a user pool.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPoolProps {
	/// Teardown behavior.
	pub removal_policy: RemovalPolicy,
	/// Lets users sign themselves up; when false only administrators create users.
	pub self_sign_up_enabled: bool,
	/// Account recovery channels.
	pub account_recovery: AccountRecovery,
}

/// A user pool together with the app clients bound to it.
///
/// Clients are created through [`UserPool::add_client`] only, so a client never outlives or
/// exists without its pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserPool {
	id: ConstructId,
	props: UserPoolProps,
	clients: Vec<UserPoolClient>,
}
impl UserPool {
	pub(crate) fn new(id: ConstructId, props: UserPoolProps) -> Self {
		Self { id, props, clients: Vec::new() }
	}

	/// Construct id of the pool.
	pub fn id(&self) -> &ConstructId {
		&self.id
	}

	/// Declared pool properties.
	pub fn props(&self) -> &UserPoolProps {
		&self.props
	}

	/// App clients bound to the pool.
	pub fn clients(&self) -> &[UserPoolClient] {
		&self.clients
	}

	/// Looks up a client by construct id.
	pub fn client(&self, id: &str) -> Option<&UserPoolClient> {
		self.clients.iter().find(|c| c.id().as_ref() == id)
	}

	/// Binds a new app client to the pool.
	///
	/// The properties are validated here no matter how they were built, so every bound client
	/// synthesizes to an accepted template.
	pub fn add_client(
		&mut self,
		id: ConstructId,
		props: UserPoolClientProps,
	) -> Result<&UserPoolClient, StackDefinitionError> {
		if self.clients.iter().any(|c| c.id() == &id) {
			return Err(StackDefinitionError::DuplicateConstructId { id: id.to_string() });
		}

		props.validate()?;

		self.clients.push(UserPoolClient::new(id, props));

		Ok(&self.clients[self.clients.len() - 1])
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn removal_policy_maps_to_deletion_policy() {
		assert_eq!(RemovalPolicy::Destroy.as_deletion_policy(), "Delete");
		assert_eq!(RemovalPolicy::Retain.as_deletion_policy(), "Retain");
		assert_eq!(RemovalPolicy::default(), RemovalPolicy::Retain);
	}

	#[test]
	fn duplicate_client_ids_are_rejected() {
		let mut pool = UserPool::new(
			ConstructId::new("UserPool").expect("Pool construct id should be valid."),
			UserPoolProps::default(),
		);
		let client_id = ConstructId::new("WebClient").expect("Client construct id should be valid.");

		pool.add_client(client_id.clone(), UserPoolClientProps::default())
			.expect("First client should be accepted.");

		let err = pool
			.add_client(client_id, UserPoolClientProps::default())
			.expect_err("Second client with the same id must be rejected.");

		assert_eq!(err, StackDefinitionError::DuplicateConstructId { id: "WebClient".into() });
		assert_eq!(pool.clients().len(), 1);
	}

	#[test]
	fn literal_client_props_are_validated_when_bound() {
		let mut pool = UserPool::new(
			ConstructId::new("UserPool").expect("Pool construct id should be valid."),
			UserPoolProps::default(),
		);
		let props = UserPoolClientProps {
			id_token_validity: Some(Duration::days(30)),
			access_token_validity: Some(Duration::seconds(90)),
			..Default::default()
		};
		let client_id = ConstructId::new("Client").expect("Client construct id should be valid.");
		let err = pool
			.add_client(client_id.clone(), props)
			.expect_err("Out-of-range validities must be rejected without the builder.");

		assert_eq!(
			err,
			StackDefinitionError::TokenValidityOutOfRange {
				token: "IdToken",
				minutes: 43200,
				min_minutes: 5,
				max_minutes: 1440,
			}
		);

		let props = UserPoolClientProps {
			access_token_validity: Some(Duration::seconds(330)),
			..Default::default()
		};

		assert_eq!(
			pool.add_client(client_id, props).map(|_| ()),
			Err(StackDefinitionError::FractionalMinutes { token: "AccessToken" })
		);
		assert!(pool.clients().is_empty());
	}
}
