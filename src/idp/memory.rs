//! Thread-safe in-memory [`IdentityDirectory`] that provisions a synthesized template.
//!
//! Only the observable behavior the helper relies on is reproduced: identifier shapes,
//! duplicate and unknown users, the default password policy, the new-password challenge for
//! administrator-created users, and per-client auth flows and token lifetimes.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::{AppClientId, AuthenticationTokens, Password, TokenSecret, UserPoolId, Username},
	idp::{
		AuthOutcome, DirectoryError, DirectoryFuture, DirectoryUser, IdentityDirectory,
		UserStatus,
	},
	stack::{Stack, Template, USER_POOL_CLIENT_TYPE, USER_POOL_TYPE},
};

/// Region used by [`MemoryDirectory::default`].
pub const DEFAULT_REGION: &str = "us-east-1";
/// Challenge returned until an administrator-created user gets a permanent password.
pub const NEW_PASSWORD_REQUIRED: &str = "NEW_PASSWORD_REQUIRED";
/// Minimum password length of the default password policy.
pub const MIN_PASSWORD_LENGTH: usize = 8;

const ADMIN_USER_PASSWORD_AUTH: &str = "ALLOW_ADMIN_USER_PASSWORD_AUTH";
const DEFAULT_TOKEN_VALIDITY_MINUTES: i64 = 60;
const PASSWORD_SYMBOLS: &str = "^$*.[]{}()?\"!@#%&/\\,><':;|_~`=+-";

type PoolMap = Arc<RwLock<HashMap<UserPoolId, PoolState>>>;

#[derive(Debug, Default)]
struct PoolState {
	clients: HashMap<AppClientId, ClientState>,
	users: HashMap<Username, UserState>,
}

#[derive(Debug)]
struct ClientState {
	explicit_auth_flows: Vec<String>,
	access_token_validity_minutes: i64,
}

#[derive(Debug)]
struct UserState {
	password: String,
	status: UserStatus,
	email: Option<String>,
}

/// Physical ids assigned when a template is provisioned.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProvisionedStack {
	/// User pool ids keyed by logical id.
	pub user_pools: BTreeMap<String, UserPoolId>,
	/// App client ids keyed by logical id.
	pub clients: BTreeMap<String, AppClientId>,
}
impl ProvisionedStack {
	/// Returns the user pool id when exactly one pool was provisioned.
	pub fn sole_user_pool(&self) -> Option<&UserPoolId> {
		sole(&self.user_pools)
	}

	/// Returns the app client id when exactly one client was provisioned.
	pub fn sole_client(&self) -> Option<&AppClientId> {
		sole(&self.clients)
	}
}

fn sole<V>(map: &BTreeMap<String, V>) -> Option<&V> {
	let mut values = map.values();

	match (values.next(), values.next()) {
		(Some(value), None) => Some(value),
		_ => None,
	}
}

/// Directory backend that keeps pools, clients, and users in-process for tests and demos.
#[derive(Clone, Debug)]
pub struct MemoryDirectory {
	region: String,
	pools: PoolMap,
}
impl MemoryDirectory {
	/// Creates an empty directory whose pool ids carry `region` as prefix.
	pub fn new(region: impl Into<String>) -> Self {
		Self { region: region.into(), pools: Default::default() }
	}

	/// Synthesizes `stack` and provisions the resulting template.
	pub fn provision_stack(&self, stack: &Stack) -> Result<ProvisionedStack, DirectoryError> {
		self.provision(&stack.synth())
	}

	/// Creates every user pool and app client declared by `template`.
	///
	/// Clients must reference their pool through `{"Ref": <pool>}` in `UserPoolId`.
	pub fn provision(&self, template: &Template) -> Result<ProvisionedStack, DirectoryError> {
		let mut provisioned = ProvisionedStack::default();
		let mut pools = HashMap::new();

		for (logical_id, _) in template.resources_of_type(USER_POOL_TYPE) {
			let pool_id = self.new_user_pool_id()?;

			pools.insert(pool_id.clone(), PoolState::default());
			provisioned.user_pools.insert(logical_id.to_owned(), pool_id);
		}
		for (logical_id, resource) in template.resources_of_type(USER_POOL_CLIENT_TYPE) {
			let pool_id = resource
				.ref_target("UserPoolId")
				.and_then(|target| provisioned.user_pools.get(target))
				.ok_or_else(|| DirectoryError::UserPoolNotFound {
					message: format!("Client {logical_id} does not reference a provisioned pool"),
				})?;
			let client_id = new_app_client_id()?;
			let client = ClientState {
				explicit_auth_flows: resource
					.string_list("ExplicitAuthFlows")
					.into_iter()
					.map(str::to_owned)
					.collect(),
				access_token_validity_minutes: resource
					.property("AccessTokenValidity")
					.and_then(serde_json::Value::as_i64)
					.unwrap_or(DEFAULT_TOKEN_VALIDITY_MINUTES),
			};

			if let Some(pool) = pools.get_mut(pool_id) {
				pool.clients.insert(client_id.clone(), client);
			}

			provisioned.clients.insert(logical_id.to_owned(), client_id);
		}

		self.pools.write().extend(pools);

		tracing::debug!(
			pools = provisioned.user_pools.len(),
			clients = provisioned.clients.len(),
			"provisioned template in memory"
		);

		Ok(provisioned)
	}

	/// Returns the current status of a user.
	pub fn user_status(&self, pool: &UserPoolId, username: &Username) -> Option<UserStatus> {
		self.pools.read().get(pool)?.users.get(username).map(|user| user.status.clone())
	}

	/// Returns the temporary password issued to an administrator-created user that has not
	/// been confirmed yet.
	pub fn temporary_password(&self, pool: &UserPoolId, username: &Username) -> Option<Password> {
		let guard = self.pools.read();
		let user = guard.get(pool)?.users.get(username)?;

		(user.status == UserStatus::ForceChangePassword).then(|| Password::new(&user.password))
	}

	fn new_user_pool_id(&self) -> Result<UserPoolId, DirectoryError> {
		let suffix = random_alphanumeric(9);

		UserPoolId::new(format!("{}_{suffix}", self.region))
			.map_err(|e| DirectoryError::InvalidParameter { message: e.to_string() })
	}

	fn create_user_now(
		pools: &PoolMap,
		pool: &UserPoolId,
		username: &Username,
		email: Option<&str>,
	) -> Result<DirectoryUser, DirectoryError> {
		let mut guard = pools.write();
		let state = guard.get_mut(pool).ok_or_else(|| pool_not_found(pool))?;

		if state.users.contains_key(username) {
			return Err(DirectoryError::UsernameExists { username: username.to_string() });
		}

		let user = UserState {
			password: temporary_password(),
			status: UserStatus::ForceChangePassword,
			email: email.map(str::to_owned),
		};
		let created = DirectoryUser {
			username: username.clone(),
			status: user.status.clone(),
			enabled: true,
			email: user.email.clone(),
		};

		state.users.insert(username.clone(), user);

		Ok(created)
	}

	fn set_password_now(
		pools: &PoolMap,
		pool: &UserPoolId,
		username: &Username,
		password: &Password,
		permanent: bool,
	) -> Result<(), DirectoryError> {
		let mut guard = pools.write();
		let state = guard.get_mut(pool).ok_or_else(|| pool_not_found(pool))?;
		let user = state
			.users
			.get_mut(username)
			.ok_or_else(|| DirectoryError::UserNotFound { username: username.to_string() })?;

		check_password_policy(password.expose())?;

		user.password = password.expose().to_owned();
		user.status =
			if permanent { UserStatus::Confirmed } else { UserStatus::ForceChangePassword };

		Ok(())
	}

	fn initiate_auth_now(
		pools: &PoolMap,
		pool: &UserPoolId,
		client: &AppClientId,
		username: &Username,
		password: &Password,
	) -> Result<AuthOutcome, DirectoryError> {
		let guard = pools.read();
		let state = guard.get(pool).ok_or_else(|| pool_not_found(pool))?;
		let client_state = state.clients.get(client).ok_or_else(|| {
			DirectoryError::UserPoolNotFound {
				message: format!("User pool client {client} does not exist"),
			}
		})?;

		if !client_state.explicit_auth_flows.iter().any(|flow| flow == ADMIN_USER_PASSWORD_AUTH) {
			return Err(DirectoryError::InvalidParameter {
				message: "Auth flow not enabled for this client".into(),
			});
		}

		let user = state
			.users
			.get(username)
			.ok_or_else(|| DirectoryError::UserNotFound { username: username.to_string() })?;

		if user.password != password.expose() {
			return Err(DirectoryError::NotAuthorized {
				message: "Incorrect username or password".into(),
			});
		}

		match user.status {
			UserStatus::ForceChangePassword =>
				Ok(AuthOutcome::Challenge { name: NEW_PASSWORD_REQUIRED.into() }),
			UserStatus::Confirmed => Ok(AuthOutcome::Authenticated(AuthenticationTokens {
				id_token: Some(TokenSecret::new(opaque_token("id"))),
				access_token: Some(TokenSecret::new(opaque_token("access"))),
				refresh_token: Some(TokenSecret::new(opaque_token("refresh"))),
				expires_in: Some(client_state.access_token_validity_minutes * 60),
				token_type: Some("Bearer".into()),
			})),
			UserStatus::Unconfirmed | UserStatus::Other(_) => Err(DirectoryError::NotAuthorized {
				message: "User is not confirmed".into(),
			}),
		}
	}
}
impl Default for MemoryDirectory {
	fn default() -> Self {
		Self::new(DEFAULT_REGION)
	}
}
impl IdentityDirectory for MemoryDirectory {
	fn admin_create_user<'a>(
		&'a self,
		pool: &'a UserPoolId,
		username: &'a Username,
		email: Option<&'a str>,
	) -> DirectoryFuture<'a, DirectoryUser> {
		let pools = self.pools.clone();

		Box::pin(async move { Self::create_user_now(&pools, pool, username, email) })
	}

	fn admin_set_user_password<'a>(
		&'a self,
		pool: &'a UserPoolId,
		username: &'a Username,
		password: &'a Password,
		permanent: bool,
	) -> DirectoryFuture<'a, ()> {
		let pools = self.pools.clone();

		Box::pin(async move { Self::set_password_now(&pools, pool, username, password, permanent) })
	}

	fn admin_initiate_auth<'a>(
		&'a self,
		pool: &'a UserPoolId,
		client: &'a AppClientId,
		username: &'a Username,
		password: &'a Password,
	) -> DirectoryFuture<'a, AuthOutcome> {
		let pools = self.pools.clone();

		Box::pin(async move { Self::initiate_auth_now(&pools, pool, client, username, password) })
	}
}

/// Checks a password against the default policy: at least eight characters with a lowercase
/// letter, an uppercase letter, a digit, and a symbol.
pub fn check_password_policy(password: &str) -> Result<(), DirectoryError> {
	let violation = if password.chars().count() < MIN_PASSWORD_LENGTH {
		Some("Password not long enough")
	} else if !password.chars().any(|c| c.is_ascii_lowercase()) {
		Some("Password must have lowercase characters")
	} else if !password.chars().any(|c| c.is_ascii_uppercase()) {
		Some("Password must have uppercase characters")
	} else if !password.chars().any(|c| c.is_ascii_digit()) {
		Some("Password must have numeric characters")
	} else if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
		Some("Password must have symbol characters")
	} else {
		None
	};

	match violation {
		Some(message) => Err(DirectoryError::InvalidPassword { message: message.into() }),
		None => Ok(()),
	}
}

fn pool_not_found(pool: &UserPoolId) -> DirectoryError {
	DirectoryError::UserPoolNotFound { message: format!("User pool {pool} does not exist") }
}

fn new_app_client_id() -> Result<AppClientId, DirectoryError> {
	AppClientId::new(random_alphanumeric(26).to_ascii_lowercase())
		.map_err(|e| DirectoryError::InvalidParameter { message: e.to_string() })
}

fn temporary_password() -> String {
	format!("{}aA1!", random_alphanumeric(8))
}

fn opaque_token(kind: &str) -> String {
	format!("{kind}.{}", random_alphanumeric(32))
}

fn random_alphanumeric(len: usize) -> String {
	rand::rng().sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::stack::cognito_stack;

	fn provisioned() -> (MemoryDirectory, UserPoolId, AppClientId) {
		let directory = MemoryDirectory::default();
		let stack = cognito_stack().expect("Literal stack must be valid.");
		let ids = directory.provision_stack(&stack).expect("Stack should provision.");
		let pool = ids.sole_user_pool().cloned().expect("One pool should be provisioned.");
		let client = ids.sole_client().cloned().expect("One client should be provisioned.");

		(directory, pool, client)
	}

	fn username(value: &str) -> Username {
		Username::new(value).expect("Username fixture should be valid.")
	}

	#[test]
	fn provisioned_ids_have_platform_shapes() {
		let (_, pool, client) = provisioned();

		assert!(pool.starts_with("us-east-1_"));
		assert_eq!(pool.len(), "us-east-1_".len() + 9);
		assert_eq!(client.len(), 26);
		assert!(client.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
	}

	#[test]
	fn password_policy_lists_first_violation() {
		assert!(check_password_policy("Sup3r!secret").is_ok());
		assert_eq!(
			check_password_policy("Sh0rt!"),
			Err(DirectoryError::InvalidPassword { message: "Password not long enough".into() })
		);
		assert!(matches!(
			check_password_policy("nouppercase1!"),
			Err(DirectoryError::InvalidPassword { .. })
		));
		assert!(matches!(
			check_password_policy("NoSymbols123"),
			Err(DirectoryError::InvalidPassword { .. })
		));
	}

	#[tokio::test]
	async fn created_users_face_a_challenge_until_confirmed() {
		let (directory, pool, client) = provisioned();
		let alice = username("alice");
		let user = directory
			.admin_create_user(&pool, &alice, Some("alice@example.com"))
			.await
			.expect("User should be created.");

		assert_eq!(user.status, UserStatus::ForceChangePassword);
		assert_eq!(user.email.as_deref(), Some("alice@example.com"));

		let temporary =
			directory.temporary_password(&pool, &alice).expect("Temporary password should exist.");
		let outcome = directory
			.admin_initiate_auth(&pool, &client, &alice, &temporary)
			.await
			.expect("Temporary password should be accepted.");

		assert_eq!(outcome, AuthOutcome::Challenge { name: NEW_PASSWORD_REQUIRED.into() });

		let password = Password::new("Sup3r!secret");

		directory
			.admin_set_user_password(&pool, &alice, &password, true)
			.await
			.expect("Permanent password should be set.");

		assert_eq!(directory.user_status(&pool, &alice), Some(UserStatus::Confirmed));
		assert!(directory.temporary_password(&pool, &alice).is_none());

		let AuthOutcome::Authenticated(tokens) = directory
			.admin_initiate_auth(&pool, &client, &alice, &password)
			.await
			.expect("Confirmed user should authenticate.")
		else {
			panic!("Confirmed user should receive tokens.");
		};

		assert_eq!(tokens.expires_in, Some(86_400));
		assert_eq!(tokens.token_type.as_deref(), Some("Bearer"));
		assert!(tokens.id_token.is_some() && tokens.refresh_token.is_some());
	}

	#[tokio::test]
	async fn duplicate_and_unknown_users_are_reported() {
		let (directory, pool, client) = provisioned();
		let bob = username("bob");

		directory.admin_create_user(&pool, &bob, None).await.expect("First create should pass.");

		assert_eq!(
			directory.admin_create_user(&pool, &bob, None).await,
			Err(DirectoryError::UsernameExists { username: "bob".into() })
		);
		assert_eq!(
			directory
				.admin_set_user_password(&pool, &username("carol"), &Password::new("x"), true)
				.await,
			Err(DirectoryError::UserNotFound { username: "carol".into() })
		);
		assert!(matches!(
			directory.admin_initiate_auth(&pool, &client, &bob, &Password::new("Wr0ng!pass")).await,
			Err(DirectoryError::NotAuthorized { .. })
		));

		let missing_pool = UserPoolId::new("us-east-1_missing").expect("Pool id should be valid.");

		assert!(matches!(
			directory.admin_create_user(&missing_pool, &bob, None).await,
			Err(DirectoryError::UserPoolNotFound { .. })
		));
	}

	#[tokio::test]
	async fn clients_without_the_admin_flow_reject_auth() {
		use crate::{
			auth::ConstructId,
			stack::{UserPoolClientProps, UserPoolProps},
		};

		let mut stack = Stack::new(ConstructId::new("NoAdmin").expect("Stack id should be valid."));
		let pool = stack
			.add_user_pool(
				ConstructId::new("Pool").expect("Pool id should be valid."),
				UserPoolProps::default(),
			)
			.expect("Pool should be declared.");

		pool.add_client(
			ConstructId::new("Client").expect("Client id should be valid."),
			UserPoolClientProps::default(),
		)
		.expect("Client should be declared.");

		let directory = MemoryDirectory::default();
		let ids = directory.provision_stack(&stack).expect("Stack should provision.");
		let pool = ids.sole_user_pool().expect("One pool should be provisioned.");
		let client = ids.sole_client().expect("One client should be provisioned.");
		let dave = username("dave");
		let password = Password::new("Sup3r!secret");

		directory.admin_create_user(pool, &dave, None).await.expect("User should be created.");
		directory
			.admin_set_user_password(pool, &dave, &password, true)
			.await
			.expect("Password should be set.");

		assert!(matches!(
			directory.admin_initiate_auth(pool, client, &dave, &password).await,
			Err(DirectoryError::InvalidParameter { .. })
		));
	}
}
