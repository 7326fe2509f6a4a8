//! App client construct and its builder.

// self
use crate::{
	_prelude::*,
	auth::{ConstructId, OAuthScope, ScopeSet},
	stack::StackDefinitionError,
};

/// Callback URL used when a browser grant is enabled without any callback URL.
pub const DEFAULT_CALLBACK_URL: &str = "https://example.com";

/// Shortest ID/access token lifetime the platform accepts.
pub const MIN_TOKEN_VALIDITY: Duration = Duration::minutes(5);
/// Longest ID/access token lifetime the platform accepts.
pub const MAX_TOKEN_VALIDITY: Duration = Duration::days(1);
/// Shortest refresh token lifetime the platform accepts.
pub const MIN_REFRESH_TOKEN_VALIDITY: Duration = Duration::minutes(60);
/// Longest refresh token lifetime the platform accepts.
pub const MAX_REFRESH_TOKEN_VALIDITY: Duration = Duration::days(3650);

/// Explicit (non-OAuth) authentication flows a client may use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthFlows {
	/// Server-side `ADMIN_USER_PASSWORD_AUTH` with administrator credentials.
	pub admin_user_password: bool,
	/// Custom challenge (Lambda triggered) authentication.
	pub custom: bool,
	/// Plain `USER_PASSWORD_AUTH`.
	pub user_password: bool,
	/// Secure remote password authentication.
	pub user_srp: bool,
}
impl AuthFlows {
	/// Returns true when no flow is enabled.
	pub fn is_empty(self) -> bool {
		!self.admin_user_password && !self.custom && !self.user_password && !self.user_srp
	}

	/// `ExplicitAuthFlows` values; refresh-token auth is implied by any other flow.
	pub fn explicit_auth_flows(self) -> Vec<&'static str> {
		let mut flows = Vec::new();

		if self.admin_user_password {
			flows.push("ALLOW_ADMIN_USER_PASSWORD_AUTH");
		}
		if self.custom {
			flows.push("ALLOW_CUSTOM_AUTH");
		}
		if self.user_password {
			flows.push("ALLOW_USER_PASSWORD_AUTH");
		}
		if self.user_srp {
			flows.push("ALLOW_USER_SRP_AUTH");
		}
		if !flows.is_empty() {
			flows.push("ALLOW_REFRESH_TOKEN_AUTH");
		}

		flows
	}
}

/// OAuth grant flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthFlows {
	/// Authorization-code grant.
	pub authorization_code_grant: bool,
	/// Implicit grant.
	pub implicit_code_grant: bool,
	/// Client-credentials grant.
	pub client_credentials: bool,
}
impl OAuthFlows {
	/// Flags enabled when a client does not declare its OAuth flows.
	pub const BROWSER_DEFAULT: OAuthFlows = OAuthFlows {
		authorization_code_grant: true,
		implicit_code_grant: true,
		client_credentials: false,
	};

	/// Returns true when no grant is enabled.
	pub fn is_empty(self) -> bool {
		!self.authorization_code_grant && !self.implicit_code_grant && !self.client_credentials
	}

	/// Returns true when a grant that redirects a browser is enabled.
	pub fn uses_callbacks(self) -> bool {
		self.authorization_code_grant || self.implicit_code_grant
	}

	/// `AllowedOAuthFlows` values.
	pub fn allowed_oauth_flows(self) -> Vec<&'static str> {
		let mut flows = Vec::new();

		if self.authorization_code_grant {
			flows.push("code");
		}
		if self.implicit_code_grant {
			flows.push("implicit");
		}
		if self.client_credentials {
			flows.push("client_credentials");
		}

		flows
	}
}

/// OAuth configuration as declared; unset fields fall back to platform defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthSettings {
	/// Enabled grants; defaults to [`OAuthFlows::BROWSER_DEFAULT`].
	pub flows: Option<OAuthFlows>,
	/// Allowed scopes; defaults to [`ScopeSet::standard`].
	pub scopes: Option<ScopeSet>,
	/// Redirect targets after sign-in; defaults to [`DEFAULT_CALLBACK_URL`] for browser grants.
	pub callback_urls: Option<Vec<Url>>,
	/// Redirect targets after sign-out.
	pub logout_urls: Vec<Url>,
}
impl OAuthSettings {
	/// Grants after defaults are applied.
	pub fn effective_flows(&self) -> OAuthFlows {
		self.flows.unwrap_or(OAuthFlows::BROWSER_DEFAULT)
	}

	/// Scopes after defaults are applied.
	pub fn effective_scopes(&self) -> ScopeSet {
		self.scopes.clone().unwrap_or_else(ScopeSet::standard)
	}

	/// Callback URLs after defaults are applied.
	pub fn effective_callback_urls(&self) -> Vec<String> {
		match &self.callback_urls {
			Some(urls) => urls.iter().map(Url::to_string).collect(),
			None if self.effective_flows().uses_callbacks() => vec![DEFAULT_CALLBACK_URL.into()],
			None => Vec::new(),
		}
	}
}

/// Identity providers users of a client may sign in with.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityProviderKind {
	/// Users stored in the pool itself.
	Cognito,
	/// Facebook federation.
	Facebook,
	/// Google federation.
	Google,
	/// Login with Amazon federation.
	Amazon,
	/// Sign in with Apple federation.
	Apple,
	/// A SAML or OIDC provider registered under this name.
	Custom(String),
}
impl IdentityProviderKind {
	/// Provider name used by `SupportedIdentityProviders`.
	pub fn as_str(&self) -> &str {
		match self {
			IdentityProviderKind::Cognito => "COGNITO",
			IdentityProviderKind::Facebook => "Facebook",
			IdentityProviderKind::Google => "Google",
			IdentityProviderKind::Amazon => "LoginWithAmazon",
			IdentityProviderKind::Apple => "SignInWithApple",
			IdentityProviderKind::Custom(name) => name,
		}
	}
}

/// Declared properties of an app client.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPoolClientProps {
	/// Display name of the client.
	pub user_pool_client_name: Option<String>,
	/// ID token lifetime.
	pub id_token_validity: Option<Duration>,
	/// Access token lifetime.
	pub access_token_validity: Option<Duration>,
	/// Refresh token lifetime.
	pub refresh_token_validity: Option<Duration>,
	/// Explicit authentication flows.
	pub auth_flows: AuthFlows,
	/// OAuth configuration.
	pub oauth: OAuthSettings,
	/// Turns OAuth off entirely, ignoring [`UserPoolClientProps::oauth`].
	pub disable_oauth: bool,
	/// Supported identity providers; empty means `[Cognito]`.
	pub supported_identity_providers: Vec<IdentityProviderKind>,
	/// Generates a client secret (confidential client).
	pub generate_secret: bool,
}
impl UserPoolClientProps {
	/// Creates a builder with every property unset.
	pub fn builder() -> UserPoolClientPropsBuilder {
		UserPoolClientPropsBuilder::default()
	}

	/// Identity providers after defaults are applied.
	pub fn effective_identity_providers(&self) -> Vec<IdentityProviderKind> {
		if self.supported_identity_providers.is_empty() {
			vec![IdentityProviderKind::Cognito]
		} else {
			self.supported_identity_providers.clone()
		}
	}

	/// Checks the constraints enforced before a template is emitted.
	pub fn validate(&self) -> Result<(), StackDefinitionError> {
		let tokens = [
			("IdToken", self.id_token_validity, MIN_TOKEN_VALIDITY, MAX_TOKEN_VALIDITY),
			("AccessToken", self.access_token_validity, MIN_TOKEN_VALIDITY, MAX_TOKEN_VALIDITY),
			(
				"RefreshToken",
				self.refresh_token_validity,
				MIN_REFRESH_TOKEN_VALIDITY,
				MAX_REFRESH_TOKEN_VALIDITY,
			),
		];

		for (token, validity, min, max) in tokens {
			let Some(validity) = validity else { continue };

			validate_validity(token, validity, min, max)?;
		}

		if let Some(refresh) = self.refresh_token_validity {
			for (token, validity) in
				[("IdToken", self.id_token_validity), ("AccessToken", self.access_token_validity)]
			{
				if validity.is_some_and(|v| v > refresh) {
					return Err(StackDefinitionError::ValidityExceedsRefresh { token });
				}
			}
		}

		if !self.disable_oauth
			&& self.oauth.effective_flows().uses_callbacks()
			&& self.oauth.callback_urls.as_ref().is_some_and(Vec::is_empty)
		{
			return Err(StackDefinitionError::EmptyCallbackUrls);
		}

		Ok(())
	}
}

fn validate_validity(
	token: &'static str,
	validity: Duration,
	min: Duration,
	max: Duration,
) -> Result<(), StackDefinitionError> {
	if validity < min || validity > max {
		return Err(StackDefinitionError::TokenValidityOutOfRange {
			token,
			minutes: validity.whole_minutes(),
			min_minutes: min.whole_minutes(),
			max_minutes: max.whole_minutes(),
		});
	}
	if validity.whole_seconds() % 60 != 0 || validity.subsec_nanoseconds() != 0 {
		return Err(StackDefinitionError::FractionalMinutes { token });
	}

	Ok(())
}

/// Builder for [`UserPoolClientProps`].
#[derive(Debug, Default)]
pub struct UserPoolClientPropsBuilder {
	props: UserPoolClientProps,
}
impl UserPoolClientPropsBuilder {
	/// Sets the client display name.
	pub fn name(mut self, name: impl Into<String>) -> Self {
		self.props.user_pool_client_name = Some(name.into());

		self
	}

	/// Sets the ID token lifetime.
	pub fn id_token_validity(mut self, validity: Duration) -> Self {
		self.props.id_token_validity = Some(validity);

		self
	}

	/// Sets the access token lifetime.
	pub fn access_token_validity(mut self, validity: Duration) -> Self {
		self.props.access_token_validity = Some(validity);

		self
	}

	/// Sets the refresh token lifetime.
	pub fn refresh_token_validity(mut self, validity: Duration) -> Self {
		self.props.refresh_token_validity = Some(validity);

		self
	}

	/// Overrides the explicit authentication flows.
	pub fn auth_flows(mut self, flows: AuthFlows) -> Self {
		self.props.auth_flows = flows;

		self
	}

	/// Declares the OAuth grants.
	pub fn oauth_flows(mut self, flows: OAuthFlows) -> Self {
		self.props.oauth.flows = Some(flows);

		self
	}

	/// Declares the OAuth scopes.
	pub fn oauth_scopes<I>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = OAuthScope>,
	{
		self.props.oauth.scopes = Some(ScopeSet::from_scopes(scopes));

		self
	}

	/// Declares the callback URLs; an empty list is rejected for browser grants.
	pub fn callback_urls<I>(mut self, urls: I) -> Self
	where
		I: IntoIterator<Item = Url>,
	{
		self.props.oauth.callback_urls = Some(urls.into_iter().collect());

		self
	}

	/// Declares the sign-out URLs.
	pub fn logout_urls<I>(mut self, urls: I) -> Self
	where
		I: IntoIterator<Item = Url>,
	{
		self.props.oauth.logout_urls = urls.into_iter().collect();

		self
	}

	/// Turns OAuth off for the client.
	pub fn disable_oauth(mut self) -> Self {
		self.props.disable_oauth = true;

		self
	}

	/// Adds a supported identity provider.
	pub fn identity_provider(mut self, provider: IdentityProviderKind) -> Self {
		if !self.props.supported_identity_providers.contains(&provider) {
			self.props.supported_identity_providers.push(provider);
		}

		self
	}

	/// Requests a client secret.
	pub fn generate_secret(mut self, generate: bool) -> Self {
		self.props.generate_secret = generate;

		self
	}

	/// Consumes the builder and validates the resulting properties.
	pub fn build(self) -> Result<UserPoolClientProps, StackDefinitionError> {
		self.props.validate()?;

		Ok(self.props)
	}
}

/// An app client bound to a [`UserPool`](crate::stack::UserPool).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserPoolClient {
	id: ConstructId,
	props: UserPoolClientProps,
}
impl UserPoolClient {
	pub(crate) fn new(id: ConstructId, props: UserPoolClientProps) -> Self {
		Self { id, props }
	}

	/// Construct id of the client.
	pub fn id(&self) -> &ConstructId {
		&self.id
	}

	/// Declared client properties.
	pub fn props(&self) -> &UserPoolClientProps {
		&self.props
	}
}
