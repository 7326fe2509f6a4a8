//! OAuth scope modeling for app clients.

// std
use std::collections::BTreeSet;
// crates.io
use serde::{Deserializer, Serializer, de::Error as DeError, ser::SerializeSeq};
// self
use crate::_prelude::*;

/// Scopes a user pool client can request.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OAuthScope {
	/// `phone`.
	Phone,
	/// `email`.
	Email,
	/// `openid`, required for ID tokens.
	OpenId,
	/// `profile`.
	Profile,
	/// `aws.cognito.signin.user.admin`, grants access to the user's own attributes.
	CognitoAdmin,
	/// Resource-server scope written as `<identifier>/<scope>`.
	Custom(String),
}
impl OAuthScope {
	/// Scopes enabled by default when a client does not declare any.
	pub const STANDARD: [OAuthScope; 5] = [
		OAuthScope::Phone,
		OAuthScope::Email,
		OAuthScope::OpenId,
		OAuthScope::Profile,
		OAuthScope::CognitoAdmin,
	];

	/// Returns the scope name used on the wire.
	pub fn as_str(&self) -> &str {
		match self {
			OAuthScope::Phone => "phone",
			OAuthScope::Email => "email",
			OAuthScope::OpenId => "openid",
			OAuthScope::Profile => "profile",
			OAuthScope::CognitoAdmin => "aws.cognito.signin.user.admin",
			OAuthScope::Custom(value) => value,
		}
	}

	/// Builds a resource-server scope.
	pub fn resource_server(identifier: &str, scope: &str) -> Self {
		OAuthScope::Custom(format!("{identifier}/{scope}"))
	}
}
impl Display for OAuthScope {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl From<OAuthScope> for String {
	fn from(value: OAuthScope) -> Self {
		value.as_str().to_owned()
	}
}

/// Normalized set of OAuth scopes.
///
/// Scopes are deduplicated and sorted so equality remains consistent regardless of
/// declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ScopeSet {
	scopes: Arc<[String]>,
}
impl ScopeSet {
	/// The five standard scopes.
	pub fn standard() -> Self {
		Self::from_scopes(OAuthScope::STANDARD)
	}

	/// Builds a set from typed scopes.
	pub fn from_scopes<I>(scopes: I) -> Self
	where
		I: IntoIterator<Item = OAuthScope>,
	{
		Self::from_names(scopes.into_iter().map(String::from))
	}

	fn from_names<I>(names: I) -> Self
	where
		I: IntoIterator<Item = String>,
	{
		let set = names.into_iter().collect::<BTreeSet<_>>();

		Self { scopes: Arc::from(set.into_iter().collect::<Vec<_>>()) }
	}

	/// Number of distinct scopes.
	pub fn len(&self) -> usize {
		self.scopes.len()
	}

	/// Returns true if no scopes are defined.
	pub fn is_empty(&self) -> bool {
		self.scopes.is_empty()
	}

	/// Returns true if the normalized set contains the provided scope.
	pub fn contains(&self, scope: &str) -> bool {
		self.scopes.binary_search_by(|candidate| candidate.as_str().cmp(scope)).is_ok()
	}

	/// Returns the underlying slice of scope strings, as emitted into `AllowedOAuthScopes`.
	pub fn as_slice(&self) -> &[String] {
		&self.scopes
	}
}
impl Serialize for ScopeSet {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut seq = serializer.serialize_seq(Some(self.scopes.len()))?;

		for scope in self.scopes.iter() {
			seq.serialize_element(scope)?;
		}

		seq.end()
	}
}
impl<'de> Deserialize<'de> for ScopeSet {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let names = <Vec<String>>::deserialize(deserializer)?;

		if let Some(bad) = names.iter().find(|n| n.is_empty() || n.chars().any(char::is_whitespace))
		{
			return Err(DeError::custom(format!("invalid scope `{bad}`")));
		}

		Ok(Self::from_names(names))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn scopes_normalize_and_dedupe() {
		let lhs = ScopeSet::from_scopes([OAuthScope::Profile, OAuthScope::OpenId, OAuthScope::OpenId]);
		let rhs = ScopeSet::from_scopes([OAuthScope::OpenId, OAuthScope::Profile]);

		assert_eq!(lhs, rhs);
		assert_eq!(lhs.as_slice(), ["openid", "profile"]);
	}

	#[test]
	fn standard_scopes_cover_all_builtins() {
		let standard = ScopeSet::standard();

		assert_eq!(standard.len(), 5);
		assert!(standard.contains("aws.cognito.signin.user.admin"));
		assert!(standard.contains("openid"));
		assert!(standard.contains("phone"));
	}

	#[test]
	fn resource_server_scopes_use_slash_notation() {
		let scope = OAuthScope::resource_server("orders", "read");
		let set = ScopeSet::from_scopes([scope, OAuthScope::OpenId]);

		assert_eq!(set.as_slice(), ["openid", "orders/read"]);
	}

	#[test]
	fn declared_scopes_deserialize_normalized() {
		let set: ScopeSet = serde_json::from_str(r#"["openid","email","openid"]"#)
			.expect("Scope list should deserialize.");

		assert_eq!(set, ScopeSet::from_scopes([OAuthScope::Email, OAuthScope::OpenId]));
		assert!(serde_json::from_str::<ScopeSet>(r#"["contains space"]"#).is_err());
		assert!(serde_json::from_str::<ScopeSet>(r#"[""]"#).is_err());
	}
}
