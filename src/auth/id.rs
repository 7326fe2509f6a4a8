//! Strongly typed identifiers for user pools, app clients, users, and stack constructs.

// std
use std::{borrow::Borrow, ops::Deref, sync::LazyLock};
// crates.io
use regex::Regex;
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal, $max:expr, $shape:expr) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Maximum number of characters accepted for this identifier.
			pub const MAX_LEN: usize = $max;

			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view, $max, $shape)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value, $max, $shape)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

static USER_POOL_ID_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[\w-]+_[0-9a-zA-Z]+$").expect("User pool id pattern must compile.")
});
static APP_CLIENT_ID_SHAPE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[\w+]+$").expect("App client id pattern must compile."));

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (user pool, app client, username, construct).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (user pool, app client, username, construct).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (user pool, app client, username, construct).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
	/// The identifier does not have the shape the platform issues.
	#[error("{kind} identifier `{value}` is malformed.")]
	Malformed {
		/// Kind of identifier (user pool, app client, username, construct).
		kind: &'static str,
		/// Offending value.
		value: String,
	},
}

def_id! { UserPoolId, "Identifier of a deployed user pool (`<region>_<suffix>`).", "UserPool", 55, |v| USER_POOL_ID_SHAPE.is_match(v) }
def_id! { AppClientId, "Identifier of an app client registered in a user pool.", "AppClient", 128, |v| APP_CLIENT_ID_SHAPE.is_match(v) }
def_id! { Username, "Name of a user inside a user pool.", "Username", 128, |_| true }
def_id! { ConstructId, "Identifier of a construct inside a stack definition.", "Construct", 128, |v| !v.contains('/') }

fn validate_view(
	kind: &'static str,
	view: &str,
	max: usize,
	shape: fn(&str) -> bool,
) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.chars().count() > max {
		return Err(IdentifierError::TooLong { kind, max });
	}
	if !shape(view) {
		return Err(IdentifierError::Malformed { kind, value: view.to_owned() });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn user_pool_ids_follow_region_suffix_shape() {
		let pool = UserPoolId::new("us-east-1_AbC123xyz").expect("Pool id fixture should be valid.");

		assert_eq!(pool.as_ref(), "us-east-1_AbC123xyz");
		assert!(matches!(
			UserPoolId::new("no-underscore"),
			Err(IdentifierError::Malformed { kind: "UserPool", .. })
		));
		assert!(UserPoolId::new(" us-east-1_Abc").is_err(), "Leading whitespace must be rejected.");
		assert!(UserPoolId::new("").is_err());
	}

	#[test]
	fn app_client_and_username_limits() {
		AppClientId::new("4tq9p1v0d8kq3c2m7n5b6x1z0a").expect("Client id fixture should be valid.");

		assert!(AppClientId::new("client-with-dash").is_err());
		assert!(Username::new("alice@example.com").is_ok());
		assert!(Username::new("with space").is_err());
		assert!(Username::new("a".repeat(Username::MAX_LEN + 1)).is_err());
		Username::new("a".repeat(Username::MAX_LEN)).expect("Exact length should succeed.");
	}

	#[test]
	fn construct_ids_reject_path_separators() {
		assert!(ConstructId::new("WebClient").is_ok());
		assert!(ConstructId::new("User/Pool").is_err());
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let pool: UserPoolId = serde_json::from_str("\"eu-west-1_Pool42\"")
			.expect("Pool id should deserialize successfully.");

		assert_eq!(pool.as_ref(), "eu-west-1_Pool42");
		assert!(serde_json::from_str::<UserPoolId>("\"eu-west-1 Pool42\"").is_err());
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: HashMap<Username, u8> = HashMap::from_iter([(
			Username::new("alice").expect("Username used for lookup should be valid."),
			7_u8,
		)]);

		assert_eq!(map.get("alice"), Some(&7));
	}
}
