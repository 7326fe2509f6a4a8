//! CloudFormation logical ids derived from construct paths.

// crates.io
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, auth::ConstructId};

const MAX_LOGICAL_ID_LEN: usize = 255;
const HASH_LEN: usize = 8;

/// Logical id of a synthesized resource.
///
/// The id is the construct path with every non-alphanumeric character removed, followed by
/// eight upper-case hex characters of the SHA-256 digest of the `/`-joined path. Two
/// different paths that collapse to the same human-readable prefix still get distinct ids.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalId(String);
impl LogicalId {
	/// Computes the logical id for a construct path below the stack.
	pub fn from_path(path: &[&ConstructId]) -> Self {
		let joined = path.iter().map(|c| c.as_ref()).collect::<Vec<_>>().join("/");
		let mut human = path
			.iter()
			.flat_map(|c| c.chars())
			.filter(char::is_ascii_alphanumeric)
			.collect::<String>();

		human.truncate(MAX_LOGICAL_ID_LEN - HASH_LEN);
		human.push_str(&path_hash(&joined));

		Self(human)
	}

	/// Returns the id as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for LogicalId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Debug for LogicalId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "LogicalId({})", self.0)
	}
}
impl Display for LogicalId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl From<LogicalId> for String {
	fn from(value: LogicalId) -> Self {
		value.0
	}
}

fn path_hash(joined: &str) -> String {
	let digest = Sha256::digest(joined.as_bytes());

	digest.iter().take(HASH_LEN / 2).map(|b| format!("{b:02X}")).collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn id(value: &str) -> ConstructId {
		ConstructId::new(value).expect("Construct id fixture should be valid.")
	}

	#[test]
	fn logical_ids_are_stable_and_prefixed() {
		let pool = id("UserPool");
		let first = LogicalId::from_path(&[&pool]);
		let second = LogicalId::from_path(&[&pool]);

		assert_eq!(first, second);
		assert!(first.as_str().starts_with("UserPool"));
		assert_eq!(first.as_str().len(), "UserPool".len() + HASH_LEN);
		assert!(first.as_str()["UserPool".len()..].chars().all(|c| c.is_ascii_hexdigit()));
	}

	#[test]
	fn colliding_prefixes_get_distinct_hashes() {
		let (a, b, ab) = (id("A"), id("B"), id("AB"));

		assert_ne!(LogicalId::from_path(&[&a, &b]), LogicalId::from_path(&[&ab]));
	}

	#[test]
	fn punctuation_is_stripped() {
		let client = id("web-client.v2");

		assert!(LogicalId::from_path(&[&client]).as_str().starts_with("webclientv2"));
	}
}
