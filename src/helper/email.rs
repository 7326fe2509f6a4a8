//! Local email format check applied before any directory call.

// std
use std::sync::LazyLock;
// crates.io
use regex::Regex;
// self
use crate::_prelude::*;

static EMAIL_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,7}\b")
		.expect("Email pattern must compile.")
});

/// Returns true when `email` starts with a plausible address.
pub fn is_valid_email(email: &str) -> bool {
	EMAIL_ADDRESS.is_match(email)
}

/// Rejects addresses that fail [`is_valid_email`].
pub fn validate_email(email: &str) -> Result<()> {
	if is_valid_email(email) {
		Ok(())
	} else {
		Err(Error::InvalidEmail { email: email.to_owned() })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn accepts_common_addresses() {
		for email in ["alice@example.com", "a.b+tag@sub.example.co.uk", "x_y%z@host.io"] {
			assert!(is_valid_email(email), "{email} should be accepted");
		}
	}

	#[test]
	fn rejects_malformed_addresses() {
		for email in ["", "alice", "alice@", "@example.com", "alice@example", "alice@example.c|m"] {
			assert!(!is_valid_email(email), "{email} should be rejected");
		}
		assert!(matches!(validate_email("nope"), Err(Error::InvalidEmail { .. })));
	}

	#[test]
	fn addresses_must_start_on_a_word_character() {
		for email in ["+a@b.com", ".a@b.com", "-alice@example.com", "%x@host.io"] {
			assert!(!is_valid_email(email), "{email} should be rejected");
		}
		assert!(is_valid_email("_alice@example.com"));
	}
}
