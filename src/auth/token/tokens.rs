//! Authentication results and token selection.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Token kinds a caller can ask for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
	/// OpenID Connect ID token.
	#[default]
	IdToken,
	/// OAuth access token.
	AccessToken,
	/// Refresh token.
	RefreshToken,
	/// Every token issued by the directory.
	#[serde(rename = "all")]
	All,
}
impl TokenType {
	/// Token kinds that map to a single issued token.
	pub const SINGLE: [TokenType; 3] =
		[TokenType::IdToken, TokenType::AccessToken, TokenType::RefreshToken];

	/// Returns the name used by the directory's authentication result.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenType::IdToken => "IdToken",
			TokenType::AccessToken => "AccessToken",
			TokenType::RefreshToken => "RefreshToken",
			TokenType::All => "all",
		}
	}
}
impl Display for TokenType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for TokenType {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"IdToken" => Ok(TokenType::IdToken),
			"AccessToken" => Ok(TokenType::AccessToken),
			"RefreshToken" => Ok(TokenType::RefreshToken),
			"all" => Ok(TokenType::All),
			other => Err(format!("unknown token type `{other}`")),
		}
	}
}

/// Tokens returned by a successful authentication, as reported by the directory.
///
/// Every field is optional because the directory omits tokens the client is not allowed to
/// receive; [`AuthenticationTokens::select`] enforces presence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationTokens {
	/// OpenID Connect ID token.
	#[serde(rename = "IdToken", skip_serializing_if = "Option::is_none")]
	pub id_token: Option<TokenSecret>,
	/// OAuth access token.
	#[serde(rename = "AccessToken", skip_serializing_if = "Option::is_none")]
	pub access_token: Option<TokenSecret>,
	/// Refresh token.
	#[serde(rename = "RefreshToken", skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<TokenSecret>,
	/// Lifetime of the access and ID tokens in seconds.
	#[serde(rename = "ExpiresIn", skip_serializing_if = "Option::is_none")]
	pub expires_in: Option<i64>,
	/// Token type reported by the directory (usually `Bearer`).
	#[serde(rename = "TokenType", skip_serializing_if = "Option::is_none")]
	pub token_type: Option<String>,
}
impl AuthenticationTokens {
	/// Returns the token of the given single kind, if issued.
	pub fn get(&self, kind: TokenType) -> Option<&TokenSecret> {
		match kind {
			TokenType::IdToken => self.id_token.as_ref(),
			TokenType::AccessToken => self.access_token.as_ref(),
			TokenType::RefreshToken => self.refresh_token.as_ref(),
			TokenType::All => None,
		}
	}

	/// Picks the requested token(s), failing when a requested token is absent.
	///
	/// [`TokenType::All`] requires all three tokens to be present.
	pub fn select(self, kind: TokenType) -> Result<TokenOutput> {
		if kind == TokenType::All {
			for single in TokenType::SINGLE {
				if self.get(single).is_none() {
					return Err(Error::MissingToken { token: single.as_str() });
				}
			}

			return Ok(TokenOutput::All(self));
		}

		let token = self.get(kind).cloned().ok_or(Error::MissingToken { token: kind.as_str() })?;

		Ok(TokenOutput::Single { kind, token })
	}
}

/// Token(s) handed back to the caller of a generate-token action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenOutput {
	/// A single token of the requested kind.
	Single {
		/// Kind that was requested.
		kind: TokenType,
		/// Issued token.
		token: TokenSecret,
	},
	/// The whole authentication result.
	All(AuthenticationTokens),
}
impl TokenOutput {
	/// Renders the output for a terminal: the raw token, or pretty JSON for all tokens.
	pub fn render(&self) -> Result<String, serde_json::Error> {
		match self {
			TokenOutput::Single { token, .. } => Ok(token.expose().to_owned()),
			TokenOutput::All(tokens) => serde_json::to_string_pretty(tokens),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn issued() -> AuthenticationTokens {
		AuthenticationTokens {
			id_token: Some(TokenSecret::new("id")),
			access_token: Some(TokenSecret::new("access")),
			refresh_token: Some(TokenSecret::new("refresh")),
			expires_in: Some(86_400),
			token_type: Some("Bearer".into()),
		}
	}

	#[test]
	fn select_single_token() {
		let output = issued().select(TokenType::AccessToken).expect("Access token was issued.");

		assert_eq!(
			output,
			TokenOutput::Single { kind: TokenType::AccessToken, token: TokenSecret::new("access") }
		);
		assert_eq!(output.render().expect("Single tokens always render."), "access");
	}

	#[test]
	fn select_all_requires_every_token() {
		let mut tokens = issued();

		tokens.refresh_token = None;

		let err = tokens.select(TokenType::All).expect_err("Missing refresh token must fail.");

		assert!(matches!(err, Error::MissingToken { token: "RefreshToken" }));
	}

	#[test]
	fn render_all_uses_wire_names() {
		let rendered = issued()
			.select(TokenType::All)
			.expect("All tokens were issued.")
			.render()
			.expect("Tokens should serialize.");

		assert!(rendered.contains("\"IdToken\": \"id\""));
		assert!(rendered.contains("\"ExpiresIn\": 86400"));
	}

	#[test]
	fn token_type_parses_wire_names() {
		assert_eq!("RefreshToken".parse::<TokenType>(), Ok(TokenType::RefreshToken));
		assert_eq!("all".parse::<TokenType>(), Ok(TokenType::All));
		assert!("id".parse::<TokenType>().is_err());
		assert_eq!(TokenType::default(), TokenType::IdToken);
	}
}
