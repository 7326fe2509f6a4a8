//! Synthesizes the Cognito stack, provisions it into the in-memory directory, and runs the
//! full helper flow (create, confirm, generate tokens) with scripted answers.

// std
use std::sync::Arc;
// crates.io
use color_eyre::{Result, eyre::eyre};
// self
use cognito_stack::{
	auth::{TokenType, Username},
	config::HelperConfig,
	helper::{Action, Helper, ScriptedPrompt},
	idp::MemoryDirectory,
	stack::{self, USER_POOL_CLIENT_TYPE},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let stack = stack::cognito_stack()?;
	let template = stack.synth();

	for (logical_id, client) in template.resources_of_type(USER_POOL_CLIENT_TYPE) {
		println!("{logical_id}: flows {:?}", client.string_list("AllowedOAuthFlows"));
	}

	let directory = MemoryDirectory::default();
	let ids = directory.provision(&template)?;
	let user_pool_id =
		ids.sole_user_pool().cloned().ok_or_else(|| eyre!("Expected exactly one user pool."))?;
	let client_id =
		ids.sole_client().cloned().ok_or_else(|| eyre!("Expected exactly one app client."))?;
	let config = HelperConfig::new(user_pool_id)
		.with_client_id(client_id)
		.with_username(Username::new("demo-admin")?)
		.with_email("demo-admin@example.com")
		.with_token_type(TokenType::All);
	let prompt = ScriptedPrompt::new().with_secret("Demo!Passw0rd").with_secret("Demo!Passw0rd");
	let helper = Helper::new(Arc::new(directory), Arc::new(prompt), config);
	let report = helper.run(Action::FullFlow).await?;

	if let Some(tokens) = report.tokens {
		println!("Auth Token:");
		println!("{}", tokens.render()?);
	}

	Ok(())
}
