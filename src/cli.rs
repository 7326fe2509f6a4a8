//! Command-line front end: `synth` plus one subcommand per helper action.

// std
use std::time::Instant;
// crates.io
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::WrapErr;
// self
use crate::{
	_prelude::*,
	auth::{AppClientId, TokenType, UserPoolId, Username},
	config::{DEFAULT_AWS_PROFILE, DEFAULT_OUT_DIR, DirectoryConfig, HelperConfig, SynthConfig},
	helper::{Action, Helper, TerminalPrompt},
	idp::CognitoDirectory,
	obs::{ActionKind, ActionSpan},
	stack::{self, write_assembly},
};

/// Parsed command line.
#[derive(Debug, Parser)]
#[command(name = "cognito-stack", version, about)]
pub struct Cli {
	/// Debug log output.
	#[arg(short, long, global = true)]
	pub verbose: bool,
	/// What to do.
	#[command(subcommand)]
	pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
	/// Synthesize the stack into a cloud assembly directory.
	Synth(SynthArgs),
	/// Create an admin user and set its permanent password.
	CreateNewUser(ActionArgs),
	/// Create an admin user with a temporary password.
	CreateUser(ActionArgs),
	/// Create and confirm an admin user, then print its token(s).
	FullFlow(ActionArgs),
	/// Print token(s) for an existing user.
	GenerateToken(ActionArgs),
	/// Set the permanent password of an existing user.
	ConfirmUser(ActionArgs),
}
impl Command {
	/// Helper action and its arguments, unless this is `synth`.
	pub fn action(&self) -> Option<(Action, &ActionArgs)> {
		match self {
			Command::Synth(_) => None,
			Command::CreateNewUser(args) => Some((Action::CreateNewUser, args)),
			Command::CreateUser(args) => Some((Action::CreateUser, args)),
			Command::FullFlow(args) => Some((Action::FullFlow, args)),
			Command::GenerateToken(args) => Some((Action::GenerateToken, args)),
			Command::ConfirmUser(args) => Some((Action::ConfirmUser, args)),
		}
	}
}

/// Arguments of `synth`.
#[derive(Debug, Args)]
pub struct SynthArgs {
	/// Cloud assembly output directory.
	#[arg(short, long, default_value = DEFAULT_OUT_DIR)]
	pub out: PathBuf,
}
impl From<&SynthArgs> for SynthConfig {
	fn from(args: &SynthArgs) -> Self {
		Self { out_dir: args.out.clone() }
	}
}

/// Arguments shared by the helper actions.
#[derive(Debug, Args)]
pub struct ActionArgs {
	/// Username.
	#[arg(short, long)]
	pub username: Option<Username>,
	/// Email for the user.
	#[arg(short = 'e', long = "user-email")]
	pub email: Option<String>,
	/// User pool id.
	#[arg(long, visible_alias = "uid", env = "COGNITO_USER_POOL_ID")]
	pub user_pool_id: UserPoolId,
	/// App client id.
	#[arg(short, long)]
	pub client_id: Option<AppClientId>,
	/// AWS profile used for the API calls.
	#[arg(short = 'p', long, env = "AWS_PROFILE", default_value = DEFAULT_AWS_PROFILE)]
	pub aws_profile: String,
	/// Region override; defaults to the profile's region.
	#[arg(long)]
	pub region: Option<String>,
	/// Which token type to print (`IdToken`, `AccessToken`, `RefreshToken`, or `all`).
	#[arg(short, long, default_value_t = TokenType::IdToken)]
	pub token_type: TokenType,
}
impl ActionArgs {
	/// Connection settings for the directory.
	pub fn directory_config(&self) -> DirectoryConfig {
		DirectoryConfig { aws_profile: self.aws_profile.clone(), region: self.region.clone() }
	}

	/// Inputs for the helper.
	pub fn helper_config(&self) -> HelperConfig {
		let mut config =
			HelperConfig::new(self.user_pool_id.clone()).with_token_type(self.token_type);

		config.client_id = self.client_id.clone();
		config.username = self.username.clone();
		config.email = self.email.clone();

		config
	}
}

/// Runs the parsed command line and logs the total elapsed time.
pub async fn run(cli: Cli) -> color_eyre::Result<()> {
	let started = Instant::now();

	if let Some((action, args)) = cli.command.action() {
		run_action(action, args).await?;
	} else if let Command::Synth(args) = &cli.command {
		synth(&SynthConfig::from(args))?;
	}

	tracing::info!(elapsed = ?started.elapsed(), "total time elapsed");

	Ok(())
}

/// Writes the cloud assembly of the declared stack.
pub fn synth(config: &SynthConfig) -> color_eyre::Result<()> {
	let _span = ActionSpan::new(ActionKind::Synth, "write_assembly").entered();
	let stack = stack::cognito_stack()?;
	let assembly = write_assembly(&stack, config.out_dir.clone())?;

	println!("{}", assembly.template_path.display());

	Ok(())
}

async fn run_action(action: Action, args: &ActionArgs) -> color_eyre::Result<()> {
	let directory_config = args.directory_config();

	tracing::info!(profile = %directory_config.aws_profile, "AWS profile being used");

	let directory = CognitoDirectory::connect(&directory_config).await;
	let helper = Helper::new(Arc::new(directory), Arc::new(TerminalPrompt), args.helper_config());
	let report = helper.run(action).await?;

	if let Some(tokens) = report.tokens {
		println!("Auth Token:");
		println!("{}", tokens.render().wrap_err("Failed to render the issued tokens.")?);
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// crates.io
	use clap::CommandFactory;
	// self
	use super::*;

	#[test]
	fn command_line_is_well_formed() {
		Cli::command().debug_assert();
	}

	#[test]
	fn action_arguments_become_helper_config() {
		let cli = Cli::try_parse_from([
			"cognito-stack",
			"full-flow",
			"--user-pool-id",
			"us-east-1_abc123",
			"-u",
			"alice",
			"-e",
			"alice@example.com",
			"-c",
			"1example23456789",
			"-p",
			"sandbox",
			"-t",
			"all",
		])
		.expect("Arguments should parse.");
		let (action, args) = cli.command.action().expect("full-flow is a helper action.");
		let config = args.helper_config();

		assert_eq!(action, Action::FullFlow);
		assert_eq!(config.username.as_deref(), Some("alice"));
		assert_eq!(config.email.as_deref(), Some("alice@example.com"));
		assert_eq!(config.token_type, TokenType::All);
		assert_eq!(args.directory_config().aws_profile, "sandbox");
	}

	#[test]
	fn synth_defaults_to_cdk_out() {
		let cli = Cli::try_parse_from(["cognito-stack", "synth"]).expect("Arguments should parse.");

		let Command::Synth(args) = &cli.command else {
			panic!("synth should parse into the synth command.");
		};

		assert_eq!(SynthConfig::from(args).out_dir, PathBuf::from("cdk.out"));
		assert!(cli.command.action().is_none());
	}

	#[test]
	fn malformed_pool_ids_are_rejected_at_parse_time() {
		assert!(
			Cli::try_parse_from(["cognito-stack", "create-user", "--user-pool-id", "nounderscore"])
				.is_err()
		);
	}
}
