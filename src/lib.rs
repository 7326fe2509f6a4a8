//! Declare a Cognito user pool with an authorization-code web client, synthesize it into a
//! CloudFormation template, and drive the pool's admin users and tokens from one crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
#[cfg(feature = "cli")] pub mod cli;
pub mod config;
pub mod error;
pub mod helper;
pub mod idp;
pub mod obs;
pub mod stack;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		path::{Path, PathBuf},
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::Duration;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use url;
#[cfg(feature = "cli")] use tokio as _;
#[cfg(test)] use {color_eyre as _, tempfile as _};
