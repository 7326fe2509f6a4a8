//! Cloud assembly output: the synthesized template plus a manifest, written atomically.

// std
use std::{
	fs::{self, File},
	io::Write,
};
// self
use crate::{
	_prelude::*,
	stack::{Stack, Template},
};

/// Manifest schema version written next to the templates.
pub const MANIFEST_VERSION: &str = "36.0.0";
/// File name of the assembly manifest.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Errors raised while writing or reading a cloud assembly.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum AssemblyError {
	/// Template or manifest could not be rendered.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Filesystem failure.
	#[error("Filesystem failure: {message}.")]
	Io {
		/// Human-readable error payload.
		message: String,
	},
}

/// Manifest describing the artifacts of an assembly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyManifest {
	/// Manifest schema version.
	pub version: String,
	/// Artifacts keyed by stack name.
	pub artifacts: BTreeMap<String, ArtifactManifest>,
}

/// One stack artifact in the manifest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactManifest {
	/// Artifact type.
	#[serde(rename = "type")]
	pub kind: String,
	/// Target environment; unresolved account and region.
	pub environment: String,
	/// Artifact properties.
	pub properties: ArtifactProperties,
}

/// Properties of a stack artifact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactProperties {
	/// Template file name relative to the assembly directory.
	pub template_file: String,
}

/// Paths written by [`write_assembly`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloudAssembly {
	/// Assembly directory.
	pub directory: PathBuf,
	/// Synthesized template.
	pub template_path: PathBuf,
	/// Assembly manifest.
	pub manifest_path: PathBuf,
}

/// Synthesizes `stack` and writes its template and manifest under `out_dir`.
pub fn write_assembly(stack: &Stack, out_dir: impl Into<PathBuf>) -> Result<CloudAssembly> {
	let directory = out_dir.into();

	fs::create_dir_all(&directory).map_err(|e| AssemblyError::Io {
		message: format!("Failed to create assembly directory {}: {e}", directory.display()),
	})?;

	let template_file = format!("{}.template.json", stack.name());
	let template = stack.synth();
	let template_json = template.to_json_pretty().map_err(|e| AssemblyError::Serialization {
		message: format!("Failed to serialize template: {e}"),
	})?;
	let manifest = AssemblyManifest {
		version: MANIFEST_VERSION.into(),
		artifacts: BTreeMap::from_iter([(
			stack.name().to_string(),
			ArtifactManifest {
				kind: "aws:cloudformation:stack".into(),
				environment: "aws://unknown-account/unknown-region".into(),
				properties: ArtifactProperties { template_file: template_file.clone() },
			},
		)]),
	};
	let manifest_json =
		serde_json::to_string_pretty(&manifest).map_err(|e| AssemblyError::Serialization {
			message: format!("Failed to serialize manifest: {e}"),
		})?;
	let template_path = directory.join(&template_file);
	let manifest_path = directory.join(MANIFEST_FILE);

	write_atomically(&template_path, template_json.as_bytes())?;
	write_atomically(&manifest_path, manifest_json.as_bytes())?;

	tracing::info!(
		stack = %stack.name(),
		template = %template_path.display(),
		resources = template.resources.len(),
		"wrote cloud assembly"
	);

	Ok(CloudAssembly { directory, template_path, manifest_path })
}

/// Reads a template written by [`write_assembly`].
pub fn read_template(path: impl AsRef<Path>) -> Result<Template> {
	let path = path.as_ref();
	let bytes = fs::read(path).map_err(|e| AssemblyError::Io {
		message: format!("Failed to read {}: {e}", path.display()),
	})?;

	Ok(Template::from_slice(&bytes)?)
}

/// Reads the manifest of an assembly directory.
pub fn read_manifest(directory: impl AsRef<Path>) -> Result<AssemblyManifest> {
	let path = directory.as_ref().join(MANIFEST_FILE);
	let bytes = fs::read(&path).map_err(|e| AssemblyError::Io {
		message: format!("Failed to read {}: {e}", path.display()),
	})?;

	serde_json::from_slice(&bytes).map_err(|e| {
		AssemblyError::Serialization { message: format!("Failed to parse {}: {e}", path.display()) }
			.into()
	})
}

fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), AssemblyError> {
	let mut tmp_path = path.to_path_buf();

	tmp_path.set_extension("tmp");

	{
		let mut file = File::create(&tmp_path).map_err(|e| AssemblyError::Io {
			message: format!("Failed to create {}: {e}", tmp_path.display()),
		})?;

		file.write_all(contents).map_err(|e| AssemblyError::Io {
			message: format!("Failed to write {}: {e}", tmp_path.display()),
		})?;
		file.sync_all().map_err(|e| AssemblyError::Io {
			message: format!("Failed to sync {}: {e}", tmp_path.display()),
		})?;
	}

	fs::rename(&tmp_path, path).map_err(|e| AssemblyError::Io {
		message: format!("Failed to replace {}: {e}", path.display()),
	})
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::stack::cognito_stack;

	#[test]
	fn assembly_round_trips_through_the_parser() {
		let dir = tempfile::tempdir().expect("Temporary directory should be created.");
		let stack = cognito_stack().expect("Literal stack must be valid.");
		let assembly = write_assembly(&stack, dir.path().join("cdk.out"))
			.expect("Assembly should be written.");

		assert!(assembly.template_path.ends_with("CognitoCdkStack.template.json"));
		assert_eq!(
			read_template(&assembly.template_path).expect("Template should parse back."),
			stack.synth()
		);

		let manifest = read_manifest(&assembly.directory).expect("Manifest should parse back.");

		assert_eq!(
			manifest.artifacts["CognitoCdkStack"].properties.template_file,
			"CognitoCdkStack.template.json"
		);
		assert!(!assembly.directory.join("CognitoCdkStack.template.tmp").exists());
	}

	#[test]
	fn reading_a_missing_template_is_an_io_error() {
		let dir = tempfile::tempdir().expect("Temporary directory should be created.");
		let err = read_template(dir.path().join("absent.json"))
			.expect_err("Missing templates must fail.");

		assert!(matches!(err, Error::Assembly(AssemblyError::Io { .. })));
	}
}
