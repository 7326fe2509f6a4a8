// self
use cognito_stack::{
	error::Error,
	stack::{self, AssemblyError, MANIFEST_VERSION, USER_POOL_CLIENT_TYPE},
};

#[test]
fn assembly_directory_holds_template_and_manifest() {
	let dir = tempfile::tempdir().expect("Temporary directory should be created.");
	let out_dir = dir.path().join("nested").join("cdk.out");
	let stack = stack::cognito_stack().expect("Literal stack must be valid.");
	let assembly = stack::write_assembly(&stack, &out_dir).expect("Assembly should be written.");

	assert_eq!(assembly.directory, out_dir);
	assert_eq!(assembly.template_path, out_dir.join("CognitoCdkStack.template.json"));

	let manifest = stack::read_manifest(&out_dir).expect("Manifest should parse.");
	let artifact = &manifest.artifacts["CognitoCdkStack"];

	assert_eq!(manifest.version, MANIFEST_VERSION);
	assert_eq!(artifact.kind, "aws:cloudformation:stack");
	assert_eq!(artifact.properties.template_file, "CognitoCdkStack.template.json");

	let template =
		stack::read_template(&assembly.template_path).expect("Written template should parse.");

	assert_eq!(template.resources_of_type(USER_POOL_CLIENT_TYPE).count(), 1);
	assert_eq!(template, stack.synth());
}

#[test]
fn rewriting_an_assembly_replaces_the_previous_files() {
	let dir = tempfile::tempdir().expect("Temporary directory should be created.");
	let stack = stack::cognito_stack().expect("Literal stack must be valid.");

	stack::write_assembly(&stack, dir.path()).expect("First write should succeed.");

	let second = stack::write_assembly(&stack, dir.path()).expect("Second write should succeed.");
	let entries = std::fs::read_dir(dir.path())
		.expect("Assembly directory should be readable.")
		.filter_map(|entry| entry.ok().map(|e| e.file_name().to_string_lossy().into_owned()))
		.collect::<Vec<_>>();

	assert_eq!(entries.len(), 2, "only the template and manifest should remain: {entries:?}");
	assert!(second.manifest_path.exists());
}

#[test]
fn corrupt_manifests_are_reported() {
	let dir = tempfile::tempdir().expect("Temporary directory should be created.");

	std::fs::write(dir.path().join("manifest.json"), b"{ not json")
		.expect("Fixture manifest should be written.");

	let err = stack::read_manifest(dir.path()).expect_err("Corrupt manifests must fail.");

	assert!(matches!(err, Error::Assembly(AssemblyError::Serialization { .. })));
}
