//! CloudFormation template model, synthesis, and inspection helpers.

// crates.io
use serde_json::{Value, json};
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	stack::{LogicalId, Stack, UserPool, UserPoolClient},
};

/// Template format version emitted by the synthesizer.
pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";
/// Resource type of a user pool.
pub const USER_POOL_TYPE: &str = "AWS::Cognito::UserPool";
/// Resource type of a user pool client.
pub const USER_POOL_CLIENT_TYPE: &str = "AWS::Cognito::UserPoolClient";

const VERIFICATION_MESSAGE: &str = "The verification code to your new account is {####}";
const VERIFICATION_SUBJECT: &str = "Verify your new account";

/// A synthesized CloudFormation template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Template {
	/// Template format version.
	#[serde(rename = "AWSTemplateFormatVersion")]
	pub format_version: String,
	/// Optional description.
	#[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Resources keyed by logical id.
	#[serde(rename = "Resources", default)]
	pub resources: BTreeMap<String, Resource>,
	/// Stack outputs keyed by output name.
	#[serde(rename = "Outputs", default, skip_serializing_if = "BTreeMap::is_empty")]
	pub outputs: BTreeMap<String, Output>,
}
impl Template {
	/// Parses a template document, reporting the JSON path of any mismatch.
	pub fn from_slice(bytes: &[u8]) -> Result<Self, ConfigError> {
		let de = &mut serde_json::Deserializer::from_slice(bytes);

		serde_path_to_error::deserialize(de).map_err(|source| ConfigError::TemplateParse { source })
	}

	/// Renders the template as pretty-printed JSON.
	pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string_pretty(self)
	}

	/// Looks up a resource by logical id.
	pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
		self.resources.get(logical_id)
	}

	/// Iterates over resources of the given CloudFormation type.
	pub fn resources_of_type<'a>(
		&'a self,
		kind: &'a str,
	) -> impl Iterator<Item = (&'a str, &'a Resource)> + 'a {
		self.resources
			.iter()
			.filter(move |(_, resource)| resource.kind == kind)
			.map(|(id, resource)| (id.as_str(), resource))
	}
}

/// One resource entry of a template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resource {
	/// CloudFormation resource type.
	#[serde(rename = "Type")]
	pub kind: String,
	/// Resource properties.
	#[serde(rename = "Properties", default)]
	pub properties: serde_json::Map<String, Value>,
	/// Explicit dependencies on other logical ids.
	#[serde(rename = "DependsOn", default, skip_serializing_if = "Vec::is_empty")]
	pub depends_on: Vec<String>,
	/// Policy applied when the resource is replaced.
	#[serde(rename = "UpdateReplacePolicy", default, skip_serializing_if = "Option::is_none")]
	pub update_replace_policy: Option<String>,
	/// Policy applied when the stack is deleted.
	#[serde(rename = "DeletionPolicy", default, skip_serializing_if = "Option::is_none")]
	pub deletion_policy: Option<String>,
}
impl Resource {
	fn new(kind: &str, properties: Value) -> Self {
		let properties = match properties {
			Value::Object(map) => map,
			_ => serde_json::Map::new(),
		};

		Self {
			kind: kind.to_owned(),
			properties,
			depends_on: Vec::new(),
			update_replace_policy: None,
			deletion_policy: None,
		}
	}

	/// Returns a property value.
	pub fn property(&self, name: &str) -> Option<&Value> {
		self.properties.get(name)
	}

	/// Returns the logical id a property points at through `{"Ref": ...}`.
	pub fn ref_target(&self, name: &str) -> Option<&str> {
		self.property(name)?.get("Ref")?.as_str()
	}

	/// Returns a property holding a list of strings.
	pub fn string_list(&self, name: &str) -> Vec<&str> {
		self.property(name)
			.and_then(Value::as_array)
			.map(|items| items.iter().filter_map(Value::as_str).collect())
			.unwrap_or_default()
	}
}

/// One output entry of a template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Output {
	/// Output value, usually an intrinsic such as `{"Ref": ...}`.
	#[serde(rename = "Value")]
	pub value: Value,
	/// Optional description.
	#[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}

impl Stack {
	/// Renders the stack into a CloudFormation template.
	pub fn synth(&self) -> Template {
		let mut resources = BTreeMap::new();
		let mut outputs = BTreeMap::new();

		for pool in self.user_pools() {
			let pool_logical_id = LogicalId::from_path(&[pool.id()]);

			resources.insert(pool_logical_id.to_string(), user_pool_resource(pool));
			outputs.insert(
				output_name(&pool_logical_id),
				Output {
					value: json!({ "Ref": pool_logical_id.as_str() }),
					description: Some(format!("Id of the {} user pool.", pool.id())),
				},
			);

			for client in pool.clients() {
				let client_logical_id = LogicalId::from_path(&[pool.id(), client.id()]);

				resources.insert(
					client_logical_id.to_string(),
					user_pool_client_resource(client, &pool_logical_id),
				);
				outputs.insert(
					output_name(&client_logical_id),
					Output {
						value: json!({ "Ref": client_logical_id.as_str() }),
						description: Some(format!("Id of the {} app client.", client.id())),
					},
				);
			}
		}

		tracing::debug!(
			stack = %self.name(),
			resources = resources.len(),
			outputs = outputs.len(),
			"synthesized template"
		);

		Template {
			format_version: TEMPLATE_FORMAT_VERSION.into(),
			description: self.description().map(str::to_owned),
			resources,
			outputs,
		}
	}
}

fn user_pool_resource(pool: &UserPool) -> Resource {
	let props = pool.props();
	let recovery = props
		.account_recovery
		.mechanisms()
		.iter()
		.enumerate()
		.map(|(idx, name)| json!({ "Name": name, "Priority": idx + 1 }))
		.collect::<Vec<_>>();
	let mut resource = Resource::new(
		USER_POOL_TYPE,
		json!({
			"AccountRecoverySetting": { "RecoveryMechanisms": recovery },
			"AdminCreateUserConfig": { "AllowAdminCreateUserOnly": !props.self_sign_up_enabled },
			"EmailVerificationMessage": VERIFICATION_MESSAGE,
			"EmailVerificationSubject": VERIFICATION_SUBJECT,
			"SmsVerificationMessage": VERIFICATION_MESSAGE,
			"VerificationMessageTemplate": {
				"DefaultEmailOption": "CONFIRM_WITH_CODE",
				"EmailMessage": VERIFICATION_MESSAGE,
				"EmailSubject": VERIFICATION_SUBJECT,
				"SmsMessage": VERIFICATION_MESSAGE
			}
		}),
	);
	let policy = props.removal_policy.as_deletion_policy().to_owned();

	resource.update_replace_policy = Some(policy.clone());
	resource.deletion_policy = Some(policy);

	resource
}

fn user_pool_client_resource(client: &UserPoolClient, pool: &LogicalId) -> Resource {
	let props = client.props();
	let mut properties = serde_json::Map::new();

	properties.insert("UserPoolId".into(), json!({ "Ref": pool.as_str() }));

	if let Some(name) = &props.user_pool_client_name {
		properties.insert("ClientName".into(), json!(name));
	}

	let explicit_auth_flows = props.auth_flows.explicit_auth_flows();

	if !explicit_auth_flows.is_empty() {
		properties.insert("ExplicitAuthFlows".into(), json!(explicit_auth_flows));
	}
	if props.disable_oauth {
		properties.insert("AllowedOAuthFlowsUserPoolClient".into(), json!(false));
	} else {
		let flows = props.oauth.effective_flows();
		let callback_urls = props.oauth.effective_callback_urls();

		properties.insert("AllowedOAuthFlows".into(), json!(flows.allowed_oauth_flows()));
		properties.insert("AllowedOAuthFlowsUserPoolClient".into(), json!(!flows.is_empty()));
		properties.insert(
			"AllowedOAuthScopes".into(),
			json!(props.oauth.effective_scopes().as_slice()),
		);

		if !callback_urls.is_empty() {
			properties.insert("CallbackURLs".into(), json!(callback_urls));
		}
		if !props.oauth.logout_urls.is_empty() {
			let logout_urls = props.oauth.logout_urls.iter().map(Url::as_str).collect::<Vec<_>>();

			properties.insert("LogoutURLs".into(), json!(logout_urls));
		}
	}
	if props.generate_secret {
		properties.insert("GenerateSecret".into(), json!(true));
	}

	let providers = props.effective_identity_providers();
	let providers = providers.iter().map(|p| p.as_str()).collect::<Vec<_>>();

	properties.insert("SupportedIdentityProviders".into(), json!(providers));

	let mut units = serde_json::Map::new();

	for (property, unit_key, validity) in [
		("IdTokenValidity", "IdToken", props.id_token_validity),
		("AccessTokenValidity", "AccessToken", props.access_token_validity),
		("RefreshTokenValidity", "RefreshToken", props.refresh_token_validity),
	] {
		if let Some(validity) = validity {
			properties.insert(property.into(), json!(validity.whole_minutes()));
			units.insert(unit_key.into(), json!("minutes"));
		}
	}

	if !units.is_empty() {
		properties.insert("TokenValidityUnits".into(), Value::Object(units));
	}

	Resource::new(USER_POOL_CLIENT_TYPE, Value::Object(properties))
}

// Logical ids already carry the path hash, so distinct constructs never share an output.
fn output_name(logical_id: &LogicalId) -> String {
	format!("{logical_id}Id")
}
