//! Names that exist without being declared.
//!
//! Some serverless resource kinds create companion resources at deploy
//! time, and the pseudo parameters are always defined. References to any
//! of these must not be reported as undefined.

use std::collections::BTreeSet;

use stratus_ir::{ResourceDef, Value};

/// Pseudo parameters available in every template.
pub const PSEUDO_PARAMETERS: &[&str] = &[
    "AWS::AccountId",
    "AWS::NotificationARNs",
    "AWS::NoValue",
    "AWS::Partition",
    "AWS::Region",
    "AWS::StackId",
    "AWS::StackName",
    "AWS::URLSuffix",
];

/// Companion resources created for a resource kind: `<Name><Suffix>`.
pub const COMPANIONS: &[(&str, &[&str])] = &[
    ("AWS::Serverless::Function", &["Role"]),
    ("AWS::Serverless::StateMachine", &["Role"]),
    ("AWS::Serverless::Api", &["Deployment", "Stage"]),
    ("AWS::Serverless::HttpApi", &["ApiGatewayDefaultStage"]),
    ("AWS::Serverless::LayerVersion", &[]),
    ("AWS::Serverless::SimpleTable", &[]),
];

/// Template-wide APIs created for function events without an explicit API:
/// (event type, property naming the API, implicit resource name).
pub const IMPLICIT_APIS: &[(&str, &str, &str)] = &[
    ("Api", "RestApiId", "ServerlessRestApi"),
    ("HttpApi", "ApiId", "ServerlessHttpApi"),
];

/// Suffixes of companion resources for a kind.
pub fn companions(resource_type: &str) -> &'static [&'static str] {
    COMPANIONS
        .iter()
        .find(|(kind, _)| *kind == resource_type)
        .map(|(_, suffixes)| *suffixes)
        .unwrap_or(&[])
}

/// Implicit resource names created by one resource.
pub fn implicit_resources(name: &str, resource: &ResourceDef) -> BTreeSet<String> {
    let mut out: BTreeSet<String> = companions(&resource.resource_type)
        .iter()
        .map(|suffix| format!("{}{}", name, suffix))
        .collect();

    if resource.resource_type == "AWS::Serverless::Function"
        && let Some(events) = resource.properties.get("Events").and_then(Value::as_object)
    {
        for event in events.values() {
            let event_type = event.get("Type").and_then(Value::as_str);
            for (api_event, id_property, implicit) in IMPLICIT_APIS {
                if event_type != Some(*api_event) {
                    continue;
                }
                let explicit = event
                    .get("Properties")
                    .and_then(|p| p.get(id_property))
                    .is_some();
                if !explicit {
                    out.insert(implicit.to_string());
                }
            }
        }
    }
    out
}
