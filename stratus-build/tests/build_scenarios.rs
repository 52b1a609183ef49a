//! End-to-end builds over small declaration graphs.

use indexmap::IndexMap;
use serde_json::json;
use stratus_build::{
    AttrRefUsage, Declarations, DiscoveredItem, DiscoveredOutput, DiscoveredResource, Error,
    SourceLocation, TemplateBuilder, VarAttrRefInfo,
};
use stratus_ir::Value;

fn value(json: serde_json::Value) -> Value {
    Value::from_json(&json).expect("valid value")
}

fn bucket_and_function() -> Declarations {
    let mut decls = Declarations::default();
    decls.resources.push(DiscoveredResource::new("ProcessorFunction", "lambda.Function")
        .depends("DataBucket")
        .attr_ref(AttrRefUsage::new("DataBucket", "Arn", "Role")));
    decls.resources.push(DiscoveredResource::new("DataBucket", "s3.Bucket"));
    decls.values.insert(
        "ProcessorFunction".into(),
        value(json!({ "Role": { "Fn::GetAtt": ["", "Arn"] }, "Runtime": "python3.12" })),
    );
    decls.values.insert("DataBucket".into(), value(json!({ "BucketName": "data" })));
    decls
}

#[test]
fn test_bucket_and_function() {
    let decls = bucket_and_function();
    let builder = TemplateBuilder::new(&decls);

    assert_eq!(builder.order().unwrap(), vec!["DataBucket", "ProcessorFunction"]);

    let template = builder.build().unwrap();
    let doc = template.to_json();
    assert_eq!(
        doc["Resources"]["ProcessorFunction"]["Properties"]["Role"],
        json!({ "Fn::GetAtt": ["DataBucket", "Arn"] })
    );
    assert_eq!(doc["Resources"]["ProcessorFunction"]["Type"], "AWS::Lambda::Function");
    assert_eq!(doc["AWSTemplateFormatVersion"], "2010-09-09");
    assert!(doc.get("Transform").is_none());

    let names: Vec<&String> = template.resources.keys().collect();
    assert_eq!(names, vec!["DataBucket", "ProcessorFunction"]);
}

#[test]
fn test_builds_are_byte_identical() {
    let decls = bucket_and_function();
    let first = serde_json::to_string_pretty(&TemplateBuilder::new(&decls).build().unwrap()).unwrap();
    let second = serde_json::to_string_pretty(&TemplateBuilder::new(&decls).build().unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_transform_marker() {
    let mut decls = Declarations::default();
    decls.resources.push(DiscoveredResource::new("Api", "serverless.Function"));
    let template = TemplateBuilder::new(&decls).build().unwrap();
    assert_eq!(
        template.to_json()["Transform"],
        json!("AWS::Serverless-2016-10-31")
    );
    assert!(template.has_serverless_transform());
}

#[test]
fn test_cycle_is_rejected_with_locations() {
    let mut decls = Declarations::default();
    for (name, dep, line) in [("A", "B", 3), ("B", "C", 7), ("C", "A", 11)] {
        decls.resources.push(
            DiscoveredResource::new(name, "sqs.Queue")
                .at(SourceLocation::new("queues.rs", line))
                .depends(dep),
        );
    }

    let err = TemplateBuilder::new(&decls).build().unwrap_err();
    let Error::Cycle(cycle) = *err else {
        panic!("expected a cycle error");
    };
    let mut names = cycle.names();
    names.sort();
    assert_eq!(names, vec!["A", "B", "C"]);
    assert!(cycle.to_string().contains("A (queues.rs:3)"));
}

#[test]
fn test_unknown_type_aborts() {
    let mut decls = Declarations::default();
    decls.resources.push(
        DiscoveredResource::new("Thing", "nosuch.Widget").at(SourceLocation::new("misc.rs", 9)),
    );
    let err = TemplateBuilder::new(&decls).build().unwrap_err();
    assert_eq!(
        err.to_string(),
        "unknown resource type 'nosuch.Widget' for 'Thing' at misc.rs:9"
    );
}

#[test]
fn test_outputs_and_exports() {
    let mut decls = bucket_and_function();
    decls.outputs.push(DiscoveredOutput {
        name: "BucketArn".into(),
        value: value(json!({ "Fn::GetAtt": ["", "Arn"] })),
        export_name: Some(Value::from("shared-bucket-arn")),
        attr_refs: vec![AttrRefUsage::new("DataBucket", "Arn", "Value")],
        ..Default::default()
    });
    decls.outputs.push(DiscoveredOutput {
        name: "FunctionName".into(),
        description: Some("processor".into()),
        value: Value::reference("ProcessorFunction"),
        export: Some(value(json!({ "Name": { "Fn::Sub": "${AWS::StackName}-fn" } }))),
        ..Default::default()
    });

    let doc = TemplateBuilder::new(&decls).build().unwrap().to_json();
    assert_eq!(
        doc["Outputs"]["BucketArn"],
        json!({
            "Value": { "Fn::GetAtt": ["DataBucket", "Arn"] },
            "Export": { "Name": "shared-bucket-arn" }
        })
    );
    assert_eq!(
        doc["Outputs"]["FunctionName"],
        json!({
            "Description": "processor",
            "Value": { "Ref": "ProcessorFunction" },
            "Export": { "Name": { "Fn::Sub": "${AWS::StackName}-fn" } }
        })
    );
}

#[test]
fn test_output_value_through_forwarded_declaration() {
    let mut decls = Declarations::default();
    decls.resources.push(DiscoveredResource::new("Bucket", "s3.Bucket"));
    decls.outputs.push(DiscoveredOutput {
        name: "Output".into(),
        value: value(json!({ "Fn::GetAtt": ["", "Arn"] })),
        ..Default::default()
    });
    decls.vars.insert(
        "Output".into(),
        VarAttrRefInfo {
            attr_refs: vec![],
            var_refs: IndexMap::from([("Value".to_string(), "Helper".to_string())]),
        },
    );
    decls.vars.insert(
        "Helper".into(),
        VarAttrRefInfo {
            attr_refs: vec![AttrRefUsage::new("Bucket", "Arn", "")],
            var_refs: IndexMap::new(),
        },
    );

    let doc = TemplateBuilder::new(&decls).build().unwrap().to_json();
    assert_eq!(
        doc["Outputs"]["Output"]["Value"],
        json!({ "Fn::GetAtt": ["Bucket", "Arn"] })
    );
}

#[test]
fn test_nested_output_value_is_repaired_by_path() {
    let mut decls = Declarations::default();
    decls.resources.push(DiscoveredResource::new("Queue", "sqs.Queue"));
    decls.outputs.push(DiscoveredOutput {
        name: "QueueUrl".into(),
        value: value(json!({ "Fn::Join": ["", ["https://", { "Fn::GetAtt": ["", "QueueUrl"] }]] })),
        attr_refs: vec![AttrRefUsage::new("Queue", "QueueUrl", "Value.Values")],
        ..Default::default()
    });

    let doc = TemplateBuilder::new(&decls).build().unwrap().to_json();
    assert_eq!(
        doc["Outputs"]["QueueUrl"]["Value"],
        json!({ "Fn::Join": ["", ["https://", { "Fn::GetAtt": ["Queue", "QueueUrl"] }]] })
    );
}

#[test]
fn test_duplicate_names_rejected() {
    let mut decls = Declarations::default();
    decls.resources.push(DiscoveredResource::new("Dup", "s3.Bucket"));
    decls.resources.push(
        DiscoveredResource::new("Dup", "sqs.Queue").at(SourceLocation::new("queues.rs", 4)),
    );
    let err = TemplateBuilder::new(&decls).build().unwrap_err();
    assert_eq!(
        err.to_string(),
        "logical name 'Dup' is declared in both Resources and Resources at queues.rs:4"
    );

    let mut decls = bucket_and_function();
    decls.outputs.push(DiscoveredOutput {
        name: "DataBucket".into(),
        value: Value::reference("DataBucket"),
        ..Default::default()
    });
    let err = TemplateBuilder::new(&decls).build().unwrap_err();
    match *err {
        Error::DuplicateName { name, first, second, .. } => {
            assert_eq!(name, "DataBucket");
            assert_eq!(first, "Resources");
            assert_eq!(second, "Outputs");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_invalid_name_rejected() {
    let mut decls = Declarations::default();
    decls.resources.push(DiscoveredResource::new("My-Bucket", "s3.Bucket"));
    let err = TemplateBuilder::new(&decls).order().unwrap_err();
    match *err {
        Error::InvalidName { name, section, reason, .. } => {
            assert_eq!(name, "My-Bucket");
            assert_eq!(section, "Resources");
            assert_eq!(reason, "name contains punctuation or spaces");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_parameters_mappings_conditions() {
    let mut decls = bucket_and_function();
    decls.parameters.push(DiscoveredItem::new("Env"));
    decls.mappings.push(DiscoveredItem::new("RegionMap"));
    decls.conditions.push(DiscoveredItem::new("IsProd"));
    decls.values.insert(
        "Env".into(),
        value(json!({ "Type": "String", "Default": "dev", "AllowedValues": ["dev", "prod"] })),
    );
    decls.values.insert(
        "RegionMap".into(),
        value(json!({ "us-east-1": { "AMI": "ami-123" } })),
    );
    decls.values.insert(
        "IsProd".into(),
        value(json!({ "Fn::Equals": [{ "Ref": "Env" }, "prod"] })),
    );

    let doc = TemplateBuilder::new(&decls).build().unwrap().to_json();
    let keys: Vec<&str> = doc.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["AWSTemplateFormatVersion", "Parameters", "Mappings", "Conditions", "Resources"]
    );
    assert_eq!(
        doc["Parameters"]["Env"],
        json!({ "Type": "String", "Default": "dev", "AllowedValues": ["dev", "prod"] })
    );
    assert_eq!(
        doc["Conditions"]["IsProd"],
        json!({ "Fn::Equals": [{ "Ref": "Env" }, "prod"] })
    );
}

#[test]
fn test_unresolvable_reference_is_reported() {
    let mut decls = Declarations::default();
    decls.resources.push(DiscoveredResource::new("Function", "lambda.Function"));
    decls.values.insert(
        "Function".into(),
        value(json!({ "Role": { "Fn::GetAtt": ["", "Arn"] } })),
    );
    let err = TemplateBuilder::new(&decls).build().unwrap_err();
    assert!(matches!(*err, Error::UnresolvedReference { .. }));
}
