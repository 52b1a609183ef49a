//! Tests for the generated Rust module tree.
//!
//! Templates are parsed from YAML and rendered in memory; assertions look
//! at individual generated files.

use stratus_codegen::{Error, ResourceState, RustGenerator, SpecSchema};
use stratus_core::LanguageCodegen;
use stratus_ir::{Output, ResourceDef, Template, Value};

fn parse(yaml: &str) -> Template {
    stratus_template::parse_str(yaml)
        .expect("Failed to parse template")
        .template
}

/// Render a template and return files sorted by path.
fn generate_files(template: &Template) -> Vec<(String, String)> {
    let rendered = RustGenerator::new(template)
        .render()
        .expect("Failed to generate");
    files_of(rendered.files)
}

fn files_of(files: Vec<stratus_core::File>) -> Vec<(String, String)> {
    let mut result: Vec<(String, String)> = files
        .iter()
        .map(|f| (f.path().display().to_string(), f.content().to_string()))
        .collect();
    result.sort_by(|a, b| a.0.cmp(&b.0));
    result
}

/// Get a specific file from the generated output.
fn get_file<'a>(files: &'a [(String, String)], path: &str) -> Option<&'a str> {
    files
        .iter()
        .find(|(p, _)| p == path)
        .map(|(_, c)| c.as_str())
}

#[test]
fn test_bucket_with_nested_configuration() {
    let template = parse(
        r#"
Resources:
  DataBucket:
    Type: AWS::S3::Bucket
    Properties:
      BucketName: data
      VersioningConfiguration:
        Status: Enabled
"#,
    );
    let files = generate_files(&template);

    let storage = get_file(&files, "storage.rs").expect("storage.rs not found");
    insta::assert_snapshot!(storage, @r#"
    // Code generated by stratus import. DO NOT EDIT.

    use std::sync::LazyLock;

    use stratus_cfn::prelude::*;
    use stratus_cfn::s3;

    use super::*;

    /// AWS::S3::Bucket
    pub static DataBucket: LazyLock<s3::Bucket> = LazyLock::new(|| s3::Bucket {
        bucket_name: "data".into(),
        versioning_configuration: DataBucketVersioningConfiguration.clone().into(),
        ..Default::default()
    });

    pub static DataBucketVersioningConfiguration: LazyLock<s3::bucket::VersioningConfiguration> = LazyLock::new(|| s3::bucket::VersioningConfiguration {
        status: "Enabled".into(),
        ..Default::default()
    });
    "#);
}

#[test]
fn test_mod_file_lists_groups() {
    let template = parse(
        r#"
Parameters:
  Stage:
    Type: String
Resources:
  DataBucket:
    Type: AWS::S3::Bucket
  Jobs:
    Type: AWS::SQS::Queue
Outputs:
  QueueUrl:
    Value: !Ref Jobs
"#,
    );
    let files = generate_files(&template);

    let paths: Vec<&str> = files.iter().map(|(p, _)| p.as_str()).collect();
    assert_eq!(
        paths,
        ["messaging.rs", "mod.rs", "outputs.rs", "params.rs", "storage.rs"]
    );

    let module = get_file(&files, "mod.rs").expect("mod.rs not found");
    insta::assert_snapshot!(module, @r"
    // Code generated by stratus import. DO NOT EDIT.

    #![allow(non_upper_case_globals, unused_imports)]

    mod storage;
    mod messaging;
    mod params;
    mod outputs;

    pub use storage::*;
    pub use messaging::*;
    pub use params::*;
    pub use outputs::*;
    ");
}

#[test]
fn test_mutual_references_break_one_edge() {
    let template = parse(
        r#"
Resources:
  Topic:
    Type: AWS::SNS::Topic
    Properties:
      DisplayName: !GetAtt Queue.QueueName
  Queue:
    Type: AWS::SQS::Queue
    Properties:
      QueueName: !GetAtt Topic.TopicName
"#,
    );
    let rendered = RustGenerator::new(&template).render().unwrap();

    assert_eq!(rendered.broken_cycles.len(), 1);
    assert_eq!(rendered.broken_cycles[0].from, "Queue");
    assert_eq!(rendered.broken_cycles[0].to, "Topic");

    let files = files_of(rendered.files);
    let messaging = get_file(&files, "messaging.rs").expect("messaging.rs not found");
    assert!(messaging.contains(r#"display_name: Queue.attr("QueueName").into(),"#));
    assert!(messaging.contains(r#"queue_name: get_att("Topic", "TopicName").into(),"#));
}

#[test]
fn test_acyclic_references_stay_direct() {
    let template = parse(
        r#"
Resources:
  Logs:
    Type: AWS::S3::Bucket
  Site:
    Type: AWS::S3::Bucket
    Properties:
      BucketName: !Sub "${AWS::StackName}-site"
      LoggingConfiguration:
        DestinationBucketName: !Ref Logs
"#,
    );
    let rendered = RustGenerator::new(&template).render().unwrap();
    assert!(rendered.broken_cycles.is_empty());

    let files = files_of(rendered.files);
    let storage = get_file(&files, "storage.rs").unwrap();
    assert!(storage.contains(r#"bucket_name: sub("${AWS::StackName}-site").into(),"#));
    assert!(storage.contains("pub static SiteLoggingConfiguration: LazyLock<s3::bucket::LoggingConfiguration>"));
    assert!(storage.contains("destination_bucket_name: Logs.to_ref().into(),"));
}

#[test]
fn test_conditional_branches_shaped_separately() {
    let template = parse(
        r#"
Conditions:
  IsProd: !Equals [!Ref "AWS::AccountId", "123456789012"]
Resources:
  Site:
    Type: AWS::S3::Bucket
    Properties:
      LoggingConfiguration: !If
        - IsProd
        - DestinationBucketName: logs
        - !Ref AWS::NoValue
"#,
    );
    let files = generate_files(&template);

    let storage = get_file(&files, "storage.rs").unwrap();
    assert!(storage.contains("pub static SiteLoggingConfiguration: LazyLock<s3::bucket::LoggingConfiguration>"));
    assert!(storage.contains("SiteLoggingConfiguration.clone(),"));
    assert!(storage.contains(r#"reference("AWS::NoValue"),"#));

    let params = get_file(&files, "params.rs").unwrap();
    assert!(params.contains(
        r#"pub static IsProd: LazyLock<Condition> = LazyLock::new(|| Condition::new(equals(reference("AWS::AccountId"), "123456789012")));"#
    ));
}

#[test]
fn test_list_properties_wrap_single_values() {
    let schema = SpecSchema::from_json(
        r#"{
            "ResourceTypes": {
                "AWS::AutoScaling::AutoScalingGroup": {
                    "Properties": {
                        "AvailabilityZones": { "Type": "List", "PrimitiveItemType": "String" },
                        "LoadBalancerNames": { "Type": "List", "PrimitiveItemType": "String" },
                        "MaxSize": { "PrimitiveType": "String" }
                    }
                }
            }
        }"#,
        "spec.json",
    )
    .unwrap();
    let template = parse(
        r#"
Parameters:
  BalancerName:
    Type: String
Resources:
  Workers:
    Type: AWS::AutoScaling::AutoScalingGroup
    Properties:
      AvailabilityZones: !GetAZs ""
      LoadBalancerNames: !Ref BalancerName
      MaxSize: "4"
"#,
    );
    let rendered = RustGenerator::new(&template)
        .with_schema(&schema)
        .render()
        .unwrap();
    let files = files_of(rendered.files);

    let compute = get_file(&files, "compute.rs").expect("compute.rs not found");
    assert!(compute.contains("use stratus_cfn::autoscaling;"));
    assert!(compute.contains(r#"availability_zones: get_azs("").into(),"#));
    assert!(compute.contains("load_balancer_names: vec![BalancerName.to_ref().into()],"));
    assert!(compute.contains(r#"max_size: "4".into(),"#));
}

#[test]
fn test_unsupported_type_emits_placeholder() {
    let template = parse(
        r#"
Resources:
  Seeder:
    Type: Custom::Seeder
    Properties:
      ServiceToken: arn
  DataBucket:
    Type: AWS::S3::Bucket
"#,
    );
    let rendered = RustGenerator::new(&template).render().unwrap();

    assert_eq!(
        rendered.report.state("Seeder"),
        Some(&ResourceState::Skipped(
            "unsupported resource type Custom::Seeder".to_string()
        ))
    );
    assert_eq!(rendered.report.state("DataBucket"), Some(&ResourceState::Emitted));

    let files = files_of(rendered.files);
    let misc = get_file(&files, "misc.rs").expect("misc.rs not found");
    assert!(misc.contains("use serde_json::json;"));
    assert!(misc.contains("// unsupported resource type Custom::Seeder"));
    assert!(misc.contains("pub static Seeder: LazyLock<RawResource> = LazyLock::new(|| RawResource {"));
    assert!(misc.contains(r#"properties: json!({"ServiceToken":"arn"}).into(),"#));
}

#[test]
fn test_schema_without_type_emits_placeholder() {
    let schema = SpecSchema::from_json(r#"{ "ResourceTypes": {} }"#, "spec.json").unwrap();
    let template = parse(
        r#"
Resources:
  DataBucket:
    Type: AWS::S3::Bucket
"#,
    );
    let rendered = RustGenerator::new(&template)
        .with_schema(&schema)
        .render()
        .unwrap();
    assert_eq!(rendered.report.skipped().count(), 1);
}

#[test]
fn test_missing_nested_type_is_an_error() {
    let schema = SpecSchema::from_json(
        r#"{
            "ResourceTypes": {
                "AWS::S3::Bucket": {
                    "Properties": {
                        "VersioningConfiguration": { "Type": "VersioningConfiguration" }
                    }
                }
            }
        }"#,
        "spec.json",
    )
    .unwrap();
    let template = parse(
        r#"
Resources:
  DataBucket:
    Type: AWS::S3::Bucket
    Properties:
      VersioningConfiguration:
        Status: Enabled
"#,
    );
    let err = RustGenerator::new(&template)
        .with_schema(&schema)
        .render()
        .unwrap_err();
    assert!(matches!(
        *err,
        Error::MissingNestedType { ref type_name, .. } if type_name == "VersioningConfiguration"
    ));
}

#[test]
fn test_colliding_names_are_discriminated() {
    let mut template = Template::new();
    template.resources.insert(
        "my-bucket".into(),
        ResourceDef::new("AWS::S3::Bucket", Value::Null),
    );
    template.resources.insert(
        "MyBucket".into(),
        ResourceDef::new("AWS::S3::Bucket", Value::Null),
    );
    template.resources.insert(
        "Tag".into(),
        ResourceDef::new("AWS::SNS::Topic", Value::Null),
    );
    template.outputs.insert(
        "MyBucket".into(),
        Output {
            description: None,
            value: Value::reference("MyBucket"),
            export: None,
            condition: None,
        },
    );
    let files = generate_files(&template);

    let storage = get_file(&files, "storage.rs").unwrap();
    assert!(storage.contains("pub static MyBucket: LazyLock<s3::Bucket>"));
    assert!(storage.contains("pub static MyBucket2: LazyLock<s3::Bucket>"));

    let messaging = get_file(&files, "messaging.rs").unwrap();
    assert!(messaging.contains("pub static Tag2: LazyLock<sns::Topic>"));

    let outputs = get_file(&files, "outputs.rs").unwrap();
    assert!(outputs.contains("pub static MyBucketOutput: LazyLock<Output>"));
    assert!(outputs.contains("value: MyBucket2.to_ref().into(),"));
}

#[test]
fn test_parameters_and_outputs() {
    let template = parse(
        r#"
Parameters:
  Stage:
    Type: String
    Description: Deployment stage
    Default: dev
    AllowedValues: [dev, prod]
Resources:
  DataBucket:
    Type: AWS::S3::Bucket
    DeletionPolicy: Retain
Outputs:
  BucketArn:
    Value: !GetAtt DataBucket.Arn
    Export:
      Name: !Sub "${AWS::StackName}-arn"
"#,
    );
    let files = generate_files(&template);

    let params = get_file(&files, "params.rs").unwrap();
    assert!(params.contains("/// Deployment stage"));
    assert!(params.contains(r#"param_type: "String".into(),"#));
    assert!(params.contains(r#"default: Some("dev".into()),"#));
    assert!(params.contains(r#"allowed_values: vec!["dev".into(), "prod".into()],"#));

    let storage = get_file(&files, "storage.rs").unwrap();
    assert!(storage.contains("meta: ResourceMeta {"));
    assert!(storage.contains(r#"deletion_policy: Some("Retain".into()),"#));

    let outputs = get_file(&files, "outputs.rs").unwrap();
    assert!(outputs.contains(r#"value: DataBucket.attr("Arn").into(),"#));
    assert!(outputs.contains(r#"Export::new(sub("${AWS::StackName}-arn"))"#));
}

#[test]
fn test_generate_writes_files() {
    let template = parse(
        r#"
Resources:
  DataBucket:
    Type: AWS::S3::Bucket
"#,
    );
    let temp = tempfile::TempDir::new().unwrap();
    let generator = RustGenerator::new(&template).with_package("acme_cfn");

    let result = generator.generate(temp.path()).unwrap();

    assert_eq!(result.written.len(), 2);
    let storage = std::fs::read_to_string(temp.path().join("storage.rs")).unwrap();
    assert!(storage.contains("use acme_cfn::prelude::*;"));
    assert!(storage.contains("use acme_cfn::s3;"));
}
