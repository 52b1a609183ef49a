//! Service type registry.
//!
//! Declarations name their type as `<namespace>.<Kind>` (e.g. `s3.Bucket`).
//! The registry maps the short namespace to its canonical prefix and
//! spelling, giving `AWS::S3::Bucket`. Canonical spellings do not follow a
//! casing rule (`WAFv2`, `IoT1Click`, `ElastiCache`), so the mapping is an
//! explicit table.

use std::{collections::HashMap, fmt, sync::LazyLock};

/// One service namespace entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespace {
    /// Short name used in declared types, always lowercase.
    pub short: &'static str,
    /// `AWS` for every namespace except the Alexa skills kit.
    pub prefix: &'static str,
    /// Canonical namespace spelling.
    pub name: &'static str,
}

impl Namespace {
    /// `<prefix>::<name>`, the part of a canonical type before the kind.
    pub fn qualified(&self) -> String {
        format!("{}::{}", self.prefix, self.name)
    }
}

const fn aws(short: &'static str, name: &'static str) -> Namespace {
    Namespace {
        short,
        prefix: "AWS",
        name,
    }
}

/// Short name of the serverless application model namespace.
pub const SERVERLESS_NAMESPACE: &str = "serverless";

static NAMESPACES: &[Namespace] = &[
    Namespace {
        short: "ask",
        prefix: "Alexa",
        name: "ASK",
    },
    aws(SERVERLESS_NAMESPACE, "Serverless"),
    aws("accessanalyzer", "AccessAnalyzer"),
    aws("acmpca", "ACMPCA"),
    aws("aiops", "AIOps"),
    aws("amazonmq", "AmazonMQ"),
    aws("amplify", "Amplify"),
    aws("amplifyuibuilder", "AmplifyUIBuilder"),
    aws("apigateway", "ApiGateway"),
    aws("apigatewayv2", "ApiGatewayV2"),
    aws("appconfig", "AppConfig"),
    aws("appflow", "AppFlow"),
    aws("appintegrations", "AppIntegrations"),
    aws("applicationautoscaling", "ApplicationAutoScaling"),
    aws("applicationinsights", "ApplicationInsights"),
    aws("applicationsignals", "ApplicationSignals"),
    aws("appmesh", "AppMesh"),
    aws("apprunner", "AppRunner"),
    aws("appstream", "AppStream"),
    aws("appsync", "AppSync"),
    aws("apptest", "AppTest"),
    aws("aps", "APS"),
    aws("arcregionswitch", "ARCRegionSwitch"),
    aws("arczonalshift", "ARCZonalShift"),
    aws("athena", "Athena"),
    aws("auditmanager", "AuditManager"),
    aws("autoscaling", "AutoScaling"),
    aws("autoscalingplans", "AutoScalingPlans"),
    aws("b2bi", "B2BI"),
    aws("backup", "Backup"),
    aws("backupgateway", "BackupGateway"),
    aws("batch", "Batch"),
    aws("bcmdataexports", "BCMDataExports"),
    aws("bedrock", "Bedrock"),
    aws("billingconductor", "BillingConductor"),
    aws("budgets", "Budgets"),
    aws("cassandra", "Cassandra"),
    aws("ce", "CE"),
    aws("certificatemanager", "CertificateManager"),
    aws("chatbot", "Chatbot"),
    aws("cleanrooms", "CleanRooms"),
    aws("cleanroomsml", "CleanRoomsML"),
    aws("cloud9", "Cloud9"),
    aws("cloudformation", "CloudFormation"),
    aws("cloudfront", "CloudFront"),
    aws("cloudtrail", "CloudTrail"),
    aws("cloudwatch", "CloudWatch"),
    aws("codeartifact", "CodeArtifact"),
    aws("codebuild", "CodeBuild"),
    aws("codecommit", "CodeCommit"),
    aws("codeconnections", "CodeConnections"),
    aws("codedeploy", "CodeDeploy"),
    aws("codeguruprofiler", "CodeGuruProfiler"),
    aws("codegurureviewer", "CodeGuruReviewer"),
    aws("codepipeline", "CodePipeline"),
    aws("codestar", "CodeStar"),
    aws("codestarconnections", "CodeStarConnections"),
    aws("codestarnotifications", "CodeStarNotifications"),
    aws("cognito", "Cognito"),
    aws("comprehend", "Comprehend"),
    aws("config", "Config"),
    aws("connect", "Connect"),
    aws("connectcampaigns", "ConnectCampaigns"),
    aws("connectcampaignsv2", "ConnectCampaignsV2"),
    aws("controltower", "ControlTower"),
    aws("cur", "CUR"),
    aws("customerprofiles", "CustomerProfiles"),
    aws("databrew", "DataBrew"),
    aws("datapipeline", "DataPipeline"),
    aws("datasync", "DataSync"),
    aws("datazone", "DataZone"),
    aws("dax", "DAX"),
    aws("deadline", "Deadline"),
    aws("detective", "Detective"),
    aws("devopsguru", "DevOpsGuru"),
    aws("directoryservice", "DirectoryService"),
    aws("dlm", "DLM"),
    aws("dms", "DMS"),
    aws("docdb", "DocDB"),
    aws("docdbelastic", "DocDBElastic"),
    aws("dsql", "DSQL"),
    aws("dynamodb", "DynamoDB"),
    aws("ec2", "EC2"),
    aws("ecr", "ECR"),
    aws("ecs", "ECS"),
    aws("efs", "EFS"),
    aws("eks", "EKS"),
    aws("elasticache", "ElastiCache"),
    aws("elasticbeanstalk", "ElasticBeanstalk"),
    aws("elasticloadbalancing", "ElasticLoadBalancing"),
    aws("elasticloadbalancingv2", "ElasticLoadBalancingV2"),
    aws("elasticsearch", "Elasticsearch"),
    aws("emr", "EMR"),
    aws("emrcontainers", "EMRContainers"),
    aws("emrserverless", "EMRServerless"),
    aws("entityresolution", "EntityResolution"),
    aws("events", "Events"),
    aws("eventschemas", "EventSchemas"),
    aws("evidently", "Evidently"),
    aws("finspace", "FinSpace"),
    aws("fis", "FIS"),
    aws("fms", "FMS"),
    aws("forecast", "Forecast"),
    aws("frauddetector", "FraudDetector"),
    aws("fsx", "FSx"),
    aws("gamelift", "GameLift"),
    aws("globalaccelerator", "GlobalAccelerator"),
    aws("glue", "Glue"),
    aws("grafana", "Grafana"),
    aws("greengrass", "Greengrass"),
    aws("greengrassv2", "GreengrassV2"),
    aws("groundstation", "GroundStation"),
    aws("guardduty", "GuardDuty"),
    aws("healthimaging", "HealthImaging"),
    aws("healthlake", "HealthLake"),
    aws("iam", "IAM"),
    aws("identitystore", "IdentityStore"),
    aws("imagebuilder", "ImageBuilder"),
    aws("inspector", "Inspector"),
    aws("inspectorv2", "InspectorV2"),
    aws("internetmonitor", "InternetMonitor"),
    aws("invoicing", "Invoicing"),
    aws("iot", "IoT"),
    aws("iot1click", "IoT1Click"),
    aws("iotanalytics", "IoTAnalytics"),
    aws("iotcoredeviceadvisor", "IoTCoreDeviceAdvisor"),
    aws("iotevents", "IoTEvents"),
    aws("iotfleethub", "IoTFleetHub"),
    aws("iotfleetwise", "IoTFleetWise"),
    aws("iotmanagedintegrations", "IoTManagedIntegrations"),
    aws("iotsitewise", "IoTSiteWise"),
    aws("iotthingsgraph", "IoTThingsGraph"),
    aws("iottwinmaker", "IoTTwinMaker"),
    aws("iotwireless", "IoTWireless"),
    aws("ivs", "IVS"),
    aws("ivschat", "IVSChat"),
    aws("kafkaconnect", "KafkaConnect"),
    aws("kendra", "Kendra"),
    aws("kendraranking", "KendraRanking"),
    aws("kinesis", "Kinesis"),
    aws("kinesisanalytics", "KinesisAnalytics"),
    aws("kinesisanalyticsv2", "KinesisAnalyticsV2"),
    aws("kinesisfirehose", "KinesisFirehose"),
    aws("kinesisvideo", "KinesisVideo"),
    aws("kms", "KMS"),
    aws("lakeformation", "LakeFormation"),
    aws("lambda", "Lambda"),
    aws("launchwizard", "LaunchWizard"),
    aws("lex", "Lex"),
    aws("licensemanager", "LicenseManager"),
    aws("lightsail", "Lightsail"),
    aws("location", "Location"),
    aws("logs", "Logs"),
    aws("lookoutequipment", "LookoutEquipment"),
    aws("lookoutmetrics", "LookoutMetrics"),
    aws("lookoutvision", "LookoutVision"),
    aws("m2", "M2"),
    aws("macie", "Macie"),
    aws("managedblockchain", "ManagedBlockchain"),
    aws("mediaconnect", "MediaConnect"),
    aws("mediaconvert", "MediaConvert"),
    aws("medialive", "MediaLive"),
    aws("mediapackage", "MediaPackage"),
    aws("mediapackagev2", "MediaPackageV2"),
    aws("mediastore", "MediaStore"),
    aws("mediatailor", "MediaTailor"),
    aws("memorydb", "MemoryDB"),
    aws("msk", "MSK"),
    aws("mwaa", "MWAA"),
    aws("neptune", "Neptune"),
    aws("neptunegraph", "NeptuneGraph"),
    aws("networkfirewall", "NetworkFirewall"),
    aws("networkmanager", "NetworkManager"),
    aws("nimblestudio", "NimbleStudio"),
    aws("notifications", "Notifications"),
    aws("notificationscontacts", "NotificationsContacts"),
    aws("oam", "Oam"),
    aws("observabilityadmin", "ObservabilityAdmin"),
    aws("omics", "Omics"),
    aws("opensearchserverless", "OpenSearchServerless"),
    aws("opensearchservice", "OpenSearchService"),
    aws("opsworks", "OpsWorks"),
    aws("opsworkscm", "OpsWorksCM"),
    aws("organizations", "Organizations"),
    aws("osis", "OSIS"),
    aws("panorama", "Panorama"),
    aws("paymentcryptography", "PaymentCryptography"),
    aws("pcaconnectorad", "PCAConnectorAD"),
    aws("pcaconnectorscep", "PCAConnectorSCEP"),
    aws("pcs", "PCS"),
    aws("personalize", "Personalize"),
    aws("pinpoint", "Pinpoint"),
    aws("pinpointemail", "PinpointEmail"),
    aws("pipes", "Pipes"),
    aws("proton", "Proton"),
    aws("qbusiness", "QBusiness"),
    aws("qldb", "QLDB"),
    aws("quicksight", "QuickSight"),
    aws("ram", "RAM"),
    aws("rbin", "Rbin"),
    aws("rds", "RDS"),
    aws("redshift", "Redshift"),
    aws("redshiftserverless", "RedshiftServerless"),
    aws("refactorspaces", "RefactorSpaces"),
    aws("rekognition", "Rekognition"),
    aws("resiliencehub", "ResilienceHub"),
    aws("resourceexplorer2", "ResourceExplorer2"),
    aws("resourcegroups", "ResourceGroups"),
    aws("robomaker", "RoboMaker"),
    aws("rolesanywhere", "RolesAnywhere"),
    aws("route53", "Route53"),
    aws("route53profiles", "Route53Profiles"),
    aws("route53recoverycontrol", "Route53RecoveryControl"),
    aws("route53recoveryreadiness", "Route53RecoveryReadiness"),
    aws("route53resolver", "Route53Resolver"),
    aws("rum", "RUM"),
    aws("s3", "S3"),
    aws("s3express", "S3Express"),
    aws("s3objectlambda", "S3ObjectLambda"),
    aws("s3outposts", "S3Outposts"),
    aws("s3tables", "S3Tables"),
    aws("sagemaker", "SageMaker"),
    aws("scheduler", "Scheduler"),
    aws("sdb", "SDB"),
    aws("secretsmanager", "SecretsManager"),
    aws("securityhub", "SecurityHub"),
    aws("securitylake", "SecurityLake"),
    aws("servicecatalog", "ServiceCatalog"),
    aws("servicecatalogappregistry", "ServiceCatalogAppRegistry"),
    aws("servicediscovery", "ServiceDiscovery"),
    aws("ses", "SES"),
    aws("shield", "Shield"),
    aws("signer", "Signer"),
    aws("simspaceweaver", "SimSpaceWeaver"),
    aws("smsvoice", "SMSVoice"),
    aws("sns", "SNS"),
    aws("sqs", "SQS"),
    aws("ssm", "SSM"),
    aws("ssmcontacts", "SSMContacts"),
    aws("ssmguiconnect", "SSMGuiConnect"),
    aws("ssmincidents", "SSMIncidents"),
    aws("ssmquicksetup", "SSMQuickSetup"),
    aws("sso", "SSO"),
    aws("stepfunctions", "StepFunctions"),
    aws("supportapp", "SupportApp"),
    aws("synthetics", "Synthetics"),
    aws("systemsmanagersap", "SystemsManagerSAP"),
    aws("timestream", "Timestream"),
    aws("transfer", "Transfer"),
    aws("verifiedpermissions", "VerifiedPermissions"),
    aws("voiceid", "VoiceID"),
    aws("vpclattice", "VpcLattice"),
    aws("waf", "WAF"),
    aws("wafregional", "WAFRegional"),
    aws("wafv2", "WAFv2"),
    aws("wisdom", "Wisdom"),
    aws("workspaces", "WorkSpaces"),
    aws("workspacesthinclient", "WorkSpacesThinClient"),
    aws("workspacesweb", "WorkSpacesWeb"),
    aws("xray", "XRay"),
];

static BY_SHORT: LazyLock<HashMap<&'static str, &'static Namespace>> =
    LazyLock::new(|| NAMESPACES.iter().map(|ns| (ns.short, ns)).collect());

static BY_QUALIFIED: LazyLock<HashMap<String, &'static Namespace>> =
    LazyLock::new(|| NAMESPACES.iter().map(|ns| (ns.qualified(), ns)).collect());

/// Every known namespace, in table order.
pub fn namespaces() -> &'static [Namespace] {
    NAMESPACES
}

/// Look up a namespace by its short name (case-insensitive).
pub fn namespace(short: &str) -> Option<&'static Namespace> {
    BY_SHORT.get(short.to_ascii_lowercase().as_str()).copied()
}

/// Resolve a declared type such as `s3.Bucket` to `AWS::S3::Bucket`.
///
/// Returns `None` when the namespace is unknown or either half is empty.
pub fn resolve(declared: &str) -> Option<String> {
    let (short, kind) = declared.rsplit_once('.')?;
    if short.is_empty() || kind.is_empty() {
        return None;
    }
    let ns = namespace(short)?;
    Some(format!("{}::{}", ns.qualified(), kind))
}

/// A canonical type split back into its declared form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredType {
    pub namespace: &'static Namespace,
    pub kind: String,
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace.short, self.kind)
    }
}

/// Reverse of [`resolve`]: `AWS::S3::Bucket` becomes `s3.Bucket`.
pub fn declared_for(canonical: &str) -> Option<DeclaredType> {
    let (qualified, kind) = canonical.rsplit_once("::")?;
    if kind.is_empty() {
        return None;
    }
    let namespace = BY_QUALIFIED.get(qualified).copied()?;
    Some(DeclaredType {
        namespace,
        kind: kind.to_string(),
    })
}

/// True for resource types that require the serverless transform marker.
pub fn is_serverless(canonical: &str) -> bool {
    canonical.starts_with("AWS::Serverless::")
}
