//! Grouping of resource types into service domains.
//!
//! Generated declarations are split into one file per category. Most
//! namespaces map to a single category; EC2 and the serverless namespace
//! are split by kind.

use std::fmt;

/// A service domain, one generated file each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Network,
    Compute,
    Storage,
    Security,
    Database,
    Messaging,
    Monitoring,
    Pipeline,
    Misc,
}

impl Category {
    /// All categories in file emission order.
    pub const ALL: [Category; 9] = [
        Category::Network,
        Category::Compute,
        Category::Storage,
        Category::Security,
        Category::Database,
        Category::Messaging,
        Category::Monitoring,
        Category::Pipeline,
        Category::Misc,
    ];

    /// Module / file stem.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Network => "network",
            Category::Compute => "compute",
            Category::Storage => "storage",
            Category::Security => "security",
            Category::Database => "database",
            Category::Messaging => "messaging",
            Category::Monitoring => "monitoring",
            Category::Pipeline => "pipeline",
            Category::Misc => "misc",
        }
    }

    /// Categorize a canonical type such as `AWS::EC2::VPC`.
    pub fn of(canonical: &str) -> Category {
        let mut parts = canonical.rsplitn(3, "::");
        let kind = parts.next().unwrap_or_default();
        let namespace = parts.next().unwrap_or_default();
        match namespace {
            "EC2" => ec2_category(kind),
            "Serverless" => serverless_category(kind),
            ns => namespace_category(ns),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn ec2_category(kind: &str) -> Category {
    const NETWORK: &[&str] = &[
        "VPC",
        "Subnet",
        "InternetGateway",
        "EgressOnlyInternetGateway",
        "VPCGatewayAttachment",
        "NatGateway",
        "EIP",
        "EIPAssociation",
        "RouteTable",
        "Route",
        "SubnetRouteTableAssociation",
        "VPCEndpoint",
        "VPCEndpointService",
        "VPCPeeringConnection",
        "VPCCidrBlock",
        "SubnetCidrBlock",
        "TransitGateway",
        "TransitGatewayAttachment",
        "TransitGatewayVpcAttachment",
        "TransitGatewayRoute",
        "TransitGatewayRouteTable",
        "NetworkAcl",
        "NetworkAclEntry",
        "SubnetNetworkAclAssociation",
        "NetworkInterface",
        "NetworkInterfaceAttachment",
        "DHCPOptions",
        "VPCDHCPOptionsAssociation",
        "VPNGateway",
        "VPNGatewayRoutePropagation",
        "VPNConnection",
        "VPNConnectionRoute",
        "CustomerGateway",
        "PrefixList",
        "FlowLog",
    ];
    const SECURITY: &[&str] = &[
        "SecurityGroup",
        "SecurityGroupIngress",
        "SecurityGroupEgress",
        "KeyPair",
    ];
    if NETWORK.contains(&kind) {
        Category::Network
    } else if SECURITY.contains(&kind) {
        Category::Security
    } else {
        Category::Compute
    }
}

fn serverless_category(kind: &str) -> Category {
    match kind {
        "Api" | "HttpApi" => Category::Network,
        "SimpleTable" => Category::Database,
        "StateMachine" => Category::Pipeline,
        "Function" | "LayerVersion" => Category::Compute,
        _ => Category::Misc,
    }
}

fn namespace_category(namespace: &str) -> Category {
    match namespace {
        "ElasticLoadBalancing" | "ElasticLoadBalancingV2" | "Route53" | "Route53Profiles"
        | "Route53Resolver" | "Route53RecoveryControl" | "Route53RecoveryReadiness"
        | "CloudFront" | "ApiGateway" | "ApiGatewayV2" | "GlobalAccelerator"
        | "NetworkFirewall" | "NetworkManager" | "VpcLattice" | "ServiceDiscovery"
        | "AppMesh" => Category::Network,

        "Lambda" | "ECS" | "EKS" | "ECR" | "Batch" | "AutoScaling"
        | "ApplicationAutoScaling" | "ElasticBeanstalk" | "AppRunner" | "Lightsail"
        | "ImageBuilder" | "GameLift" | "EMR" | "EMRServerless" | "EMRContainers" => {
            Category::Compute
        }

        "S3" | "S3Express" | "S3ObjectLambda" | "S3Outposts" | "S3Tables" | "EFS" | "FSx"
        | "Backup" | "BackupGateway" | "DataSync" => Category::Storage,

        "IAM" | "KMS" | "SecretsManager" | "CertificateManager" | "ACMPCA" | "WAF"
        | "WAFRegional" | "WAFv2" | "Shield" | "GuardDuty" | "SecurityHub" | "Cognito"
        | "SSO" | "IdentityStore" | "Inspector" | "InspectorV2" | "Macie" | "Detective"
        | "AccessAnalyzer" | "RolesAnywhere" | "VerifiedPermissions" | "FMS"
        | "SecurityLake" | "Signer" => Category::Security,

        "RDS" | "DynamoDB" | "ElastiCache" | "DocDB" | "DocDBElastic" | "Neptune"
        | "NeptuneGraph" | "Redshift" | "RedshiftServerless" | "MemoryDB" | "Cassandra"
        | "QLDB" | "Timestream" | "DAX" | "DSQL" | "OpenSearchService" | "Elasticsearch"
        | "OpenSearchServerless" => Category::Database,

        "SNS" | "SQS" | "Events" | "EventSchemas" | "Pipes" | "Scheduler" | "AmazonMQ"
        | "MSK" | "KafkaConnect" | "Kinesis" | "KinesisFirehose" | "SES" | "Pinpoint"
        | "PinpointEmail" => Category::Messaging,

        "CloudWatch" | "Logs" | "CloudTrail" | "XRay" | "Synthetics" | "RUM" | "Oam"
        | "InternetMonitor" | "ApplicationInsights" | "ApplicationSignals" | "Grafana"
        | "APS" | "Config" | "DevOpsGuru" | "ObservabilityAdmin" => Category::Monitoring,

        "CodePipeline" | "CodeBuild" | "CodeCommit" | "CodeDeploy" | "CodeArtifact"
        | "CodeStar" | "CodeStarConnections" | "CodeStarNotifications" | "CodeConnections"
        | "StepFunctions" | "Glue" | "DataPipeline" => Category::Pipeline,

        _ => Category::Misc,
    }
}
