//! The demo's operation descriptors.

use cmdshim::{FieldSpec, OperationDescriptor, Select};

pub fn graph() -> Vec<OperationDescriptor> {
    vec![
        OperationDescriptor::new("graph", "CreateApi")
            .about("Create an API")
            .field(FieldSpec::string("Name").required().identifier().help("Name of the API"))
            .field(FieldSpec::string("Description"))
            .field(
                FieldSpec::map("Tags")
                    .alias("Tag")
                    .help("Tags as key=value, repeatable"),
            )
            .response_fields(["ApiId", "Name", "Description", "Tags"])
            .mutating(),
        OperationDescriptor::new("graph", "GetApi")
            .about("Describe an API")
            .field(FieldSpec::string("ApiId").required().identifier())
            .response_fields(["ApiId", "Name", "Description", "Tags"]),
        OperationDescriptor::new("graph", "UpdateApi")
            .about("Rename an API or change its description")
            .field(FieldSpec::string("ApiId").required().identifier())
            .field(FieldSpec::string("Name"))
            .field(FieldSpec::string("Description"))
            .response_fields(["ApiId", "Name", "Description", "Tags"])
            .mutating(),
        OperationDescriptor::new("graph", "DeleteApi")
            .about("Delete an API")
            .field(FieldSpec::string("ApiId").required().identifier())
            .default_select(Select::Param("ApiId".into()))
            .mutating(),
        OperationDescriptor::new("graph", "ListApis")
            .about("List APIs, one page at a time")
            .field(FieldSpec::integer("MaxResults").help("Page size"))
            .field(FieldSpec::string("NextToken").help("Token from the previous page"))
            .response_fields(["Items", "NextToken"]),
    ]
}

pub fn workflow() -> Vec<OperationDescriptor> {
    vec![
        OperationDescriptor::new("workflow", "CreateEnvironment")
            .about("Create a workflow environment")
            .label("Create environment")
            .field(FieldSpec::string("Name").required().identifier())
            .field(FieldSpec::string("ExecutionRoleArn").required())
            .field(
                FieldSpec::list("SubnetIds")
                    .alias("Subnets")
                    .at("NetworkConfiguration.SubnetIds"),
            )
            .field(
                FieldSpec::list("SecurityGroupIds")
                    .at("NetworkConfiguration.SecurityGroupIds"),
            )
            .field(
                FieldSpec::boolean("DagProcessingLogsEnabled")
                    .at("LoggingConfiguration.DagProcessingLogs.Enabled"),
            )
            .field(
                FieldSpec::string("DagProcessingLogsLevel")
                    .at("LoggingConfiguration.DagProcessingLogs.LogLevel"),
            )
            .field(FieldSpec::integer("MaxWorkers").help("Upper bound on workers"))
            .field(FieldSpec::map("Tags").alias("Tag"))
            .response_fields(["Arn"])
            .default_select(Select::Field("Arn".into()))
            .mutating(),
        OperationDescriptor::new("workflow", "GetEnvironment")
            .about("Describe a workflow environment")
            .field(FieldSpec::string("Name").required().identifier())
            .response_fields(["Environment"])
            .default_select(Select::Field("Environment".into())),
        OperationDescriptor::new("workflow", "DeleteEnvironment")
            .about("Delete a workflow environment")
            .label("Delete environment")
            .field(FieldSpec::string("Name").required().identifier())
            .default_select(Select::Param("Name".into()))
            .mutating(),
        OperationDescriptor::new("workflow", "ListEnvironments")
            .about("List workflow environments")
            .response_fields(["Environments"])
            .default_select(Select::Field("Environments".into())),
    ]
}
