//! Operation descriptors used across the test suites.
//!
//! `graph` is a small API catalog with flat requests. `workflow` manages
//! environments whose requests nest optional settings two levels deep.

use cmdshim_dispatch::{FieldSpec, OperationDescriptor, Select};

pub fn create_api() -> OperationDescriptor {
    OperationDescriptor::new("graph", "CreateApi")
        .about("Create an API")
        .field(FieldSpec::string("Name").required().identifier())
        .field(FieldSpec::string("Description"))
        .field(FieldSpec::map("Tags").alias("Tag"))
        .response_fields(["ApiId", "Name", "Description", "Tags"])
        .mutating()
}

pub fn get_api() -> OperationDescriptor {
    OperationDescriptor::new("graph", "GetApi")
        .about("Describe an API")
        .field(FieldSpec::string("ApiId").required().identifier())
        .response_fields(["ApiId", "Name", "Description", "Tags"])
}

pub fn update_api() -> OperationDescriptor {
    OperationDescriptor::new("graph", "UpdateApi")
        .about("Rename or describe an API")
        .field(FieldSpec::string("ApiId").required().identifier())
        .field(FieldSpec::string("Name"))
        .field(FieldSpec::string("Description"))
        .response_fields(["ApiId", "Name", "Description", "Tags"])
        .mutating()
}

pub fn delete_api() -> OperationDescriptor {
    OperationDescriptor::new("graph", "DeleteApi")
        .about("Delete an API")
        .field(FieldSpec::string("ApiId").required().identifier())
        .default_select(Select::Param("ApiId".into()))
        .mutating()
}

pub fn list_apis() -> OperationDescriptor {
    OperationDescriptor::new("graph", "ListApis")
        .about("List APIs")
        .field(FieldSpec::integer("MaxResults"))
        .field(FieldSpec::string("NextToken"))
        .response_fields(["Items", "NextToken"])
        .default_select(Select::Field("Items".into()))
}

pub fn graph_operations() -> Vec<OperationDescriptor> {
    vec![create_api(), get_api(), update_api(), delete_api(), list_apis()]
}

pub fn create_environment() -> OperationDescriptor {
    OperationDescriptor::new("workflow", "CreateEnvironment")
        .about("Create a workflow environment")
        .field(FieldSpec::string("Name").required().identifier())
        .field(FieldSpec::string("ExecutionRoleArn").required())
        .field(
            FieldSpec::list("SubnetIds")
                .alias("Subnets")
                .at("NetworkConfiguration.SubnetIds"),
        )
        .field(FieldSpec::list("SecurityGroupIds").at("NetworkConfiguration.SecurityGroupIds"))
        .field(
            FieldSpec::boolean("DagProcessingLogsEnabled")
                .at("LoggingConfiguration.DagProcessingLogs.Enabled"),
        )
        .field(
            FieldSpec::string("DagProcessingLogsLevel")
                .at("LoggingConfiguration.DagProcessingLogs.LogLevel"),
        )
        .field(FieldSpec::integer("MaxWorkers"))
        .field(FieldSpec::map("Tags").alias("Tag"))
        .response_fields(["Arn"])
        .default_select(Select::Field("Arn".into()))
        .mutating()
}

pub fn delete_environment() -> OperationDescriptor {
    OperationDescriptor::new("workflow", "DeleteEnvironment")
        .about("Delete a workflow environment")
        .field(FieldSpec::string("Name").required().identifier())
        .default_select(Select::Param("Name".into()))
        .mutating()
}

pub fn workflow_operations() -> Vec<OperationDescriptor> {
    vec![create_environment(), delete_environment()]
}
