//! CodeBuild backend for the build service port.

use async_trait::async_trait;
use aws_sdk_codebuild::Client;
use aws_sdk_codebuild::error::DisplayErrorContext;
use aws_sdk_codebuild::types::{
    ArtifactPackaging, ArtifactsType, ComputeType, EnvironmentType, EnvironmentVariable,
    EnvironmentVariableType, ProjectArtifacts, ProjectEnvironment, ProjectSource, SourceAuthType,
    SourceType,
};
use shepherd_core::build::{Build, BuildRequest, BuildService};
use shepherd_core::project::{BuildProject, ProjectSpec, SourceAuth};
use shepherd_core::settings::ComputeSize;
use shepherd_core::{Error, ProjectName, Result, Service};
use tracing::debug;

/// CodeBuild-backed build service.
pub struct CodeBuildService {
    client: Client,
}

impl CodeBuildService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn failed(operation: &'static str, err: impl std::fmt::Display) -> Error {
    Error::upstream(Service::Build, operation, err)
}

/// CodeBuild compute type for a settings size.
pub fn compute_type(size: ComputeSize) -> ComputeType {
    match size {
        ComputeSize::Small => ComputeType::BuildGeneral1Small,
        ComputeSize::Medium => ComputeType::BuildGeneral1Medium,
        ComputeSize::Large => ComputeType::BuildGeneral1Large,
    }
}

fn project_source(spec: &ProjectSpec) -> Result<ProjectSource> {
    let mut source = ProjectSource::builder()
        .r#type(SourceType::Github)
        .location(&spec.source.location);

    if spec.source.auth == SourceAuth::OAuth {
        let auth = aws_sdk_codebuild::types::SourceAuth::builder()
            .r#type(SourceAuthType::Oauth)
            .build()
            .map_err(|e| failed("CreateProject", e))?;
        source = source.auth(auth);
    }

    source.build().map_err(|e| failed("CreateProject", e))
}

/// Zipped S3 artifacts, as configured on a project or overridden per build.
fn s3_artifacts(
    operation: &'static str,
    bucket: &str,
    path: &str,
    name: &str,
) -> Result<ProjectArtifacts> {
    ProjectArtifacts::builder()
        .r#type(ArtifactsType::S3)
        .location(bucket)
        .path(path)
        .name(name)
        .packaging(ArtifactPackaging::Zip)
        .build()
        .map_err(|e| failed(operation, e))
}

fn project_environment(spec: &ProjectSpec) -> Result<ProjectEnvironment> {
    let compute = &spec.environment;

    let secret = EnvironmentVariable::builder()
        .name(&compute.secret.name)
        .value(&compute.secret.encrypted_value)
        .r#type(EnvironmentVariableType::Plaintext)
        .build()
        .map_err(|e| failed("CreateProject", e))?;

    ProjectEnvironment::builder()
        .r#type(EnvironmentType::LinuxContainer)
        .image(&compute.image)
        .compute_type(compute_type(compute.size))
        .environment_variables(secret)
        .build()
        .map_err(|e| failed("CreateProject", e))
}

fn to_project(project: &aws_sdk_codebuild::types::Project, fallback_name: &str) -> BuildProject {
    BuildProject {
        name: project.name().unwrap_or(fallback_name).to_string(),
        arn: project.arn().map(String::from),
    }
}

/// Convert a CodeBuild build into the domain descriptor.
pub fn to_build(build: &aws_sdk_codebuild::types::Build) -> Build {
    Build {
        id: build.id().unwrap_or_default().to_string(),
        arn: build.arn().map(String::from),
        project_name: build.project_name().map(String::from),
        source_location: build
            .source()
            .and_then(|source| source.location())
            .map(String::from),
        source_version: build.source_version().map(String::from),
        resolved_source_version: build.resolved_source_version().map(String::from),
        build_status: build.build_status().map(|status| status.as_str().to_string()),
    }
}

#[async_trait]
impl BuildService for CodeBuildService {
    async fn find_project(&self, name: &ProjectName) -> Result<Option<BuildProject>> {
        let output = self
            .client
            .batch_get_projects()
            .names(name.as_str())
            .send()
            .await
            .map_err(|e| failed("BatchGetProjects", DisplayErrorContext(e)))?;

        Ok(output
            .projects()
            .iter()
            .find(|project| project.name() == Some(name.as_str()))
            .map(|project| to_project(project, name.as_str())))
    }

    async fn create_project(&self, spec: &ProjectSpec) -> Result<BuildProject> {
        let output = self
            .client
            .create_project()
            .name(spec.name.as_str())
            .description(&spec.description)
            .source(project_source(spec)?)
            .artifacts(s3_artifacts(
                "CreateProject",
                &spec.artifacts.bucket,
                &spec.artifacts.path,
                &spec.artifacts.name,
            )?)
            .environment(project_environment(spec)?)
            .service_role(&spec.service_role)
            .send()
            .await
            .map_err(|e| failed("CreateProject", DisplayErrorContext(e)))?;

        debug!(project = %spec.name, source = ?spec.source, "CodeBuild project created");

        Ok(output
            .project()
            .map(|project| to_project(project, spec.name.as_str()))
            .unwrap_or_else(|| BuildProject {
                name: spec.name.to_string(),
                arn: None,
            }))
    }

    async fn start_build(&self, request: &BuildRequest) -> Result<Build> {
        let artifacts = &request.artifacts;
        let artifacts_override = s3_artifacts(
            "StartBuild",
            &artifacts.bucket,
            &artifacts.path,
            &artifacts.name,
        )?;

        let output = self
            .client
            .start_build()
            .project_name(request.project_name.as_str())
            .source_version(&request.source_version)
            .artifacts_override(artifacts_override)
            .set_buildspec_override(request.build_script_override.clone())
            .send()
            .await
            .map_err(|e| failed("StartBuild", DisplayErrorContext(e)))?;

        output
            .build_value()
            .map(to_build)
            .ok_or_else(|| failed("StartBuild", "response carried no build"))
    }

    /// `id` may be the bare `project:uuid` id or the build ARN that
    /// state-change events carry.
    async fn find_build(&self, id: &str) -> Result<Option<Build>> {
        let output = self
            .client
            .batch_get_builds()
            .ids(id)
            .send()
            .await
            .map_err(|e| failed("BatchGetBuilds", DisplayErrorContext(e)))?;

        Ok(output
            .builds()
            .iter()
            .find(|build| build.id() == Some(id) || build.arn() == Some(id))
            .map(to_build))
    }
}
