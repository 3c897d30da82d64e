//! In-memory port implementations shared by the workflow tests.
//!
//! Every mock appends `"<service>.<operation> <argument>"` to one shared call
//! log so tests can assert on ordering across services.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shepherd_core::build::{Build, BuildRequest, BuildService};
use shepherd_core::events::{EventService, NotificationRule, RuleTarget};
use shepherd_core::logs::{LogGroupOutcome, LogService};
use shepherd_core::project::{ArtifactLocation, BuildProject, ProjectSpec};
use shepherd_core::repository::{FileLookup, RepoRef, SourceHost};
use shepherd_core::secret::Secrets;
use shepherd_core::status::CommitStatus;
use shepherd_core::{Error, ImageRegistry, ProjectName, Result, Service};

use crate::{
    BuildDispatcher, ConfigResolver, ProjectProvisioner, ProvisioningSettings, StatusRelay,
    TriggerWorkflow,
};

pub type CallLog = Arc<Mutex<Vec<String>>>;

fn record(calls: &CallLog, entry: String) {
    calls.lock().unwrap().push(entry);
}

pub struct MockHost {
    pub calls: CallLog,
    pub files: Mutex<HashMap<String, String>>,
    pub failing_paths: Mutex<HashSet<String>>,
    pub statuses: Mutex<Vec<(RepoRef, String, CommitStatus)>>,
    pub fail_statuses: bool,
}

#[async_trait]
impl SourceHost for MockHost {
    async fn fetch_file(&self, repo: &RepoRef, sha: &str, path: &str) -> Result<FileLookup> {
        record(&self.calls, format!("host.fetch_file {}@{}:{}", repo, sha, path));
        if self.failing_paths.lock().unwrap().contains(path) {
            return Err(Error::upstream(Service::SourceHost, "GetContents", "502 Bad Gateway"));
        }
        Ok(match self.files.lock().unwrap().get(path) {
            Some(content) => FileLookup::Found(content.clone()),
            None => FileLookup::NotFound,
        })
    }

    async fn create_commit_status(
        &self,
        repo: &RepoRef,
        sha: &str,
        status: &CommitStatus,
    ) -> Result<()> {
        record(&self.calls, format!("host.create_commit_status {}@{}", repo, sha));
        if self.fail_statuses {
            return Err(Error::upstream(Service::SourceHost, "CreateStatus", "422"));
        }
        self.statuses
            .lock()
            .unwrap()
            .push((repo.clone(), sha.to_string(), status.clone()));
        Ok(())
    }
}

pub struct MockBuilds {
    pub calls: CallLog,
    pub projects: Mutex<HashMap<String, BuildProject>>,
    pub created: Mutex<Vec<ProjectSpec>>,
    pub started: Mutex<Vec<BuildRequest>>,
    pub builds: Mutex<HashMap<String, Build>>,
    pub fail_start: bool,
}

#[async_trait]
impl BuildService for MockBuilds {
    async fn find_project(&self, name: &ProjectName) -> Result<Option<BuildProject>> {
        record(&self.calls, format!("builds.find_project {}", name));
        Ok(self.projects.lock().unwrap().get(name.as_str()).cloned())
    }

    async fn create_project(&self, spec: &ProjectSpec) -> Result<BuildProject> {
        record(&self.calls, format!("builds.create_project {}", spec.name));
        let mut projects = self.projects.lock().unwrap();
        if projects.contains_key(spec.name.as_str()) {
            return Err(Error::upstream(
                Service::Build,
                "CreateProject",
                "ResourceAlreadyExistsException",
            ));
        }
        let project = BuildProject {
            name: spec.name.to_string(),
            arn: Some(format!("arn:aws:codebuild:us-east-1:123456789012:project/{}", spec.name)),
        };
        projects.insert(spec.name.to_string(), project.clone());
        self.created.lock().unwrap().push(spec.clone());
        Ok(project)
    }

    async fn start_build(&self, request: &BuildRequest) -> Result<Build> {
        record(&self.calls, format!("builds.start_build {}", request.project_name));
        if self.fail_start {
            return Err(Error::upstream(Service::Build, "StartBuild", "AccountLimitExceeded"));
        }
        self.started.lock().unwrap().push(request.clone());
        Ok(Build {
            id: format!("{}:b1", request.project_name),
            project_name: Some(request.project_name.to_string()),
            source_version: Some(request.source_version.clone()),
            build_status: Some("IN_PROGRESS".to_string()),
            ..Default::default()
        })
    }

    async fn find_build(&self, id: &str) -> Result<Option<Build>> {
        record(&self.calls, format!("builds.find_build {}", id));
        Ok(self.builds.lock().unwrap().get(id).cloned())
    }
}

pub struct MockLogs {
    pub calls: CallLog,
    pub groups: Mutex<HashMap<String, i32>>,
    pub fail_retention: bool,
}

#[async_trait]
impl LogService for MockLogs {
    async fn create_log_group(&self, name: &str) -> Result<LogGroupOutcome> {
        record(&self.calls, format!("logs.create_log_group {}", name));
        let mut groups = self.groups.lock().unwrap();
        if groups.contains_key(name) {
            return Ok(LogGroupOutcome::AlreadyExists);
        }
        groups.insert(name.to_string(), 0);
        Ok(LogGroupOutcome::Created)
    }

    async fn put_retention_policy(&self, name: &str, days: i32) -> Result<()> {
        record(&self.calls, format!("logs.put_retention_policy {} {}", name, days));
        if self.fail_retention {
            return Err(Error::upstream(Service::Logs, "PutRetentionPolicy", "Throttling"));
        }
        self.groups.lock().unwrap().insert(name.to_string(), days);
        Ok(())
    }
}

pub struct MockEvents {
    pub calls: CallLog,
    pub rules: Mutex<Vec<NotificationRule>>,
    pub targets: Mutex<Vec<(String, RuleTarget)>>,
}

#[async_trait]
impl EventService for MockEvents {
    async fn put_rule(&self, rule: &NotificationRule) -> Result<String> {
        record(&self.calls, format!("events.put_rule {}", rule.name));
        self.rules.lock().unwrap().push(rule.clone());
        Ok(format!("arn:aws:events:us-east-1:123456789012:rule/{}", rule.name))
    }

    async fn put_target(&self, rule_name: &str, target: &RuleTarget) -> Result<()> {
        record(&self.calls, format!("events.put_target {}", rule_name));
        self.targets
            .lock()
            .unwrap()
            .push((rule_name.to_string(), target.clone()));
        Ok(())
    }
}

/// All mocks wired to one call log.
pub struct Harness {
    pub calls: CallLog,
    pub host: Arc<MockHost>,
    pub builds: Arc<MockBuilds>,
    pub logs: Arc<MockLogs>,
    pub events: Arc<MockEvents>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(|_, _, _| {})
    }

    /// Build a harness, letting `configure` adjust the mocks before they are shared.
    pub fn with(configure: impl FnOnce(&mut MockHost, &mut MockBuilds, &mut MockLogs)) -> Self {
        let calls = CallLog::default();
        let mut host = MockHost {
            calls: calls.clone(),
            files: Mutex::default(),
            failing_paths: Mutex::default(),
            statuses: Mutex::default(),
            fail_statuses: false,
        };
        let mut builds = MockBuilds {
            calls: calls.clone(),
            projects: Mutex::default(),
            created: Mutex::default(),
            started: Mutex::default(),
            builds: Mutex::default(),
            fail_start: false,
        };
        let mut logs = MockLogs {
            calls: calls.clone(),
            groups: Mutex::default(),
            fail_retention: false,
        };
        configure(&mut host, &mut builds, &mut logs);

        Self {
            events: Arc::new(MockEvents {
                calls: calls.clone(),
                rules: Mutex::default(),
                targets: Mutex::default(),
            }),
            calls,
            host: Arc::new(host),
            builds: Arc::new(builds),
            logs: Arc::new(logs),
        }
    }

    pub fn add_file(&self, path: &str, content: &str) {
        self.host
            .files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn settings() -> ProvisioningSettings {
        ProvisioningSettings {
            artifacts: artifacts(),
            service_role: "arn:aws:iam::123456789012:role/bundle-shepherd-project".to_string(),
            status_relay_target: "arn:aws:lambda:us-east-1:123456789012:function:relay"
                .to_string(),
            use_oauth: false,
            encrypted_npm_token: "bnBtLWNpcGhlcg==".to_string(),
        }
    }

    pub fn resolver(&self) -> ConfigResolver {
        ConfigResolver::new(self.host.clone())
    }

    pub fn provisioner(&self) -> ProjectProvisioner {
        ProjectProvisioner::new(
            self.builds.clone(),
            self.logs.clone(),
            self.events.clone(),
            Self::settings(),
            Secrets::new("gh-token"),
        )
    }

    pub fn dispatcher(&self) -> BuildDispatcher {
        BuildDispatcher::new(self.builds.clone(), artifacts())
    }

    pub fn relay(&self) -> StatusRelay {
        StatusRelay::new(self.builds.clone(), self.host.clone())
    }

    pub fn trigger(&self) -> TriggerWorkflow {
        TriggerWorkflow::new(
            self.resolver(),
            self.provisioner(),
            self.dispatcher(),
            registry(),
        )
    }
}

pub fn artifacts() -> ArtifactLocation {
    ArtifactLocation::new("bundles", "shepherd")
}

pub fn registry() -> ImageRegistry {
    ImageRegistry::new("123456789012", "us-east-1")
}
