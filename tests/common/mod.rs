//! Common test utilities and helpers for ghbackup tests
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ghbackup::{Config, GitHubClient, MirrorTool, ToolStatus};

/// Mock GitHub repository data for testing
#[derive(Debug, Clone)]
pub struct MockRepository {
    pub name: String,
    pub owner: String,
    pub is_fork: bool,
}

impl MockRepository {
    pub fn new(name: &str, owner: &str) -> Self {
        Self {
            name: name.to_string(),
            owner: owner.to_string(),
            is_fork: false,
        }
    }

    pub fn as_fork(mut self) -> Self {
        self.is_fork = true;
        self
    }

    pub fn git_url(&self) -> String {
        format!("git://github.com/{}/{}.git", self.owner, self.name)
    }

    /// Entry as the listing endpoint returns it
    pub fn to_json(&self) -> Value {
        json!({
            "id": 1,
            "name": self.name,
            "full_name": format!("{}/{}", self.owner, self.name),
            "git_url": self.git_url(),
            "clone_url": format!("https://github.com/{}/{}.git", self.owner, self.name),
            "ssh_url": format!("git@github.com:{}/{}.git", self.owner, self.name),
            "fork": self.is_fork,
            "private": false
        })
    }
}

/// Serve `repos` for `account` in pages of `page_size`, followed by an
/// empty terminating page
pub async fn mount_account(
    server: &MockServer,
    account: &str,
    repos: &[MockRepository],
    page_size: usize,
) {
    let pages: Vec<&[MockRepository]> = repos.chunks(page_size.max(1)).collect();
    let endpoint = format!("/users/{}/repos", account);

    for (index, page) in pages.iter().enumerate() {
        let body: Vec<Value> = page.iter().map(MockRepository::to_json).collect();
        Mock::given(method("GET"))
            .and(path(endpoint.as_str()))
            .and(query_param("page", (index + 1).to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path(endpoint.as_str()))
        .and(query_param("page", (pages.len() + 1).to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

/// Answer every listing request for `account` with `status`
pub async fn mount_status(server: &MockServer, account: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/users/{}/repos", account)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Number of requests the mock API has seen
pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or(0)
}

pub fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.github.api_url = server.uri();
    config
}

pub fn client_for(server: &MockServer) -> GitHubClient {
    GitHubClient::new(&config_for(server)).expect("Failed to create GitHub client")
}

/// One invocation seen by [`RecordingTool`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    Create { source: String, target: PathBuf },
    Refresh { context: PathBuf, cwd: PathBuf },
}

/// Stand-in for git: records every call, creates the target directory on
/// clone and fails refreshes of selected mirrors
#[derive(Debug, Default)]
pub struct RecordingTool {
    calls: Mutex<Vec<ToolCall>>,
    failing_refreshes: HashSet<String>,
}

impl RecordingTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the refresh of the mirror directory named `name` exit with 1
    pub fn failing_refresh(mut self, name: &str) -> Self {
        self.failing_refreshes.insert(name.to_string());
        self
    }

    pub fn calls(&self) -> Vec<ToolCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MirrorTool for RecordingTool {
    async fn create(&self, source: &str, target: &Path) -> anyhow::Result<ToolStatus> {
        self.calls.lock().unwrap().push(ToolCall::Create {
            source: source.to_string(),
            target: target.to_path_buf(),
        });
        std::fs::create_dir_all(target)?;
        Ok(ToolStatus::from_code(0))
    }

    async fn refresh(&self, context: &Path) -> anyhow::Result<ToolStatus> {
        self.calls.lock().unwrap().push(ToolCall::Refresh {
            context: context.to_path_buf(),
            cwd: std::env::current_dir()?,
        });

        let name = context
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let code = if self.failing_refreshes.contains(&name) { 1 } else { 0 };
        Ok(ToolStatus::from_code(code))
    }
}
