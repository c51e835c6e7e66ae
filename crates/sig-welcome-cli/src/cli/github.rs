//! GitHub client implementation using octocrab.
//!
//! This module provides the octocrab-based implementation of the
//! `RepositoryReader` and `EventWriter` traits for use in the CLI.

use async_trait::async_trait;
use http::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use sig_welcome_core::hosting::{
    AccessLevel, Collaborator, EventTarget, EventWriter, FileContent, HostingError, RepoId,
    RepositoryReader,
};
use tracing::{debug, warn};

const PER_PAGE: usize = 100;

/// Color given to labels the bot creates.
pub const LABEL_COLOR: &str = "0e8a16";

/// A wrapper around `octocrab::Octocrab` that implements the hosting traits.
///
/// This wrapper is necessary due to Rust's orphan rules, which prevent
/// implementing external traits on external types.
pub struct OctocrabClient(pub octocrab::Octocrab);

impl OctocrabClient {
    /// Creates a new OctocrabClient from an Octocrab instance.
    pub fn new(client: octocrab::Octocrab) -> Self {
        Self(client)
    }

    /// Fetches every page of a list endpoint.
    async fn get_all<T: DeserializeOwned>(&self, route: &str) -> Result<Vec<T>, octocrab::Error> {
        let mut items = Vec::new();
        for page in 1.. {
            let params = [("per_page", PER_PAGE.to_string()), ("page", page.to_string())];
            let batch: Vec<T> = self.0.get(route, Some(&params)).await?;
            let done = batch.len() < PER_PAGE;
            items.extend(batch);
            if done {
                break;
            }
        }
        Ok(items)
    }
}

impl std::ops::Deref for OctocrabClient {
    type Target = octocrab::Octocrab;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Extracts the HTTP status code from an octocrab error.
fn extract_status_code(error: &octocrab::Error) -> Option<StatusCode> {
    match error {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code),
        _ => None,
    }
}

fn to_hosting_error(error: octocrab::Error) -> HostingError {
    match extract_status_code(&error) {
        Some(StatusCode::NOT_FOUND) => HostingError::NotFound(error.to_string()),
        Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
            HostingError::Auth(error.to_string())
        }
        Some(_) => HostingError::Api(error.to_string()),
        None => HostingError::Other(error.to_string()),
    }
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChangedFile {
    filename: String,
}

#[derive(Debug, Default, Deserialize)]
struct Permissions {
    #[serde(default)]
    admin: bool,
    #[serde(default)]
    maintain: bool,
    #[serde(default)]
    push: bool,
    #[serde(default)]
    triage: bool,
}

impl Permissions {
    fn access_level(&self) -> AccessLevel {
        if self.admin {
            AccessLevel::OWNER
        } else if self.maintain {
            AccessLevel::MAINTAINER
        } else if self.push {
            AccessLevel::DEVELOPER
        } else if self.triage {
            AccessLevel::REPORTER
        } else {
            AccessLevel::GUEST
        }
    }
}

#[derive(Debug, Deserialize)]
struct CollaboratorResponse {
    login: String,
    #[serde(default)]
    permissions: Permissions,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct LabelResponse {
    name: String,
}

#[async_trait]
impl RepositoryReader for OctocrabClient {
    async fn fetch_path_content(
        &self,
        repo: &RepoId,
        path: &str,
        branch: &str,
    ) -> Result<FileContent, HostingError> {
        let route = format!("/repos/{}/{}/contents/{}", repo.org, repo.repo, path);
        let result: Result<ContentResponse, _> =
            self.0.get(&route, Some(&[("ref", branch)])).await;

        match result {
            Ok(response) => Ok(FileContent::new(response.content.unwrap_or_default())),
            Err(e) if extract_status_code(&e) == Some(StatusCode::NOT_FOUND) => {
                debug!("{} does not exist in {} at {}", path, repo, branch);
                Ok(FileContent::default())
            }
            Err(e) => Err(to_hosting_error(e)),
        }
    }

    async fn fetch_changed_paths(
        &self,
        repo: &RepoId,
        merge_request: u64,
    ) -> Result<Vec<String>, HostingError> {
        let route = format!("/repos/{}/{}/pulls/{}/files", repo.org, repo.repo, merge_request);
        let files: Vec<ChangedFile> = self.get_all(&route).await.map_err(to_hosting_error)?;
        Ok(files.into_iter().map(|f| f.filename).collect())
    }

    async fn fetch_collaborators(&self, repo: &RepoId) -> Result<Vec<Collaborator>, HostingError> {
        let route = format!("/repos/{}/{}/collaborators", repo.org, repo.repo);
        let collaborators: Vec<CollaboratorResponse> =
            self.get_all(&route).await.map_err(to_hosting_error)?;
        Ok(collaborators
            .into_iter()
            .map(|c| {
                let level = c.permissions.access_level();
                Collaborator::new(c.login, level)
            })
            .collect())
    }

    async fn fetch_tree(&self, repo: &RepoId, branch: &str) -> Result<Vec<String>, HostingError> {
        let route = format!("/repos/{}/{}/git/trees/{}", repo.org, repo.repo, branch);
        let response: TreeResponse = self
            .0
            .get(&route, Some(&[("recursive", "1")]))
            .await
            .map_err(to_hosting_error)?;

        if response.truncated {
            warn!("Tree of {} at {} is truncated, SIG lookup may miss entries", repo, branch);
        }
        Ok(response
            .tree
            .into_iter()
            .filter(|entry| entry.kind == "blob")
            .map(|entry| entry.path)
            .collect())
    }
}

#[async_trait]
impl EventWriter for OctocrabClient {
    async fn create_comment(
        &self,
        repo: &RepoId,
        target: EventTarget,
        body: &str,
    ) -> Result<(), HostingError> {
        let route = format!(
            "/repos/{}/{}/issues/{}/comments",
            repo.org,
            repo.repo,
            target.number()
        );
        let _: serde_json::Value = self
            .0
            .post(&route, Some(&json!({ "body": body })))
            .await
            .map_err(to_hosting_error)?;
        Ok(())
    }

    async fn list_labels(&self, repo: &RepoId) -> Result<Vec<String>, HostingError> {
        let route = format!("/repos/{}/{}/labels", repo.org, repo.repo);
        let labels: Vec<LabelResponse> = self.get_all(&route).await.map_err(to_hosting_error)?;
        Ok(labels.into_iter().map(|l| l.name).collect())
    }

    async fn create_label(&self, repo: &RepoId, name: &str) -> Result<(), HostingError> {
        let route = format!("/repos/{}/{}/labels", repo.org, repo.repo);
        let _: serde_json::Value = self
            .0
            .post(&route, Some(&json!({ "name": name, "color": LABEL_COLOR })))
            .await
            .map_err(to_hosting_error)?;
        Ok(())
    }

    async fn add_label(
        &self,
        repo: &RepoId,
        target: EventTarget,
        name: &str,
    ) -> Result<(), HostingError> {
        let route = format!(
            "/repos/{}/{}/issues/{}/labels",
            repo.org,
            repo.repo,
            target.number()
        );
        let _: serde_json::Value = self
            .0
            .post(&route, Some(&json!({ "labels": [name] })))
            .await
            .map_err(to_hosting_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octocrab::Octocrab;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> OctocrabClient {
        OctocrabClient::new(
            Octocrab::builder()
                .base_uri(server.uri())
                .unwrap()
                .build()
                .unwrap(),
        )
    }

    fn repo() -> RepoId {
        RepoId::new("openeuler", "kernel")
    }

    fn not_found() -> ResponseTemplate {
        ResponseTemplate::new(404).set_body_json(json!({
            "message": "Not Found",
            "documentation_url": "https://docs.github.com/rest"
        }))
    }

    #[test]
    fn test_permissions_to_access_level() {
        let level = |admin, maintain, push, triage| {
            Permissions {
                admin,
                maintain,
                push,
                triage,
            }
            .access_level()
        };
        assert_eq!(level(true, true, true, true), AccessLevel::OWNER);
        assert_eq!(level(false, true, true, true), AccessLevel::MAINTAINER);
        assert_eq!(level(false, false, true, true), AccessLevel::DEVELOPER);
        assert_eq!(level(false, false, false, true), AccessLevel::REPORTER);
        assert_eq!(level(false, false, false, false), AccessLevel::GUEST);
    }

    #[tokio::test]
    async fn test_fetch_path_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/openeuler/kernel/contents/sig/sig-kernel/OWNERS"))
            .and(query_param("ref", "master"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "file",
                "encoding": "base64",
                "path": "sig/sig-kernel/OWNERS",
                "content": "bWFpbnRh\naW5lcnM=\n"
            })))
            .mount(&server)
            .await;

        let content = client(&server)
            .fetch_path_content(&repo(), "sig/sig-kernel/OWNERS", "master")
            .await
            .unwrap();
        assert_eq!(content.decode().unwrap(), b"maintainers");
    }

    #[tokio::test]
    async fn test_fetch_missing_path_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/openeuler/kernel/contents/missing.yaml"))
            .respond_with(not_found())
            .mount(&server)
            .await;

        let content = client(&server)
            .fetch_path_content(&repo(), "missing.yaml", "master")
            .await
            .unwrap();
        assert!(content.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_path_content_forbidden() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/openeuler/kernel/contents/secret.yaml"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "message": "Resource not accessible by integration",
                "documentation_url": "https://docs.github.com/rest"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .fetch_path_content(&repo(), "secret.yaml", "master")
            .await
            .unwrap_err();
        assert!(matches!(err, HostingError::Auth(_)));
    }

    #[tokio::test]
    async fn test_fetch_collaborators() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/openeuler/kernel/collaborators"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"login": "alice", "permissions": {"admin": true, "maintain": true, "push": true, "triage": true, "pull": true}},
                {"login": "bob", "permissions": {"admin": false, "maintain": false, "push": true, "triage": true, "pull": true}},
                {"login": "carol", "permissions": {"admin": false, "maintain": false, "push": false, "triage": false, "pull": true}}
            ])))
            .mount(&server)
            .await;

        let collaborators = client(&server).fetch_collaborators(&repo()).await.unwrap();
        assert_eq!(
            collaborators,
            vec![
                Collaborator::new("alice", AccessLevel::OWNER),
                Collaborator::new("bob", AccessLevel::DEVELOPER),
                Collaborator::new("carol", AccessLevel::GUEST),
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_collaborators_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/openeuler/kernel/collaborators"))
            .respond_with(not_found())
            .mount(&server)
            .await;

        let err = client(&server).fetch_collaborators(&repo()).await.unwrap_err();
        assert!(matches!(err, HostingError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_fetch_changed_paths() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/openeuler/kernel/pulls/12/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"filename": "docs/apiserver/README", "status": "modified"},
                {"filename": "sig/storage/OWNERS", "status": "added"}
            ])))
            .mount(&server)
            .await;

        let paths = client(&server).fetch_changed_paths(&repo(), 12).await.unwrap();
        assert_eq!(paths, vec!["docs/apiserver/README", "sig/storage/OWNERS"]);
    }

    #[tokio::test]
    async fn test_fetch_tree_keeps_blobs() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/openeuler/kernel/git/trees/master"))
            .and(query_param("recursive", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sha": "abc",
                "truncated": false,
                "tree": [
                    {"path": "sig", "type": "tree"},
                    {"path": "sig/sig-kernel/openeuler/kernel.yaml", "type": "blob"}
                ]
            })))
            .mount(&server)
            .await;

        let tree = client(&server).fetch_tree(&repo(), "master").await.unwrap();
        assert_eq!(tree, vec!["sig/sig-kernel/openeuler/kernel.yaml"]);
    }

    #[tokio::test]
    async fn test_list_labels() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/openeuler/kernel/labels"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "bug", "color": "d73a4a"},
                {"name": "sig/sig-kernel", "color": "0e8a16"}
            ])))
            .mount(&server)
            .await;

        let labels = client(&server).list_labels(&repo()).await.unwrap();
        assert_eq!(labels, vec!["bug", "sig/sig-kernel"]);
    }

    #[tokio::test]
    async fn test_write_operations() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/openeuler/kernel/issues/5/comments"))
            .and(body_json(json!({"body": "hello"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/repos/openeuler/kernel/labels"))
            .and(body_json(json!({"name": "sig/sig-kernel", "color": LABEL_COLOR})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 2})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/repos/openeuler/kernel/issues/5/labels"))
            .and(body_json(json!({"labels": ["sig/sig-kernel"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let target = EventTarget::MergeRequest(5);
        client.create_comment(&repo(), target, "hello").await.unwrap();
        client.create_label(&repo(), "sig/sig-kernel").await.unwrap();
        client.add_label(&repo(), target, "sig/sig-kernel").await.unwrap();
    }
}
