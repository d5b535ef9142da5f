//! GitHub REST implementation of [`ReleaseHost`].
//!
//! Requests carry no timeout and are never retried; a stalled connection
//! stalls the release.

use super::{FileContents, FileUpdate, HostError, NewRelease, Release, ReleaseAsset, ReleaseHost};
use crate::repository::RemoteRepository;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;
use ureq::http::Response;
use std::fs::File;
use ureq::{Body, RequestBuilder, SendBody};

/// Default REST API root.
pub const GITHUB_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";
const ACCEPT: &str = "application/vnd.github+json";

/// Client for the GitHub REST API.
pub struct GitHubClient {
    agent: ureq::Agent,
    token: String,
    api_url: String,
}

#[derive(Serialize)]
struct PutFileBody<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

impl GitHubClient {
    /// Creates a client authenticating with `token`.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_api_url(token, GITHUB_API_URL)
    }

    /// Creates a client against a non-default API root, such as GitHub
    /// Enterprise.
    #[must_use]
    pub fn with_api_url(token: impl Into<String>, api_url: impl Into<String>) -> Self {
        let config = ureq::Agent::config_builder().build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            token: token.into(),
            api_url: api_url.into().trim_end_matches('/').to_owned(),
        }
    }

    fn repo_url(&self, repo: &RemoteRepository, path: &str) -> String {
        format!("{}/repos/{}/{}/{path}", self.api_url, repo.owner, repo.name)
    }

    fn authorise<B>(&self, request: RequestBuilder<B>) -> RequestBuilder<B> {
        request
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION)
            .header(
                "User-Agent",
                concat!("gorocket/", env!("CARGO_PKG_VERSION")),
            )
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, HostError> {
        debug!("GET {url}");
        let response = self
            .authorise(self.agent.get(url))
            .call()
            .map_err(|err| map_ureq_error(url, &err))?;
        decode_json(url, response)
    }
}

impl ReleaseHost for GitHubClient {
    fn release_by_tag(&self, repo: &RemoteRepository, tag: &str) -> Result<Release, HostError> {
        self.get_json(&self.repo_url(repo, &format!("releases/tags/{tag}")))
    }

    fn create_release(
        &self,
        repo: &RemoteRepository,
        request: &NewRelease,
    ) -> Result<Release, HostError> {
        let url = self.repo_url(repo, "releases");
        debug!("POST {url}");
        let response = self
            .authorise(self.agent.post(&url))
            .send_json(request)
            .map_err(|err| map_ureq_error(&url, &err))?;
        decode_json(&url, response)
    }

    fn upload_asset(&self, release: &Release, asset: &ReleaseAsset) -> Result<(), HostError> {
        let url = upload_endpoint(&release.upload_url).to_owned();
        let (file, length) = open_asset(asset)?;
        debug!("POST {url}?name={} ({length} bytes)", asset.name);
        self.authorise(self.agent.post(&url))
            .query("name", &asset.name)
            .header("Content-Type", "application/octet-stream")
            .header("Content-Length", length.to_string())
            .send(SendBody::from_owned_reader(file))
            .map_err(|err| map_ureq_error(&url, &err))?;
        Ok(())
    }

    fn file_contents(
        &self,
        repo: &RemoteRepository,
        path: &str,
    ) -> Result<FileContents, HostError> {
        self.get_json(&self.repo_url(repo, &format!("contents/{path}")))
    }

    fn put_file(
        &self,
        repo: &RemoteRepository,
        path: &str,
        update: &FileUpdate,
    ) -> Result<(), HostError> {
        let url = self.repo_url(repo, &format!("contents/{path}"));
        debug!("PUT {url}");
        self.authorise(self.agent.put(&url))
            .send_json(put_file_body(update))
            .map_err(|err| map_ureq_error(&url, &err))?;
        Ok(())
    }
}

fn put_file_body(update: &FileUpdate) -> PutFileBody<'_> {
    PutFileBody {
        message: &update.message,
        content: STANDARD.encode(&update.content),
        sha: update.sha.as_deref(),
    }
}

/// Strips the URI template suffix from a release's `upload_url`.
fn upload_endpoint(upload_url: &str) -> &str {
    upload_url
        .split_once('{')
        .map_or(upload_url, |(endpoint, _)| endpoint)
}

/// Opens an asset for a streamed upload and reports its byte length.
fn open_asset(asset: &ReleaseAsset) -> Result<(File, u64), HostError> {
    let io_error = |source| HostError::Io {
        path: asset.path.clone(),
        source,
    };
    let file = File::open(&asset.path).map_err(io_error)?;
    let length = file.metadata().map_err(io_error)?.len();
    Ok((file, length))
}

fn decode_json<T: DeserializeOwned>(
    url: &str,
    mut response: Response<Body>,
) -> Result<T, HostError> {
    response
        .body_mut()
        .read_json()
        .map_err(|err| HostError::Decode {
            url: url.to_owned(),
            reason: err.to_string(),
        })
}

/// Map a ureq error to a [`HostError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> HostError {
    match err {
        ureq::Error::StatusCode(404) => HostError::NotFound {
            url: url.to_owned(),
        },
        other => HostError::Http {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
