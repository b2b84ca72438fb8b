// ABOUTME: Test support utilities.
// ABOUTME: Scripted prober, recording deploy target, test config, and a tiny HTTP server.

use async_trait::async_trait;
use bgdeploy::config::Config;
use bgdeploy::deploy::{DeployError, DeployTarget};
use bgdeploy::health::{HealthCheckResult, HealthProber, join_url};
use bgdeploy::state::{DeploymentState, StateStore, StoreError};
use bgdeploy::types::{Environment, Version};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Once;
use std::time::Duration;

pub const BLUE: &str = "http://blue.test";
pub const GREEN: &str = "http://green.test";
pub const PRODUCTION: &str = "http://production.test";

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("bgdeploy=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Config pointing at fake hosts, with no waiting between attempts and the
/// state/report files inside `dir`.
#[allow(dead_code)]
pub fn test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.environments.blue = BLUE.to_string();
    config.environments.green = GREEN.to_string();
    config.environments.production = PRODUCTION.to_string();
    config.health.interval = Duration::ZERO;
    config.health.timeout = Duration::from_millis(500);
    config.deploy.warmup = Duration::ZERO;
    config.files.state = dir.join("deployment-state.json");
    config.files.report = dir.join("deployment-report.json");
    config
}

/// Prober that answers from a script instead of the network.
///
/// Everything is healthy unless a base URL or a single endpoint was marked
/// down. Every call is recorded.
#[derive(Default)]
pub struct ScriptedProber {
    down_urls: Mutex<HashSet<String>>,
    down_endpoints: Mutex<HashSet<String>>,
    down_after: Mutex<HashMap<String, usize>>,
    calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedProber {
    pub fn healthy() -> Self {
        Self::default()
    }

    /// Every endpoint of `base_url` fails.
    pub fn with_down(self, base_url: &str) -> Self {
        self.down_urls.lock().insert(base_url.to_string());
        self
    }

    /// Only `endpoint` of `base_url` fails.
    pub fn with_down_endpoint(self, base_url: &str, endpoint: &str) -> Self {
        self.down_endpoints
            .lock()
            .insert(join_url(base_url, endpoint));
        self
    }

    /// `base_url` answers its first `probes` probes, then fails.
    pub fn with_down_after(self, base_url: &str, probes: usize) -> Self {
        self.down_after.lock().insert(base_url.to_string(), probes);
        self
    }

    /// Bring a previously failing base URL back.
    pub fn recover(&self, base_url: &str) {
        self.down_urls.lock().remove(base_url);
    }

    /// Number of probes sent to any endpoint of `base_url`.
    pub fn calls_for(&self, base_url: &str) -> usize {
        let prefix = format!("{}/", base_url.trim_end_matches('/'));
        self.calls
            .lock()
            .iter()
            .filter(|url| url.starts_with(&prefix))
            .count()
    }
}

#[async_trait]
impl HealthProber for ScriptedProber {
    async fn probe(&self, base_url: &str, endpoint: &str) -> HealthCheckResult {
        let url = join_url(base_url, endpoint);
        let previous = self.calls_for(base_url);
        self.calls.lock().push(url.clone());

        let exhausted = self
            .down_after
            .lock()
            .get(base_url)
            .is_some_and(|limit| previous >= *limit);

        if exhausted
            || self.down_urls.lock().contains(base_url)
            || self.down_endpoints.lock().contains(&url)
        {
            HealthCheckResult::unhealthy(url, Duration::from_millis(1), "HTTP 503 Service Unavailable")
        } else {
            HealthCheckResult::healthy(url, Duration::from_millis(1))
        }
    }
}

/// A call the orchestrator made against the deploy target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetCall {
    Deploy(String, Environment),
    Switch(Environment, Environment),
}

/// Deploy target that records calls and can be told to fail.
#[derive(Default)]
pub struct RecordingTarget {
    calls: Mutex<Vec<TargetCall>>,
    fail_deploy: bool,
    fail_switch: bool,
}

#[allow(dead_code)]
impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_deploy() -> Self {
        Self {
            fail_deploy: true,
            ..Self::default()
        }
    }

    pub fn failing_switch() -> Self {
        Self {
            fail_switch: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<TargetCall> {
        self.calls.lock().clone()
    }

    pub fn switches(&self) -> Vec<(Environment, Environment)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                TargetCall::Switch(from, to) => Some((from, to)),
                TargetCall::Deploy(..) => None,
            })
            .collect()
    }
}

#[async_trait]
impl DeployTarget for RecordingTarget {
    async fn deploy(
        &self,
        version: &Version,
        environment: Environment,
        _url: &str,
    ) -> Result<(), DeployError> {
        self.calls
            .lock()
            .push(TargetCall::Deploy(version.to_string(), environment));
        if self.fail_deploy {
            return Err(DeployError::TargetCommand {
                step: "deploy",
                message: "exit status 1".to_string(),
            });
        }
        Ok(())
    }

    async fn switch_traffic(
        &self,
        from: Environment,
        to: Environment,
        _url: &str,
    ) -> Result<(), DeployError> {
        self.calls.lock().push(TargetCall::Switch(from, to));
        // Switching back during rollback always works
        if self.fail_switch && to != Environment::Blue {
            return Err(DeployError::TargetCommand {
                step: "switch",
                message: "exit status 1".to_string(),
            });
        }
        Ok(())
    }
}

/// State store whose saves start failing after a number of successful ones.
pub struct FailingStore {
    state: Mutex<DeploymentState>,
    saves: Mutex<usize>,
    succeed_first: usize,
}

#[allow(dead_code)]
impl FailingStore {
    /// Every save fails.
    pub fn always() -> Self {
        Self::after(0)
    }

    /// The first `saves` saves succeed, the rest fail.
    pub fn after(saves: usize) -> Self {
        Self {
            state: Mutex::new(DeploymentState::default()),
            saves: Mutex::new(0),
            succeed_first: saves,
        }
    }

    pub fn snapshot(&self) -> DeploymentState {
        self.state.lock().clone()
    }

    /// Number of save attempts, failed ones included.
    pub fn save_attempts(&self) -> usize {
        *self.saves.lock()
    }
}

#[async_trait]
impl StateStore for FailingStore {
    async fn load(&self) -> DeploymentState {
        self.state.lock().clone()
    }

    async fn save(&self, state: &DeploymentState) -> Result<(), StoreError> {
        let attempt = {
            let mut saves = self.saves.lock();
            *saves += 1;
            *saves
        };
        if attempt > self.succeed_first {
            return Err(StoreError::Write {
                path: "deployment-state.json".into(),
                source: std::io::Error::other("disk full"),
            });
        }
        *self.state.lock() = state.clone();
        Ok(())
    }
}

/// Start a minimal HTTP/1.1 server answering each path with a fixed status.
///
/// Unknown paths get 404. A status of 0 means the server accepts the
/// connection but never answers. Returns the base URL.
#[allow(dead_code)]
pub async fn spawn_http_server(routes: Vec<(&'static str, u16)>) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let routes = routes.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let mut read = 0;
                while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf[read..]).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => read += n,
                    }
                    if read == buf.len() {
                        return;
                    }
                }

                let request = String::from_utf8_lossy(&buf[..read]);
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                let status = routes
                    .iter()
                    .find(|(p, _)| *p == path)
                    .map(|(_, s)| *s)
                    .unwrap_or(404);

                if status == 0 {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    return;
                }

                let response = format!(
                    "HTTP/1.1 {status} Status\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{addr}")
}
