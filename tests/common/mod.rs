//! In-memory stand-in for the REST backend.
//!
//! Records every request in order, hands out sequential ids on POST, keeps
//! objective link sets so they can be diffed against, and can be told to fail
//! a request matching a predicate.

#![allow(dead_code)]

use async_trait::async_trait;
use http::Method;
use serde_json::{json, Value};
use std::{
    collections::{BTreeSet, HashMap},
    sync::{Arc, Mutex},
    time::Duration,
};

use sitae_authoring::{ApiClient, ApiError, ApiRequest, Transport};

type Failure = Box<dyn Fn(&ApiRequest) -> bool + Send + Sync>;

#[derive(Default)]
struct State {
    log: Vec<ApiRequest>,
    next_id: usize,
    links: HashMap<String, BTreeSet<String>>,
    reads: HashMap<String, Value>,
    fail: Option<Failure>,
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<State>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A client over this backend with caching on.
    pub fn client(&self) -> ApiClient {
        ApiClient::new(self.clone(), Duration::from_secs(300))
    }

    pub fn seed_links(&self, links_path: &str, ids: &[&str]) {
        self.state
            .lock()
            .unwrap()
            .links
            .insert(links_path.to_owned(), ids.iter().map(|s| s.to_string()).collect());
    }

    pub fn links(&self, links_path: &str) -> BTreeSet<String> {
        self.state
            .lock()
            .unwrap()
            .links
            .get(links_path)
            .cloned()
            .unwrap_or_default()
    }

    /// Canned body for a GET on `path`.
    pub fn seed_read(&self, path: &str, body: Value) {
        self.state.lock().unwrap().reads.insert(path.to_owned(), body);
    }

    pub fn fail_when<F>(&self, pred: F)
    where
        F: Fn(&ApiRequest) -> bool + Send + Sync + 'static,
    {
        self.state.lock().unwrap().fail = Some(Box::new(pred));
    }

    pub fn heal(&self) {
        self.state.lock().unwrap().fail = None;
    }

    pub fn log(&self) -> Vec<ApiRequest> {
        self.state.lock().unwrap().log.clone()
    }

    /// `"POST /topics/t1/quizzes"`-style lines, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.log().iter().map(|r| r.to_string()).collect()
    }

    pub fn writes(&self) -> Vec<String> {
        self.log()
            .iter()
            .filter(|r| r.method != Method::GET)
            .map(|r| r.to_string())
            .collect()
    }

    pub fn clear_log(&self) {
        self.state.lock().unwrap().log.clear();
    }
}

fn is_links_path(path: &str) -> bool {
    path.ends_with("/learning-outcomes") || path.ends_with("/module-objectives")
}

fn singular(collection: &str) -> &str {
    match collection {
        "quizzes" => "quiz",
        other => other.strip_suffix('s').unwrap_or(other),
    }
}

fn split_last(path: &str) -> (&str, &str) {
    path.rsplit_once('/').unwrap_or((path, ""))
}

#[async_trait]
impl Transport for FakeBackend {
    async fn execute(&self, request: ApiRequest) -> Result<Option<Value>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.log.push(request.clone());
        if let Some(fail) = &state.fail {
            if fail(&request) {
                return Err(ApiError::Status {
                    status: 500,
                    message: format!("injected failure on {request}"),
                });
            }
        }

        let path = request.path.as_str();
        match request.method {
            Method::GET if is_links_path(path) && path.contains("/objectives/") => {
                let ids = state.links.get(path).cloned().unwrap_or_default();
                Ok(Some(Value::Array(
                    ids.into_iter().map(|id| json!({ "id": id, "is_primary": false })).collect(),
                )))
            }
            Method::GET => Ok(Some(state.reads.get(path).cloned().unwrap_or(json!([])))),
            Method::POST if is_links_path(path) => {
                let body = request.body.clone().unwrap_or_default();
                let related = ["learning_outcome_id", "module_objective_id"]
                    .iter()
                    .find_map(|k| body.get(*k).and_then(Value::as_str))
                    .unwrap_or_default()
                    .to_owned();
                state.links.entry(path.to_owned()).or_default().insert(related);
                Ok(None)
            }
            Method::POST => {
                state.next_id += 1;
                let (_, collection) = split_last(path);
                let id = format!("{}-{}", singular(collection), state.next_id);
                Ok(Some(json!({ "id": id })))
            }
            Method::DELETE => {
                let (parent, related) = split_last(path);
                if is_links_path(parent) {
                    if let Some(set) = state.links.get_mut(parent) {
                        set.remove(related);
                    }
                }
                Ok(None)
            }
            _ => Ok(Some(json!({ "ok": true }))),
        }
    }
}
