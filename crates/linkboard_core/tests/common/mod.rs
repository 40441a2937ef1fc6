#![allow(dead_code)]

use linkboard_core::adapter::rest::{
    HttpMethod, RestAdapter, RestRequest, RestResponse, RestTransport, TransportError,
};
use linkboard_core::ui::{AuthProvider, ConfirmPrompt, StatusKind, StatusMessage, StatusSink};
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// In-test stand-in for the board's Flask API.
///
/// Links get `max + 1` ids, notices get string ids and increasing
/// `created_at`; both collections are returned oldest-first.
#[derive(Clone, Default)]
pub struct FakeRestServer {
    state: Rc<RefCell<ServerState>>,
}

#[derive(Default)]
struct ServerState {
    links: Vec<Value>,
    notices: Vec<Value>,
    next_notice: u64,
    offline: bool,
    scripted: VecDeque<(Option<(HttpMethod, String)>, RestResponse)>,
    log: Vec<(HttpMethod, String)>,
}

impl FakeRestServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn adapter(&self) -> RestAdapter<FakeRestServer> {
        RestAdapter::new(self.clone())
    }

    pub fn set_offline(&self, offline: bool) {
        self.state.borrow_mut().offline = offline;
    }

    /// The next request gets this response instead of being handled.
    pub fn respond_next(&self, status: u16, body: &str) {
        self.state
            .borrow_mut()
            .scripted
            .push_back((None, RestResponse::new(status, body)));
    }

    /// The next request to `method path` gets this response.
    pub fn respond_on(&self, method: HttpMethod, path: &str, status: u16, body: &str) {
        self.state
            .borrow_mut()
            .scripted
            .push_back((Some((method, path.to_string())), RestResponse::new(status, body)));
    }

    pub fn requests(&self) -> Vec<(HttpMethod, String)> {
        self.state.borrow().log.clone()
    }

    pub fn count(&self, method: HttpMethod, path: &str) -> usize {
        self.state
            .borrow()
            .log
            .iter()
            .filter(|(m, p)| *m == method && p == path)
            .count()
    }

    pub fn link_documents(&self) -> Vec<Value> {
        self.state.borrow().links.clone()
    }

    /// Inserts a link as another client would.
    pub fn insert_link(&self, url: &str, title: &str, note: &str) -> i64 {
        let mut state = self.state.borrow_mut();
        let id = next_link_id(&state.links);
        state.links.push(json!({
            "id": id, "url": url, "title": title, "description": "",
            "image": "", "note": note,
        }));
        id
    }

    fn handle(&self, request: &RestRequest) -> RestResponse {
        let mut state = self.state.borrow_mut();
        let segments: Vec<&str> = request.path.trim_start_matches('/').split('/').collect();
        let body = request.body.clone().unwrap_or(Value::Null);

        match (request.method, segments.as_slice()) {
            (HttpMethod::Get, ["api", "links"]) => ok(Value::Array(state.links.clone())),
            (HttpMethod::Post, ["api", "links"]) => {
                let id = next_link_id(&state.links);
                let link = json!({
                    "id": id,
                    "url": body["url"],
                    "title": body["title"],
                    "description": body.get("description").cloned().unwrap_or(json!("")),
                    "image": body.get("image").cloned().unwrap_or(json!("")),
                    "note": body.get("note").cloned().unwrap_or(json!("")),
                });
                state.links.push(link.clone());
                ok(json!({ "success": true, "link": link }))
            }
            (HttpMethod::Delete, ["api", "links", id]) => match id.parse::<i64>() {
                Ok(id) => {
                    state.links.retain(|link| link["id"].as_i64() != Some(id));
                    ok(json!({ "success": true }))
                }
                Err(_) => not_found(),
            },
            (HttpMethod::Patch, ["api", "links", id]) => {
                let id = id.parse::<i64>().ok();
                match state
                    .links
                    .iter_mut()
                    .find(|link| id.is_some() && link["id"].as_i64() == id)
                {
                    Some(link) => {
                        link["note"] = body["note"].clone();
                        ok(json!({ "success": true }))
                    }
                    None => not_found(),
                }
            }
            (HttpMethod::Get, ["api", "notice"]) => {
                ok(json!({ "notices": state.notices.clone() }))
            }
            (HttpMethod::Post, ["api", "notice"]) => {
                state.next_notice += 1;
                let counter = state.next_notice;
                state.notices.push(json!({
                    "id": format!("notice-{counter}"),
                    "content": body["text"],
                    "created_at": 1_700_000_000.0 + counter as f64,
                }));
                ok(json!({ "success": true }))
            }
            (HttpMethod::Delete, ["api", "notice", id]) => {
                state.notices.retain(|notice| notice["id"].as_str() != Some(*id));
                ok(json!({ "success": true }))
            }
            (HttpMethod::Delete, ["api", "notice"]) => {
                state.notices.clear();
                ok(json!({ "success": true }))
            }
            _ => not_found(),
        }
    }
}

impl RestTransport for FakeRestServer {
    async fn send(&self, request: RestRequest) -> Result<RestResponse, TransportError> {
        {
            let mut state = self.state.borrow_mut();
            state.log.push((request.method, request.path.clone()));
            if state.offline {
                return Err(TransportError::new("connection refused"));
            }
            let scripted = state.scripted.iter().position(|(route, _)| {
                route
                    .as_ref()
                    .map_or(true, |(method, path)| *method == request.method && *path == request.path)
            });
            if let Some((_, response)) = scripted.and_then(|index| state.scripted.remove(index)) {
                return Ok(response);
            }
        }
        Ok(self.handle(&request))
    }
}

fn next_link_id(links: &[Value]) -> i64 {
    links
        .iter()
        .filter_map(|link| link["id"].as_i64())
        .max()
        .unwrap_or(0)
        + 1
}

fn ok(body: Value) -> RestResponse {
    RestResponse::new(200, body.to_string())
}

fn not_found() -> RestResponse {
    RestResponse::new(404, json!({ "success": false, "message": "not found" }).to_string())
}

/// Status sink that keeps every message.
#[derive(Clone, Default)]
pub struct RecordingStatus {
    messages: Rc<RefCell<Vec<StatusMessage>>>,
}

impl RecordingStatus {
    pub fn messages(&self) -> Vec<StatusMessage> {
        self.messages.borrow().clone()
    }

    pub fn last(&self) -> Option<StatusMessage> {
        self.messages.borrow().last().cloned()
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages
            .borrow()
            .iter()
            .filter(|message| message.kind == StatusKind::Error)
            .map(|message| message.text.clone())
            .collect()
    }

    pub fn boxed(&self) -> Box<dyn StatusSink> {
        Box::new(self.clone())
    }
}

impl StatusSink for RecordingStatus {
    fn show(&self, message: StatusMessage) {
        self.messages.borrow_mut().push(message);
    }
}

/// Confirmation prompt answering from a script; unscripted questions are
/// answered `true`.
#[derive(Clone, Default)]
pub struct ScriptedPrompt {
    answers: Rc<RefCell<VecDeque<bool>>>,
    asked: Rc<RefCell<Vec<String>>>,
}

impl ScriptedPrompt {
    pub fn answer_next(&self, answer: bool) {
        self.answers.borrow_mut().push_back(answer);
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }
}

impl ConfirmPrompt for ScriptedPrompt {
    async fn confirm(&self, message: &str) -> bool {
        self.asked.borrow_mut().push(message.to_string());
        self.answers.borrow_mut().pop_front().unwrap_or(true)
    }
}

/// Editor flag that tests can flip.
#[derive(Clone)]
pub struct SwitchAuth {
    editor: Rc<Cell<bool>>,
}

impl SwitchAuth {
    pub fn new(editor: bool) -> Self {
        Self {
            editor: Rc::new(Cell::new(editor)),
        }
    }

    pub fn set(&self, editor: bool) {
        self.editor.set(editor);
    }

    pub fn boxed(&self) -> Box<dyn AuthProvider> {
        Box::new(self.clone())
    }
}

impl AuthProvider for SwitchAuth {
    fn is_editor(&self) -> bool {
        self.editor.get()
    }

    fn logout(&self) -> Result<(), String> {
        self.editor.set(false);
        Ok(())
    }
}
