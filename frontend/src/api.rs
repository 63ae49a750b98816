use std::rc::Rc;

use serde::{de::DeserializeOwned, Serialize};
use tasklist_shared::{Credentials, NewTask, StoreError, Task, TaskBackend, TaskPatch, UserIdentity};
use uuid::Uuid;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

/// The task and accounts service, reached over `fetch`.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    api_base: Rc<str>,
}

impl HttpBackend {
    pub fn new(api_base: &str) -> Self {
        Self {
            api_base: Rc::from(api_base),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    pub async fn current_user(&self) -> Result<Option<UserIdentity>, StoreError> {
        let text = send("GET", &self.url("/accounts/user"), None).await?;
        decode(&text)
    }

    pub async fn sign_in(&self, credentials: &Credentials) -> Result<Option<UserIdentity>, StoreError> {
        let text = send("POST", &self.url("/accounts/login"), Some(encode(credentials)?)).await?;
        decode::<UserIdentity>(&text).map(Some)
    }

    pub async fn sign_up(&self, credentials: &Credentials) -> Result<Option<UserIdentity>, StoreError> {
        let text = send("POST", &self.url("/accounts/signup"), Some(encode(credentials)?)).await?;
        decode::<UserIdentity>(&text).map(Some)
    }

    pub async fn sign_out(&self) -> Result<Option<UserIdentity>, StoreError> {
        send("POST", &self.url("/accounts/logout"), None).await?;
        Ok(None)
    }
}

impl TaskBackend for HttpBackend {
    async fn load(&self) -> Result<Vec<Task>, StoreError> {
        let text = send("GET", &self.url("/tasks"), None).await?;
        decode(&text)
    }

    async fn insert(&self, fields: NewTask) -> Result<Task, StoreError> {
        let text = send("POST", &self.url("/tasks"), Some(encode(&fields)?)).await?;
        decode(&text)
    }

    async fn update(&self, id: Uuid, patch: TaskPatch) -> Result<Task, StoreError> {
        let url = self.url(&format!("/tasks/{}", id));
        let text = send("PUT", &url, Some(encode(&patch)?))
            .await
            .map_err(|err| not_found_as(id, err))?;
        decode(&text)
    }

    async fn remove(&self, id: Uuid) -> Result<(), StoreError> {
        let url = self.url(&format!("/tasks/{}", id));
        send("DELETE", &url, None)
            .await
            .map_err(|err| not_found_as(id, err))?;
        Ok(())
    }
}

fn not_found_as(id: Uuid, err: StoreError) -> StoreError {
    match err {
        StoreError::Rejected { status: 404 } => StoreError::NotFound(id),
        other => other,
    }
}

fn status_error(status: u16) -> StoreError {
    match status {
        401 | 403 => StoreError::NotAuthenticated,
        _ => StoreError::Rejected { status },
    }
}

fn encode<T: Serialize>(body: &T) -> Result<String, StoreError> {
    serde_json::to_string(body).map_err(|e| StoreError::sync(format!("failed to serialize request: {}", e)))
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, StoreError> {
    serde_json::from_str(text).map_err(|e| StoreError::sync(format!("failed to parse JSON: {}", e)))
}

async fn send(method: &str, url: &str, body: Option<String>) -> Result<String, StoreError> {
    let opts = RequestInit::new();
    opts.set_method(method);
    if let Some(body) = &body {
        opts.set_body(&JsValue::from_str(body));
    }

    let request = Request::new_with_str_and_init(url, &opts)
        .map_err(|_| StoreError::sync("failed to create request"))?;
    if body.is_some() {
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(|_| StoreError::sync("failed to set header"))?;
    }

    let window = web_sys::window().ok_or_else(|| StoreError::sync("no window"))?;
    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|_| StoreError::sync("failed to send request"))?
        .into();

    if !response.ok() {
        tracing::debug!(method, url, status = response.status(), "request rejected");
        return Err(status_error(response.status()));
    }

    let text_promise = response
        .text()
        .map_err(|_| StoreError::sync("failed to read response"))?;
    JsFuture::from(text_promise)
        .await
        .map_err(|_| StoreError::sync("failed to get text"))?
        .as_string()
        .ok_or_else(|| StoreError::sync("failed to convert to string"))
}
