use std::sync::RwLock;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use taskdeck_types::api::{
    CreateStatusRequest, CreateTodoRequest, ErrorBody, LoginRequest, LoginResponse,
    RegisterRequest, SettingsResponse, SubscribeRequest, SubscriptionListResponse,
    SubscriptionResponse, TodoListResponse, TodoResponse, UnsubscribeRequest,
    UpdateSettingsRequest, UpdateStatusRequest, UpdateTodoRequest, UserResponse, VapidKeyResponse,
};
use taskdeck_types::models::{
    NotificationSettings, PublicUser, PushSubscription, Status, Todo,
};

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with an error body.
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        details: Option<serde_json::Value>,
    },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// A store action referenced a todo that is not in the mirror.
    #[error("todo {0} is not loaded")]
    NotLoaded(Uuid),
    #[error("{0}")]
    Internal(String),
}

/// The slice of the server the mirror store needs. [`ApiClient`] is the real
/// implementation; tests substitute an in-memory one.
#[allow(async_fn_in_trait)]
pub trait TodoApi {
    async fn list_todos(&self) -> Result<Vec<Todo>, ClientError>;
    async fn create_todo(&self, req: &CreateTodoRequest) -> Result<Todo, ClientError>;
    async fn update_todo(&self, id: Uuid, req: &UpdateTodoRequest) -> Result<Todo, ClientError>;
    async fn delete_todo(&self, id: Uuid) -> Result<(), ClientError>;
    async fn list_statuses(&self) -> Result<Vec<Status>, ClientError>;
    async fn create_status(&self, req: &CreateStatusRequest) -> Result<Status, ClientError>;
    async fn update_status(&self, id: Uuid, req: &UpdateStatusRequest)
    -> Result<Status, ClientError>;
    async fn delete_status(&self, id: Uuid) -> Result<(), ClientError>;
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: RwLock::new(None),
        }
    }

    pub fn set_token(&self, token: Option<String>) -> Result<(), ClientError> {
        let mut guard = self
            .token
            .write()
            .map_err(|e| ClientError::Internal(format!("token lock poisoned: {e}")))?;
        *guard = token;
        Ok(())
    }

    // -- Auth --

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<PublicUser, ClientError> {
        let body = RegisterRequest {
            email: email.into(),
            password: password.into(),
            name: name.into(),
        };
        let resp: UserResponse = self.request(Method::POST, "/auth/register", Some(&body)).await?;
        Ok(resp.user)
    }

    /// Stores the issued token for all subsequent calls.
    pub async fn login(&self, email: &str, password: &str) -> Result<PublicUser, ClientError> {
        let body = LoginRequest {
            email: email.into(),
            password: password.into(),
        };
        let resp: LoginResponse = self.request(Method::POST, "/auth/login", Some(&body)).await?;
        self.set_token(Some(resp.token))?;
        Ok(resp.user)
    }

    pub fn logout(&self) -> Result<(), ClientError> {
        self.set_token(None)
    }

    pub async fn me(&self) -> Result<PublicUser, ClientError> {
        let resp: UserResponse = self.request(Method::GET, "/auth/me", NO_BODY).await?;
        Ok(resp.user)
    }

    // -- Settings --

    pub async fn notification_settings(&self) -> Result<NotificationSettings, ClientError> {
        let resp: SettingsResponse = self
            .request(Method::GET, "/settings/notifications", NO_BODY)
            .await?;
        Ok(resp.settings)
    }

    pub async fn update_notification_settings(
        &self,
        req: &UpdateSettingsRequest,
    ) -> Result<NotificationSettings, ClientError> {
        let resp: SettingsResponse = self
            .request(Method::PUT, "/settings/notifications", Some(req))
            .await?;
        Ok(resp.settings)
    }

    // -- Push --

    pub async fn vapid_public_key(&self) -> Result<String, ClientError> {
        let resp: VapidKeyResponse = self
            .request(Method::GET, "/push/vapid-public-key", NO_BODY)
            .await?;
        Ok(resp.public_key)
    }

    pub async fn subscribe_push(
        &self,
        req: &SubscribeRequest,
    ) -> Result<PushSubscription, ClientError> {
        let resp: SubscriptionResponse =
            self.request(Method::POST, "/push/subscribe", Some(req)).await?;
        Ok(resp.subscription)
    }

    pub async fn unsubscribe_push(&self, endpoint: &str) -> Result<(), ClientError> {
        let body = UnsubscribeRequest {
            endpoint: endpoint.into(),
        };
        self.request_no_content(Method::POST, "/push/unsubscribe", Some(&body))
            .await
    }

    pub async fn push_subscriptions(&self) -> Result<Vec<PushSubscription>, ClientError> {
        let resp: SubscriptionListResponse = self
            .request(Method::GET, "/push/subscriptions", NO_BODY)
            .await?;
        Ok(resp.subscriptions)
    }

    // -- Plumbing --

    fn build(
        &self,
        method: Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> Result<reqwest::RequestBuilder, ClientError> {
        let mut builder = self.http.request(method, format!("{}{}", self.base_url, path));
        let guard = self
            .token
            .read()
            .map_err(|e| ClientError::Internal(format!("token lock poisoned: {e}")))?;
        if let Some(token) = guard.as_deref() {
            builder = builder.bearer_auth(token);
        }
        drop(guard);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        Ok(builder)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> Result<T, ClientError> {
        let response = self.build(method, path, body)?.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status, response).await);
        }
        Ok(response.json().await?)
    }

    async fn request_no_content(
        &self,
        method: Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> Result<(), ClientError> {
        let response = self.build(method, path, body)?.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status, response).await);
        }
        Ok(())
    }
}

/// `Option::<&()>::None` is unreadable at call sites; this is "no body".
const NO_BODY: Option<&()> = None;

async fn api_error(status: StatusCode, response: reqwest::Response) -> ClientError {
    let body: ErrorBody = response.json().await.unwrap_or(ErrorBody {
        error: "request failed".into(),
        details: None,
    });
    ClientError::Api {
        status: status.as_u16(),
        message: body.error,
        details: body.details,
    }
}

impl TodoApi for ApiClient {
    async fn list_todos(&self) -> Result<Vec<Todo>, ClientError> {
        let resp: TodoListResponse = self.request(Method::GET, "/todos", NO_BODY).await?;
        Ok(resp.todos)
    }

    async fn create_todo(&self, req: &CreateTodoRequest) -> Result<Todo, ClientError> {
        let resp: TodoResponse = self.request(Method::POST, "/todos", Some(req)).await?;
        Ok(resp.todo)
    }

    async fn update_todo(&self, id: Uuid, req: &UpdateTodoRequest) -> Result<Todo, ClientError> {
        let resp: TodoResponse = self
            .request(Method::PUT, &format!("/todos/{id}"), Some(req))
            .await?;
        Ok(resp.todo)
    }

    async fn delete_todo(&self, id: Uuid) -> Result<(), ClientError> {
        self.request_no_content(Method::DELETE, &format!("/todos/{id}"), NO_BODY)
            .await
    }

    async fn list_statuses(&self) -> Result<Vec<Status>, ClientError> {
        self.request(Method::GET, "/statuses", NO_BODY).await
    }

    async fn create_status(&self, req: &CreateStatusRequest) -> Result<Status, ClientError> {
        self.request(Method::POST, "/statuses", Some(req)).await
    }

    async fn update_status(
        &self,
        id: Uuid,
        req: &UpdateStatusRequest,
    ) -> Result<Status, ClientError> {
        self.request(Method::PUT, &format!("/statuses/{id}"), Some(req))
            .await
    }

    async fn delete_status(&self, id: Uuid) -> Result<(), ClientError> {
        self.request_no_content(Method::DELETE, &format!("/statuses/{id}"), NO_BODY)
            .await
    }
}
