//! GossipAI REST API Client
//!
//! HTTP client for the conversation analysis service.

use futures_util::StreamExt as _;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use super::base_url::{BaseUrl, DEFAULT_API_URL};
use super::error::{ApiError, ApiResult};
use super::outcome::{resolve, Outcome};
use crate::demo;
use crate::models::{
    AnalysisCard, AnalysisEnvelope, AnalysisResult, ChatReply, ChatRequest, DeleteResponse,
    HistoryDetail, HistoryItem, LoginRequest, LoginResponse, Preset, RegisterRequest,
    RegisterResponse, SuggestedResponse, SuggestionsRequest, SuggestionsResponse, User,
};
use crate::progress::{Milestone, ProgressTracker, Stage};
use crate::session::Session;
use crate::upload::{UploadBatch, UploadError, UploadFile};

/// Chunk size for streamed upload bodies
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the service; normalized to `https://<host>/api/v1`
    pub base_url: String,
    /// Whole-request timeout; `None` keeps the HTTP stack default
    pub request_timeout: Option<Duration>,
    /// Serve labeled demo data when fallback-capable calls fail
    pub demo_mode: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            request_timeout: None,
            demo_mode: false,
        }
    }
}

/// Called after a 401 has cleared the session, e.g. to send the user to login
pub trait UnauthorizedHandler: Send + Sync {
    fn on_unauthorized(&self);
}

impl<F> UnauthorizedHandler for F
where
    F: Fn() + Send + Sync,
{
    fn on_unauthorized(&self) {
        self()
    }
}

/// Optional knobs shared by every analysis submission
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl AnalysisOptions {
    fn append_to(&self, mut form: Form) -> Form {
        if let Some(prompt) = &self.additional_prompt {
            form = form.text("additional_prompt", prompt.clone());
        }
        if let Some(preset_id) = &self.preset_id {
            form = form.text("preset_id", preset_id.clone());
        }
        if let Some(temperature) = self.temperature {
            form = form.text("temperature", temperature.to_string());
        }
        form
    }
}

/// Body of a text analysis request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextAnalysisRequest {
    pub text: String,
    #[serde(flatten)]
    pub options: AnalysisOptions,
}

impl TextAnalysisRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: AnalysisOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }
}

/// A conversation in one of the accepted forms
#[derive(Debug, Clone)]
pub enum Submission {
    Text(TextAnalysisRequest),
    File(UploadFile, AnalysisOptions),
    Batch(UploadBatch, AnalysisOptions),
}

impl Submission {
    fn demo_result(&self) -> AnalysisResult {
        match self {
            Submission::Text(request) => demo::text_analysis(&request.text),
            Submission::File(..) => demo::file_analysis(),
            Submission::Batch(batch, _) if batch.len() == 1 => demo::file_analysis(),
            Submission::Batch(..) => demo::multi_file_analysis(),
        }
    }
}

/// GossipAI API client
///
/// Holds the session explicitly; share it behind an `Arc` rather than a global.
pub struct ApiClient {
    http: Client,
    base_url: BaseUrl,
    session: Arc<Session>,
    demo_mode: bool,
    on_unauthorized: Option<Arc<dyn UnauthorizedHandler>>,
}

impl ApiClient {
    /// Create a client bound to `session`
    pub fn new(config: ClientConfig, session: Arc<Session>) -> ApiResult<Self> {
        let base_url = BaseUrl::new(&config.base_url)?;

        let mut builder =
            Client::builder().user_agent(concat!("gossipai/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ApiError::Transport)?;

        tracing::debug!(base_url = %base_url, demo_mode = config.demo_mode, "API client ready");

        Ok(Self {
            http,
            base_url,
            session,
            demo_mode: config.demo_mode,
            on_unauthorized: None,
        })
    }

    /// Register the hook invoked once per 401 response
    pub fn with_unauthorized_handler(mut self, handler: impl UnauthorizedHandler + 'static) -> Self {
        self.on_unauthorized = Some(Arc::new(handler));
        self
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn demo_mode(&self) -> bool {
        self.demo_mode
    }

    // ============================================
    // Request plumbing
    // ============================================

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.base_url.endpoint(path);
        let request_id = uuid::Uuid::new_v4().to_string();
        tracing::debug!(%method, %url, %request_id, "API request");

        let mut builder = self
            .http
            .request(method, url)
            .header("X-Request-Id", request_id);
        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let result = self.exchange(builder).await;
        if matches!(result, Err(ApiError::Unauthorized)) {
            self.handle_unauthorized();
        }
        result
    }

    /// Perform the call and decode the body; a 401 leaves the session alone
    async fn exchange<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let response = builder.send().await.map_err(ApiError::from_reqwest)?;
        let status = response.status();
        tracing::debug!(status = status.as_u16(), "API response");

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), %message, "API returned an error");
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await.map_err(ApiError::from_reqwest)?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(self.request(Method::GET, path)).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApiResult<T> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    fn handle_unauthorized(&self) {
        tracing::warn!("Session rejected by the API; clearing token");
        if let Err(e) = self.session.clear() {
            tracing::warn!(error = %e, "Failed to remove persisted token");
        }
        if let Some(handler) = &self.on_unauthorized {
            handler.on_unauthorized();
        }
    }

    // ============================================
    // Authentication
    // ============================================

    /// Send credentials. A 401 here means they were wrong, not that a
    /// session expired, so the held token and the handler are left alone.
    async fn post_credentials<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.exchange(self.request(Method::POST, path).json(body))
            .await
            .map_err(|e| match e {
                ApiError::Unauthorized => ApiError::InvalidCredentials,
                other => other,
            })
    }

    /// Log in and keep the issued token
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        let response: LoginResponse = self
            .post_credentials("/auth/login", &LoginRequest { email, password })
            .await?;

        self.session.set_token(&response.access_token)?;
        tracing::info!(email, "Logged in");
        Ok(response)
    }

    /// Create an account; the token is kept when the backend issues one
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> ApiResult<RegisterResponse> {
        let response: RegisterResponse = self
            .post_credentials(
                "/auth/register",
                &RegisterRequest {
                    email,
                    password,
                    name,
                },
            )
            .await?;

        match &response.access_token {
            Some(token) => {
                self.session.set_token(token)?;
                tracing::info!(email, "Registered and logged in");
            }
            None => tracing::info!(email, "Registered; email confirmation pending"),
        }
        Ok(response)
    }

    /// Profile of the logged-in user
    pub async fn current_user(&self) -> ApiResult<User> {
        self.get("/auth/user").await
    }

    /// Forget the session locally
    pub fn logout(&self) -> ApiResult<()> {
        self.session.clear()?;
        tracing::info!("Logged out");
        Ok(())
    }

    // ============================================
    // Analysis
    // ============================================

    fn text_endpoint(&self) -> &'static str {
        if self.session.is_authenticated() {
            "/analysis/text"
        } else {
            "/analysis/text/public"
        }
    }

    /// Analyze pasted conversation text
    pub async fn analyze_text(
        &self,
        request: TextAnalysisRequest,
    ) -> ApiResult<Outcome<AnalysisResult>> {
        let submission = Submission::Text(request);
        let result = self.submit(&submission, None).await;
        resolve("analyze_text", self.demo_mode, result, || {
            submission.demo_result()
        })
    }

    /// Analyze one screenshot, recording or text export
    pub async fn analyze_file(
        &self,
        file: UploadFile,
        options: AnalysisOptions,
    ) -> ApiResult<Outcome<AnalysisResult>> {
        let submission = Submission::File(file, options);
        let result = self.submit(&submission, None).await;
        resolve("analyze_file", self.demo_mode, result, || {
            submission.demo_result()
        })
    }

    /// Analyze an ordered batch of screenshots
    pub async fn analyze_files(
        &self,
        batch: UploadBatch,
        options: AnalysisOptions,
    ) -> ApiResult<Outcome<AnalysisResult>> {
        let submission = Submission::Batch(batch, options);
        let result = self.submit(&submission, None).await;
        resolve("analyze_files", self.demo_mode, result, || {
            submission.demo_result()
        })
    }

    /// Submit any conversation form, reporting milestones to `tracker`.
    ///
    /// The tracker reflects the real request: a failure shows as `Failed`
    /// even when demo mode then serves canned data.
    pub async fn analyze(
        &self,
        submission: &Submission,
        tracker: &ProgressTracker,
    ) -> ApiResult<Outcome<AnalysisResult>> {
        tracker.restart();
        let result = self.submit(submission, Some(tracker)).await;

        match &result {
            Ok(_) => {
                // Backend answered before draining the upload stream
                if tracker.snapshot().stage() == Stage::Uploading {
                    tracker.report(Milestone::Sent);
                }
                tracker.report(Milestone::Received);
            }
            Err(e) => tracker.report(Milestone::Failed(e.to_string())),
        }

        resolve("analyze", self.demo_mode, result, || submission.demo_result())
    }

    async fn submit(
        &self,
        submission: &Submission,
        tracker: Option<&ProgressTracker>,
    ) -> ApiResult<AnalysisResult> {
        let builder = match submission {
            Submission::Text(request) => {
                self.request(Method::POST, self.text_endpoint()).json(request)
            }
            Submission::File(file, options) => {
                let form = options.append_to(Form::new());
                let form = form.part("file", file_part(file, tracker)?);
                self.request(Method::POST, "/analysis/upload").multipart(form)
            }
            Submission::Batch(batch, options) => {
                let (path, form) = batch_form(batch, options, tracker)?;
                self.request(Method::POST, path).multipart(form)
            }
        };

        if let Some(tracker) = tracker {
            tracker.report(Milestone::Prepared);
            if matches!(submission, Submission::Text(_)) {
                // A JSON body goes out with the headers
                tracker.report(Milestone::Sent);
            }
        }

        let envelope: AnalysisEnvelope = self.send(builder).await?;
        Ok(envelope.result)
    }

    // ============================================
    // History
    // ============================================

    /// Past analyses of the current user
    pub async fn history(&self) -> ApiResult<Outcome<Vec<HistoryItem>>> {
        let result = self.get("/history/").await;
        resolve("history", self.demo_mode, result, demo::history)
    }

    pub async fn history_detail(&self, id: &str) -> ApiResult<HistoryDetail> {
        self.get(&format!("/history/{}", urlencoding::encode(id)))
            .await
    }

    /// Delete one analysis. Failures always reach the caller.
    pub async fn delete_history_item(&self, id: &str) -> ApiResult<DeleteResponse> {
        let path = format!("/history/{}", urlencoding::encode(id));
        self.send(self.request(Method::DELETE, &path)).await
    }

    // ============================================
    // Presets
    // ============================================

    pub async fn presets(&self) -> ApiResult<Outcome<Vec<Preset>>> {
        let result = self.get("/presets/").await;
        resolve("presets", self.demo_mode, result, demo::presets)
    }

    pub async fn preset(&self, id: &str) -> ApiResult<Preset> {
        self.get(&format!("/presets/{}", urlencoding::encode(id)))
            .await
    }

    /// Cards shown for every preset
    pub async fn standard_cards(&self) -> ApiResult<Vec<AnalysisCard>> {
        self.get("/presets/standard-cards").await
    }

    // ============================================
    // Assistant
    // ============================================

    /// Replies the user could send next
    pub async fn suggested_responses(
        &self,
        conversation_text: &str,
        context: Option<&str>,
    ) -> ApiResult<Outcome<Vec<SuggestedResponse>>> {
        let result = self
            .post_json::<_, SuggestionsResponse>(
                "/analysis/suggested-responses",
                &SuggestionsRequest {
                    conversation_text,
                    context,
                },
            )
            .await
            .and_then(|response| {
                if response.success {
                    Ok(response.suggestions)
                } else {
                    Err(ApiError::Decode(
                        "suggested responses reported failure".to_string(),
                    ))
                }
            });

        resolve(
            "suggested_responses",
            self.demo_mode,
            result,
            demo::suggested_responses,
        )
    }

    /// One chat turn with the analysis assistant
    pub async fn chat(
        &self,
        message: &str,
        conversation_id: Option<&str>,
    ) -> ApiResult<Outcome<String>> {
        let result = self
            .post_json::<_, ChatReply>(
                "/analysis/chat",
                &ChatRequest {
                    message,
                    conversation_id,
                },
            )
            .await
            .and_then(|reply| {
                if reply.success && !reply.response.is_empty() {
                    Ok(reply.response)
                } else {
                    Err(ApiError::Decode("chat returned no reply".to_string()))
                }
            });

        resolve("chat", self.demo_mode, result, demo::chat_reply)
    }
}

// ============================================
// Multipart bodies
// ============================================

fn batch_form(
    batch: &UploadBatch,
    options: &AnalysisOptions,
    tracker: Option<&ProgressTracker>,
) -> ApiResult<(&'static str, Form)> {
    let files = batch.files();
    let Some(last) = files.len().checked_sub(1) else {
        return Err(UploadError::Empty.into());
    };

    if last == 0 {
        let form = options
            .append_to(Form::new())
            .part("file", file_part(&files[0], tracker)?);
        return Ok(("/analysis/upload", form));
    }

    let mut form = options.append_to(Form::new());
    for index in 0..files.len() {
        form = form.text("file_order", index.to_string());
    }
    for (index, file) in files.iter().enumerate() {
        // Only the final part can tell when the whole body has gone out
        let tracker = if index == last { tracker } else { None };
        form = form.part("files", file_part(file, tracker)?);
    }

    Ok(("/analysis/upload-multiple", form))
}

/// Multipart part for `file`; with a tracker, reports `Sent` once drained
fn file_part(file: &UploadFile, tracker: Option<&ProgressTracker>) -> ApiResult<Part> {
    let part = match tracker {
        None => Part::bytes(file.bytes().to_vec()),
        Some(tracker) => {
            let tracker = tracker.clone();
            let chunks: Vec<Result<Vec<u8>, Infallible>> = file
                .bytes()
                .chunks(UPLOAD_CHUNK_SIZE)
                .map(|c| Ok(c.to_vec()))
                .collect();

            let stream = futures_util::stream::iter(chunks).chain(futures_util::stream::once(
                futures_util::future::lazy(move |_| {
                    tracker.report(Milestone::Sent);
                    Ok(Vec::new())
                }),
            ));

            Part::stream_with_length(Body::wrap_stream(stream), file.len() as u64)
        }
    };

    part.file_name(file.name().to_string())
        .mime_str(file.mime())
        .map_err(ApiError::from_reqwest)
}
