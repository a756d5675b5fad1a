// http server mode - the forum as a json api

use axum::{
    Json, Router,
    extract::{
        FromRequest, FromRequestParts, Path, Query, Request, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::{CommentView, PostView, ThreadView};
use crate::{CrisisDetector, CrisisNotice, Error, NewComment, NewPost, PhraseList, PostFilter, Store, User};

struct AppState {
    store: Store,
    detector: CrisisDetector,
}

type Shared = State<Arc<AppState>>;

#[derive(Deserialize)]
struct CheckRequest {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Serialize)]
struct CheckResponse {
    crisis: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<CrisisNotice>,
}

#[derive(Deserialize)]
struct Credentials {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[derive(Serialize)]
struct HeartResponse {
    id: i64,
    hearts: i64,
}

#[derive(Serialize)]
struct FlagResponse {
    id: i64,
    is_flagged: bool,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            e if e.is_validation() => StatusCode::BAD_REQUEST,
            Error::PostNotFound(_) | Error::ShareCodeNotFound(_) => StatusCode::NOT_FOUND,
            Error::UsernameTaken(_) => StatusCode::CONFLICT,
            Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

// axum's own extractors answer with plain text, these answer with the json error body

struct JsonBody<T>(T);
struct QueryParams<T>(T);
struct PostId(i64);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

impl<S> FromRequestParts<S> for PostId
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state).await?;
        Ok(Self(id))
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::BadRequest(rejection.body_text())
    }
}

pub struct Server;

impl Server {
    pub async fn run(db_path: &str, detector: CrisisDetector, host: &str, port: u16) -> Result<(), Error> {
        let store = Store::connect(db_path).await?;
        let app = Self::router(store, detector).layer(TraceLayer::new_for_http());

        let addr = format!("{host}:{port}");
        tracing::info!("server running at http://{addr}");

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Server(e.to_string()))?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Server(e.to_string()))?;

        Ok(())
    }

    pub fn router(store: Store, detector: CrisisDetector) -> Router {
        let state = Arc::new(AppState { store, detector });

        Router::new()
            .route("/health", get(health))
            .route("/posts", get(list_posts).post(create_post))
            .route("/posts/{id}", get(get_thread).delete(delete_post))
            .route("/posts/{id}/comments", get(list_comments).post(create_comment))
            .route("/posts/{id}/hearts", post(heart))
            .route("/posts/{id}/flag", post(flag))
            .route("/share/{code}", get(by_share_code))
            .route("/check", post(check))
            .route("/phrases", get(phrases))
            .route("/users", post(register))
            .route("/login", post(login))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutting down");
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn list_posts(
    State(state): Shared,
    QueryParams(filter): QueryParams<PostFilter>,
) -> Result<Json<Vec<PostView>>, Error> {
    let posts = state.store.list_posts(&filter).await?;
    Ok(Json(
        posts.into_iter().map(|p| state.detector.view_post(p)).collect(),
    ))
}

// persisted first, checked after: detection never blocks a submission
async fn create_post(
    State(state): Shared,
    JsonBody(new): JsonBody<NewPost>,
) -> Result<(StatusCode, Json<PostView>), Error> {
    let post = state.store.create_post(new).await?;
    let view = state.detector.view_post(post);
    if view.crisis {
        tracing::warn!(post_id = view.post.id, "crisis phrase in new post");
    }
    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_thread(State(state): Shared, PostId(id): PostId) -> Result<Json<ThreadView>, Error> {
    let post = state.store.get_post(id).await?;
    let comments = state.store.list_comments(id).await?;
    Ok(Json(state.detector.view_thread(post, comments)))
}

async fn delete_post(State(state): Shared, PostId(id): PostId) -> Result<StatusCode, Error> {
    state.store.delete_post(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_comments(
    State(state): Shared,
    PostId(id): PostId,
) -> Result<Json<Vec<CommentView>>, Error> {
    // 404 for a missing post rather than an empty list
    state.store.get_post(id).await?;
    let comments = state.store.list_comments(id).await?;
    Ok(Json(
        comments
            .into_iter()
            .map(|c| state.detector.view_comment(c))
            .collect(),
    ))
}

async fn create_comment(
    State(state): Shared,
    PostId(id): PostId,
    JsonBody(mut new): JsonBody<NewComment>,
) -> Result<(StatusCode, Json<CommentView>), Error> {
    new.post_id = id;
    let comment = state.store.create_comment(new).await?;
    let view = state.detector.view_comment(comment);
    if view.crisis {
        tracing::warn!(post_id = id, comment_id = view.comment.id, "crisis phrase in new comment");
    }
    Ok((StatusCode::CREATED, Json(view)))
}

async fn heart(State(state): Shared, PostId(id): PostId) -> Result<Json<HeartResponse>, Error> {
    let hearts = state.store.increment_heart(id).await?;
    Ok(Json(HeartResponse { id, hearts }))
}

async fn flag(State(state): Shared, PostId(id): PostId) -> Result<Json<FlagResponse>, Error> {
    state.store.set_flagged(id).await?;
    Ok(Json(FlagResponse {
        id,
        is_flagged: true,
    }))
}

async fn by_share_code(
    State(state): Shared,
    Path(code): Path<String>,
) -> Result<Json<PostView>, Error> {
    let post = state.store.find_by_share_code(&code).await?;
    Ok(Json(state.detector.view_post(post)))
}

async fn check(State(state): Shared, JsonBody(req): JsonBody<CheckRequest>) -> Json<CheckResponse> {
    let crisis = state.detector.detect_opt(req.text.as_deref());
    Json(CheckResponse {
        crisis,
        notice: CrisisNotice::for_post(crisis),
    })
}

async fn phrases(State(state): Shared) -> Json<PhraseList> {
    Json(PhraseList {
        version: state.detector.version().to_string(),
        phrases: state.detector.phrases().to_vec(),
    })
}

async fn register(
    State(state): Shared,
    JsonBody(creds): JsonBody<Credentials>,
) -> Result<(StatusCode, Json<User>), Error> {
    let user = state.store.register(&creds.username, &creds.password).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn login(State(state): Shared, JsonBody(creds): JsonBody<Credentials>) -> Result<Json<User>, Error> {
    let user = state.store.authenticate(&creds.username, &creds.password).await?;
    Ok(Json(user))
}
