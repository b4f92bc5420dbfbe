use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, MethodRouter},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

mod error;
mod extract;
mod health;
mod todos;

use health::health;

use crate::routes::error::ErrorBody;
use crate::state::AppState;

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

pub fn routes() -> Router<AppState> {
    let todo_router = Router::new()
        .route(
            "/",
            get(todos::routes::list)
                .post(todos::routes::create)
                .options(preflight),
        )
        .route(
            "/{id}",
            get(todos::routes::get)
                .put(todos::routes::update)
                .delete(todos::routes::delete)
                .options(preflight),
        );

    // `/todos/` has an empty id segment: it lists like `/todos`, but
    // addressing a single todo through it is a missing id.
    let trailing_slash = || -> MethodRouter<AppState> {
        get(todos::routes::list)
            .post(todos::routes::create)
            .put(todos::routes::missing_id)
            .delete(todos::routes::missing_id)
            .options(preflight)
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health).options(preflight))
        .nest("/todos", todo_router.clone())
        .nest("/api/todos", todo_router)
        .route("/todos/", trailing_slash())
        .route("/api/todos/", trailing_slash())
        .fallback(fallback)
        .layer(cors)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ))
        .layer(TraceLayer::new_for_http())
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn fallback(method: Method) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }

    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "Not found".to_string(),
        }),
    )
        .into_response()
}
