use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, patch, post},
    Extension, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{JwtError, TokenIssuer};
use crate::config::AppConfig;
use crate::database::models::{Magazine, Post, TaxonomyKind, TeaRating};
use crate::database::Stores;
use crate::error::ApiError;
use crate::handlers;
use crate::middleware::{jwt_auth_middleware, require_admin, require_editor, require_member};
use crate::services::{AuthService, ContentService, JobPostingService, TaxonomyService};
use crate::types::Page;

/// Shared handler state; cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub stores: Stores,
    pub auth: AuthService,
    pub posts: ContentService<Post>,
    pub magazines: ContentService<Magazine>,
    pub tea_ratings: ContentService<TeaRating>,
    pub job_postings: JobPostingService,
    pub taxonomy: TaxonomyService,
}

impl AppState {
    pub fn new(config: AppConfig, stores: Stores) -> Result<Self, JwtError> {
        let tokens = TokenIssuer::new(&config.security.jwt_secret, config.security.jwt_expiry_hours)?;

        Ok(Self {
            auth: AuthService::new(stores.clone(), tokens),
            posts: ContentService::new(stores.posts.clone()),
            magazines: ContentService::new(stores.magazines.clone()),
            tea_ratings: ContentService::new(stores.tea_ratings.clone()),
            job_postings: JobPostingService::new(stores.job_postings.clone(), stores.taxonomy.clone()),
            taxonomy: TaxonomyService::new(stores.taxonomy.clone()),
            config: Arc::new(config),
            stores,
        })
    }

    /// State backed by in-memory stores, for tests and local demos
    pub fn in_memory(config: AppConfig) -> Result<Self, JwtError> {
        Self::new(config, Stores::in_memory())
    }

    /// Pagination window from query values, using the configured defaults
    pub fn page(&self, page: Option<u32>, limit: Option<u32>) -> Result<Page, ApiError> {
        Page::new(
            page,
            limit,
            self.config.api.default_page_size,
            self.config.api.max_page_size,
        )
        .map_err(ApiError::bad_request)
    }
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .merge(system_routes())
        .merge(auth_routes(&state))
        .nest("/posts", post_routes(&state))
        .nest("/magazines", magazine_routes(&state))
        .nest("/tea-ratings", tea_rating_routes(&state))
        .nest("/job-postings", job_posting_routes(&state))
        .nest("/locations", taxonomy_routes(&state, TaxonomyKind::Location))
        .nest("/employment-types", taxonomy_routes(&state, TaxonomyKind::EmploymentType))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    if config.is_development() || origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

fn system_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::system::root))
        .route("/health", get(handlers::system::health))
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    use handlers::auth;

    let public = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login));

    let profile = Router::new().route("/auth/profile", get(auth::profile));

    let members = Router::new()
        .route("/auth/account", delete(auth::delete_account))
        .route_layer(from_fn(require_member));

    let admin = Router::new()
        .route("/auth/users", get(auth::list_users))
        .route("/auth/users/:id/upgrade-role", patch(auth::upgrade_role))
        .route("/auth/users/:id/downgrade-role", patch(auth::downgrade_role))
        .route_layer(from_fn(require_admin));

    let protected = profile
        .merge(members)
        .merge(admin)
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    public.merge(protected)
}

fn post_routes(state: &AppState) -> Router<AppState> {
    use handlers::posts;

    let public = Router::new()
        .route("/", get(posts::list))
        .route("/:id", get(posts::get));

    let protected = Router::new()
        .route("/", post(posts::create))
        .route("/:id", patch(posts::update).delete(posts::remove))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    public.merge(protected)
}

fn magazine_routes(state: &AppState) -> Router<AppState> {
    use handlers::magazines;

    let public = Router::new()
        .route("/", get(magazines::list))
        .route("/:id", get(magazines::get));

    let editors = Router::new()
        .route("/", post(magazines::create))
        .route("/:id", patch(magazines::update).delete(magazines::remove))
        .route_layer(from_fn(require_editor))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    public.merge(editors)
}

fn tea_rating_routes(state: &AppState) -> Router<AppState> {
    use handlers::tea_ratings;

    let public = Router::new()
        .route("/", get(tea_ratings::list))
        .route("/:id", get(tea_ratings::get));

    let editors = Router::new()
        .route("/", post(tea_ratings::create))
        .route("/:id", patch(tea_ratings::update).delete(tea_ratings::remove))
        .route_layer(from_fn(require_editor))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    let admin = Router::new()
        .route("/:id/admin", delete(tea_ratings::remove_as_admin))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    public.merge(editors).merge(admin)
}

fn job_posting_routes(state: &AppState) -> Router<AppState> {
    use handlers::job_postings;

    let public = Router::new()
        .route("/", get(job_postings::list))
        .route("/:id", get(job_postings::get));

    let editors = Router::new()
        .route("/", post(job_postings::create))
        .route_layer(from_fn(require_editor))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    let authors = Router::new()
        .route("/:id", patch(job_postings::update).delete(job_postings::remove))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    public.merge(editors).merge(authors)
}

fn taxonomy_routes(state: &AppState, kind: TaxonomyKind) -> Router<AppState> {
    use handlers::taxonomy;

    let public = Router::new().route("/", get(taxonomy::list));

    let admin = Router::new()
        .route("/", post(taxonomy::create))
        .route("/:id", delete(taxonomy::remove))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    public.merge(admin).layer(Extension(kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        router(AppState::in_memory(AppConfig::for_tests()).unwrap())
    }

    fn request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap()
    }

    #[tokio::test]
    async fn reads_are_public() {
        for uri in ["/", "/health", "/posts", "/magazines", "/job-postings", "/tea-ratings", "/locations"] {
            let res = app().oneshot(request("GET", uri)).await.unwrap();
            assert_eq!(res.status(), StatusCode::OK, "{}", uri);
        }
    }

    #[tokio::test]
    async fn writes_require_a_token() {
        for (method, uri) in [
            ("POST", "/posts"),
            ("PATCH", "/magazines/1"),
            ("DELETE", "/tea-ratings/1/admin"),
            ("POST", "/job-postings"),
            ("DELETE", "/employment-types/1"),
            ("GET", "/auth/users"),
        ] {
            let res = app().oneshot(request(method, uri)).await.unwrap();
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        }
    }

    #[tokio::test]
    async fn malformed_path_and_query_use_the_error_body() {
        for uri in ["/posts/abc", "/posts?page=-1", "/job-postings?location_id=north"] {
            let res = app().oneshot(request("GET", uri)).await.unwrap();
            assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{}", uri);

            let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
            let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body["error"], true, "{}", uri);
            assert_eq!(body["code"], "BAD_REQUEST", "{}", uri);
            assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()), "{}", uri);
        }
    }

    #[test]
    fn empty_secret_is_rejected() {
        let mut config = AppConfig::for_tests();
        config.security.jwt_secret.clear();
        assert!(AppState::in_memory(config).is_err());
    }

    #[test]
    fn page_uses_configured_defaults() {
        let state = AppState::in_memory(AppConfig::for_tests()).unwrap();
        let page = state.page(None, Some(10_000)).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, state.config.api.max_page_size);
        assert!(state.page(Some(0), None).is_err());
    }
}
