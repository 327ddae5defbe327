use axum::{
    extract::State,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::handlers::{ads, auth, comments, likes, messages, posts, tags, users};
use crate::middleware::auth::require_auth;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::ws;

/// Assembles the full router: public routes, guarded routes (auth
/// middleware re-resolving the caller per request), the realtime channel,
/// and the global layers.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/ws", get(ws::ws_upgrade))
        .merge(auth_routes())
        .merge(user_routes(&state))
        .merge(post_routes(&state))
        .merge(comment_routes(&state))
        .merge(like_routes(&state))
        .merge(tag_routes(&state))
        .merge(ad_routes(&state))
        .merge(message_routes(&state))
        .layer(state.config.cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        // The original user-creation endpoint is the registration flow.
        .route("/api/users", post(auth::register))
}

fn user_routes(state: &AppState) -> Router<AppState> {
    let guarded = Router::new()
        .route(
            "/api/users/:id",
            put(users::update_user).delete(users::delete_user),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/api/users", get(users::get_all_users))
        .route("/api/users/:id", get(users::get_single_user))
        .merge(guarded)
}

fn post_routes(state: &AppState) -> Router<AppState> {
    let guarded = Router::new()
        .route("/api/posts/add", post(posts::add_post))
        .route(
            "/api/posts/:id",
            put(posts::update_post).delete(posts::delete_post),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/api/posts/all", get(posts::get_all_posts))
        .route("/api/posts/search", get(posts::search_posts))
        .route("/api/posts/filter", get(posts::filter_posts))
        .route("/api/posts/user/:userId", get(posts::get_user_posts))
        .route("/api/posts/:id", get(posts::get_single_post))
        .merge(guarded)
}

fn comment_routes(state: &AppState) -> Router<AppState> {
    let guarded = Router::new()
        .route("/api/comments", post(comments::add_comment))
        .route(
            "/api/comments/:id",
            put(comments::update_comment).delete(comments::delete_comment),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route(
            "/api/comments/all/:postId",
            get(comments::get_all_comments_for_post),
        )
        .route("/api/comments/:id", get(comments::get_single_comment))
        .merge(guarded)
}

fn like_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/likes/addRemove/:postId", post(likes::add_remove_like))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

fn tag_routes(state: &AppState) -> Router<AppState> {
    let guarded = Router::new()
        .route("/api/tags", post(tags::add_tag))
        .route(
            "/api/tags/:id",
            put(tags::update_tag).delete(tags::delete_tag),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/api/tags", get(tags::get_all_tags))
        .merge(guarded)
}

fn ad_routes(state: &AppState) -> Router<AppState> {
    let guarded = Router::new()
        .route("/api/ads", post(ads::add_ad))
        .route("/api/ads/paymentInit", post(ads::payment_init))
        .route("/api/ads/:id", delete(ads::delete_ad))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/api/ads", get(ads::get_all_ads))
        .merge(guarded)
}

fn message_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/messages", get(messages::get_all_messages))
        .route(
            "/api/messages/private/:userId",
            get(messages::get_private_messages),
        )
        .route(
            "/api/messages/addMessage/:userId",
            post(messages::add_message),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

/// Serves the app on an already-bound listener. The binary binds the
/// configured port; the integration tests bind port 0.
pub async fn serve(
    listener: tokio::net::TcpListener,
    state: AppState,
) -> std::io::Result<()> {
    axum::serve(listener, app(state)).await
}

/// GET / — environment banner.
async fn root(State(state): State<AppState>) -> String {
    format!(
        "Welcome to the {} environment of {}",
        state.config.environment_name(),
        state.config.app_name()
    )
}

/// GET /health — pings the store.
async fn health(State(state): State<AppState>) -> Result<ApiResponse, ApiError> {
    state.store.ping().await?;
    Ok(ApiResponse::ok().data(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "database": "ok",
    })))
}
