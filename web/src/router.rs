use crate::{middleware::auth::require_auth, params, sse::handler::sse_handler, AppState};
use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::controller::{
    checklist_controller, health_check_controller, todo_controller, user_controller,
    user_session_controller,
};

use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Todo Notify API"
        ),
        paths(
            checklist_controller::create,
            checklist_controller::update,
            checklist_controller::update_status,
            checklist_controller::delete,
            health_check_controller::health_check,
            todo_controller::create,
            todo_controller::index,
            todo_controller::read,
            todo_controller::update,
            todo_controller::delete,
            todo_controller::pin,
            todo_controller::unpin,
            user_controller::register,
            user_controller::profile,
            user_controller::forgot_password,
            user_controller::reset_password,
            user_session_controller::login,
            user_session_controller::logout,
        ),
        components(
            schemas(
                domain::checklist_items::Model,
                domain::todos::Model,
                domain::users::Model,
                domain::todo_type::TodoType,
                domain::SortOrder,
                domain::jwt::Jwt,
                params::checklist::ItemParams,
                params::checklist::StatusParams,
                params::todo::CreateParams,
                params::todo::UpdateParams,
                params::user::ForgotPasswordParams,
                params::user::LoginParams,
                params::user::RegisterParams,
                params::user::ResetPasswordParams,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "todo_notify", description = "To-do lists with live notifications")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Defines the bearer token requirement for gaining access to our
// API endpoints for OpenAPI.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(user_session_routes(app_state.clone()))
        .merge(user_session_protected_routes(app_state.clone()))
        .merge(user_routes(app_state.clone()))
        .merge(todo_routes(app_state.clone()))
        .merge(checklist_routes(app_state.clone()))
        .merge(sse_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn user_session_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/auth/register", post(user_controller::register))
        .route("/auth/login", post(user_session_controller::login))
        .route("/auth/password/forgot", post(user_controller::forgot_password))
        .route("/auth/password/reset", post(user_controller::reset_password))
        .with_state(app_state)
}

fn user_session_protected_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/auth/logout", post(user_session_controller::logout))
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn user_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/me", get(user_controller::profile))
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn todo_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/todos", post(todo_controller::create))
        .route("/todos", get(todo_controller::index))
        .route("/todos/{id}", get(todo_controller::read))
        .route("/todos/{id}", patch(todo_controller::update))
        .route("/todos/{id}", delete(todo_controller::delete))
        .route("/todos/{id}/pin", patch(todo_controller::pin))
        .route("/todos/{id}/unpin", patch(todo_controller::unpin))
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn checklist_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/todos/{id}/checklist",
            post(checklist_controller::create),
        )
        .route(
            "/todos/{id}/checklist/{item_id}",
            put(checklist_controller::update),
        )
        .route(
            "/todos/{id}/checklist/{item_id}",
            patch(checklist_controller::update_status),
        )
        .route(
            "/todos/{id}/checklist/{item_id}",
            delete(checklist_controller::delete),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn sse_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/sse", get(sse_handler))
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}
