pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
    Router,
};

use crate::admin::AdminSite;
use crate::state::AppState;
use crate::{
    applies, auth, catalog, comments, companies, follows, mail, recruitments, resumes, users,
};

pub fn build_router(state: AppState, admin: &AdminSite) -> Router {
    let body_limit = state.config.max_upload_bytes;

    let api = Router::new()
        // Auth
        .route(
            "/auth/token",
            post(auth::handlers::handle_issue_token).delete(auth::handlers::handle_revoke_token),
        )
        // Users
        .route("/users", post(users::handlers::handle_register))
        .route(
            "/users/current-user",
            get(users::handlers::handle_current_user)
                .patch(users::handlers::handle_update_current_user),
        )
        .route("/users/:id", patch(users::handlers::handle_update_user))
        // Catalog
        .route("/categories", get(catalog::handlers::handle_list_categories))
        .route("/work-types", get(catalog::handlers::handle_list_work_types))
        // Companies
        .route(
            "/companies",
            get(companies::handlers::handle_list_companies)
                .post(companies::handlers::handle_create_company),
        )
        .route("/companies/owner", get(companies::handlers::handle_owner_company))
        .route("/companies/:id", get(companies::handlers::handle_get_company))
        // Recruitments
        .route(
            "/recruitments",
            get(recruitments::handlers::handle_list_recruitments)
                .post(recruitments::handlers::handle_create_recruitment),
        )
        .route(
            "/recruitments/:id",
            get(recruitments::handlers::handle_get_recruitment)
                .patch(recruitments::handlers::handle_update_recruitment)
                .put(recruitments::handlers::handle_update_recruitment)
                .delete(recruitments::handlers::handle_delete_recruitment),
        )
        .route(
            "/recruitments/:id/change",
            patch(recruitments::handlers::handle_change_active),
        )
        .route(
            "/recruitments/:id/applied",
            get(recruitments::handlers::handle_applied),
        )
        // Resumes
        .route(
            "/resumes",
            get(resumes::handlers::handle_list_resumes).post(resumes::handlers::handle_create_resume),
        )
        .route("/resumes/owner", get(resumes::handlers::handle_owner_resumes))
        .route(
            "/resumes/:id",
            patch(resumes::handlers::handle_update_resume)
                .put(resumes::handlers::handle_update_resume)
                .delete(resumes::handlers::handle_delete_resume),
        )
        // Applies
        .route(
            "/applies",
            get(applies::handlers::handle_list_applies).post(applies::handlers::handle_create_apply),
        )
        .route("/applies/mine", get(applies::handlers::handle_my_applies))
        .route(
            "/applies/candidate/:recruitment_id",
            get(applies::handlers::handle_list_candidates),
        )
        .route(
            "/applies/employee/:company_id",
            get(applies::handlers::handle_list_employees),
        )
        .route(
            "/applies/:id/change",
            patch(applies::handlers::handle_change_status),
        )
        // Follows
        .route(
            "/follows",
            get(follows::handlers::handle_list_follows).post(follows::handlers::handle_create_follow),
        )
        .route(
            "/follows/companies",
            get(follows::handlers::handle_followed_companies),
        )
        .route("/follows/:id", delete(follows::handlers::handle_delete_follow))
        // Comments
        .route(
            "/user-comments",
            get(comments::handlers::handle_list_user_comments)
                .post(comments::handlers::handle_create_user_comment),
        )
        .route(
            "/user-comments/:id",
            patch(comments::handlers::handle_update_user_comment)
                .put(comments::handlers::handle_update_user_comment),
        )
        .route(
            "/company-comments",
            get(comments::handlers::handle_list_company_comments)
                .post(comments::handlers::handle_create_company_comment),
        )
        .route(
            "/company-comments/:id",
            patch(comments::handlers::handle_update_company_comment)
                .put(comments::handlers::handle_update_company_comment),
        )
        // Mail
        .route("/send-mail", post(mail::handlers::handle_send_mail));

    Router::new()
        .route("/health", get(health::health_handler))
        .nest("/api/v1", api)
        .merge(admin.router())
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::state::testing::{test_state, RecordingMailer};

    fn app() -> Router {
        build_router(
            test_state(Arc::new(RecordingMailer::default())),
            &AdminSite::default(),
        )
    }

    async fn send(method: Method, uri: &str) -> StatusCode {
        app()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "jobboard-api");
    }

    #[tokio::test]
    async fn test_protected_routes_need_a_token() {
        for (method, uri) in [
            (Method::GET, "/api/v1/applies"),
            (Method::GET, "/api/v1/applies/mine"),
            (Method::GET, "/api/v1/follows/companies"),
            (Method::GET, "/api/v1/resumes/owner"),
            (Method::GET, "/api/v1/companies/owner"),
            (Method::GET, "/api/v1/users/current-user"),
            (Method::GET, "/api/v1/user-comments"),
            (Method::POST, "/api/v1/send-mail"),
            (Method::DELETE, "/api/v1/auth/token"),
        ] {
            assert_eq!(send(method, uri).await, StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_malformed_id_is_rejected_before_lookup() {
        assert_eq!(
            send(Method::GET, "/api/v1/recruitments/not-a-uuid").await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_bad_id_filter_is_a_json_field_error() {
        for (uri, field) in [
            ("/api/v1/resumes?user_id=abc", "user_id"),
            ("/api/v1/recruitments?category_id=42", "category_id"),
        ] {
            let response = app()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");

            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body: Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body["error"]["field"], field, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_unknown_route_and_method() {
        assert_eq!(send(Method::GET, "/api/v1/nope").await, StatusCode::NOT_FOUND);
        assert_eq!(
            send(Method::GET, "/api/v1/send-mail").await,
            StatusCode::METHOD_NOT_ALLOWED
        );
    }
}
