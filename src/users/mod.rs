mod dto;
pub mod handlers;
pub mod services;

pub use dto::HobbyInput;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes())
}

#[cfg(test)]
mod tests {
    use axum::http::{header, Method, StatusCode};
    use serde_json::json;

    use crate::app::testing::send;
    use crate::state::AppState;

    fn new_user(username: &str) -> serde_json::Value {
        json!({
            "username": username,
            "fullName": "Budi Hartono",
            "email": format!("{username}@example.com"),
            "password": "Password123!",
            "hobbies": [{"name": "Chess", "level": "Expert"}]
        })
    }

    #[tokio::test]
    async fn listing_requires_a_session() {
        let state = AppState::fake();
        let res = send(&state, Method::GET, "/api/users", None, None).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
        assert_eq!(res.body["status"], "error");
    }

    #[tokio::test]
    async fn list_returns_envelope_with_meta() {
        let state = AppState::fake();
        let me = state.seed_user("joko", false).await;
        state.seed_user("asep", false).await;
        let cookie = state.session_cookie(&me);

        let res = send(&state, Method::GET, "/api/users?page=1&size=1", Some(&cookie), None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["status"], "success");
        assert_eq!(res.body["meta"]["total"], 2);
        assert_eq!(res.body["meta"]["totalPages"], 2);
        assert_eq!(res.body["data"].as_array().unwrap().len(), 1);
        assert_eq!(res.body["data"][0]["roles"][0], "User");
    }

    #[tokio::test]
    async fn page_far_past_the_end_is_empty() {
        let state = AppState::fake();
        let me = state.seed_user("joko", false).await;
        let cookie = state.session_cookie(&me);

        let uri = format!("/api/users?page={}&size=100", i64::MAX);
        let res = send(&state, Method::GET, &uri, Some(&cookie), None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["data"], json!([]));
        assert_eq!(res.body["meta"]["total"], 1);
    }

    #[tokio::test]
    async fn only_admins_create_users() {
        let state = AppState::fake();
        let user = state.seed_user("joko", false).await;
        let admin = state.seed_user("root", true).await;

        let res = send(
            &state,
            Method::POST,
            "/api/users",
            Some(&state.session_cookie(&user)),
            Some(new_user("budi")),
        )
        .await;
        assert_eq!(res.status, StatusCode::FORBIDDEN);

        let res = send(
            &state,
            Method::POST,
            "/api/users",
            Some(&state.session_cookie(&admin)),
            Some(new_user("budi")),
        )
        .await;
        assert_eq!(res.status, StatusCode::CREATED);
        let id = res.body["data"].as_i64().unwrap();
        assert_eq!(
            res.headers.get(header::LOCATION).unwrap(),
            &format!("/api/users/{id}")
        );

        let assigned = state.store.find_assignment(id, 2).await.unwrap().unwrap();
        assert_eq!(assigned.assigned_by, Some(admin.user_id));

        let res = send(
            &state,
            Method::POST,
            "/api/users",
            Some(&state.session_cookie(&admin)),
            Some(new_user("budi")),
        )
        .await;
        assert_eq!(res.status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn invalid_payload_lists_field_errors() {
        let state = AppState::fake();
        let admin = state.seed_user("root", true).await;
        let mut body = new_user("x");
        body["email"] = json!("not-an-email");
        let res = send(
            &state,
            Method::POST,
            "/api/users",
            Some(&state.session_cookie(&admin)),
            Some(body),
        )
        .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert!(res.body["errors"]["username"].is_string());
        assert!(res.body["errors"]["email"].is_string());
    }

    #[tokio::test]
    async fn names_too_short_once_trimmed_are_rejected() {
        let state = AppState::fake();
        let admin = state.seed_user("root", true).await;
        let mut body = new_user("budi");
        body["fullName"] = json!(" B ");
        body["hobbies"] = json!([{"name": " x ", "level": "Beginner"}]);
        let res = send(
            &state,
            Method::POST,
            "/api/users",
            Some(&state.session_cookie(&admin)),
            Some(body),
        )
        .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert!(res.body["errors"]["fullName"].is_string());
        assert!(res.body["errors"]["hobbies[0].name"].is_string());
        assert!(state.store.find_user_by_username("budi").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn owners_update_themselves_but_not_others() {
        let state = AppState::fake();
        let joko = state.seed_user("joko", false).await;
        let asep = state.seed_user("asep", false).await;
        let cookie = state.session_cookie(&joko);
        let body = json!({
            "username": "joko",
            "fullName": "Joko Santoso",
            "email": "joko@example.com",
            "hobbies": [{"name": "Hiking", "level": "Beginner"}]
        });

        let uri = format!("/api/users/{}", asep.user_id);
        let res = send(&state, Method::PUT, &uri, Some(&cookie), Some(body.clone())).await;
        assert_eq!(res.status, StatusCode::FORBIDDEN);

        let uri = format!("/api/users/{}", joko.user_id);
        let res = send(&state, Method::PUT, &uri, Some(&cookie), Some(body)).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["data"], true);

        let res = send(&state, Method::GET, &uri, Some(&cookie), None).await;
        assert_eq!(res.body["data"]["fullName"], "Joko Santoso");
        assert_eq!(res.body["data"]["hobbies"][0]["name"], "Hiking");
    }

    #[tokio::test]
    async fn admin_delete_removes_user() {
        let state = AppState::fake();
        let admin = state.seed_user("root", true).await;
        let joko = state.seed_user("joko", false).await;
        let uri = format!("/api/users/{}", joko.user_id);

        let res = send(&state, Method::DELETE, &uri, Some(&state.session_cookie(&joko)), None).await;
        assert_eq!(res.status, StatusCode::FORBIDDEN);

        let cookie = state.session_cookie(&admin);
        let res = send(&state, Method::DELETE, &uri, Some(&cookie), None).await;
        assert_eq!(res.status, StatusCode::OK);

        let res = send(&state, Method::GET, &uri, Some(&cookie), None).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        let res = send(&state, Method::DELETE, &uri, Some(&cookie), None).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
    }
}
