//! Authentication middleware that validates the auth cookie pair on API
//! requests.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use time::OffsetDateTime;

use crate::{
    Error,
    auth::cookie::{COOKIE_EXPIRY, COOKIE_USER_ID, extract_date_time, extract_user_id},
    state::AuthState,
    user::get_user_by_id,
};

/// Middleware function that checks for a valid authorization cookie.
/// The user ID is placed into the request and then the request executed
/// normally if the cookie is valid, otherwise a 401 JSON error is returned.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(user_id): Extension<UserID>` to receive the user ID.
///
/// **Note**: The app state must contain an `axum_extra::extract::cookie::Key`
/// for decrypting and verifying the cookie contents.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Error getting cookie jar: {error:?}");
            return Error::InvalidCredentials.into_response();
        }
    };

    let user_id = match validate_cookies(&jar, &state) {
        Ok(user_id) => user_id,
        Err(error) => return error.into_response(),
    };

    parts.extensions.insert(user_id);
    let request = Request::from_parts(parts, body);

    next.run(request).await
}

/// Check that the cookie pair is present, unexpired, and refers to a
/// registered user.
fn validate_cookies(
    jar: &PrivateCookieJar,
    state: &AuthState,
) -> Result<crate::user::UserID, Error> {
    let user_id_cookie = jar.get(COOKIE_USER_ID).ok_or(Error::CookieMissing)?;
    let expiry_cookie = jar.get(COOKIE_EXPIRY).ok_or(Error::CookieMissing)?;

    let expiry = extract_date_time(&expiry_cookie).map_err(|_| Error::InvalidCredentials)?;

    if expiry < OffsetDateTime::now_utc() {
        return Err(Error::TokenExpired);
    }

    let user_id = extract_user_id(&user_id_cookie).map_err(|_| Error::InvalidCredentials)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    match get_user_by_id(user_id, &connection) {
        Ok(user) => Ok(user.id),
        Err(Error::NotFound) => Err(Error::InvalidCredentials),
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod auth_guard_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Json, Router,
        extract::State,
        middleware,
        routing::{get, post},
    };
    use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};
    use time::{Duration, OffsetDateTime};

    use crate::{
        auth::{
            COOKIE_USER_ID, auth_guard,
            cookie::{COOKIE_EXPIRY, DATE_TIME_FORMAT, set_auth_cookie},
        },
        db::initialize,
        state::{AuthState, create_cookie_key},
        user::{UserID, create_user},
    };

    const TEST_LOG_IN_ROUTE: &str = "/log_in";
    const TEST_PROTECTED_ROUTE: &str = "/protected";

    async fn test_handler(Extension(user_id): Extension<UserID>) -> Json<Value> {
        Json(json!({"userId": user_id.as_i64()}))
    }

    async fn stub_log_in_route(
        State(_state): State<AuthState>,
        jar: PrivateCookieJar,
    ) -> PrivateCookieJar {
        set_auth_cookie(jar, UserID::new(1), Duration::minutes(5)).unwrap()
    }

    /// Builds the cookie pair with an expiry value in the past, but without
    /// the matching `Expires` attribute so the client still sends the pair
    /// back.
    async fn stub_expired_log_in_route(
        State(_state): State<AuthState>,
        jar: PrivateCookieJar,
    ) -> PrivateCookieJar {
        let expiry = OffsetDateTime::now_utc() - Duration::minutes(5);
        let expiry_string = expiry.format(DATE_TIME_FORMAT).unwrap();

        jar.add(Cookie::new(COOKIE_USER_ID, UserID::new(1).to_string()))
            .add(Cookie::new(COOKIE_EXPIRY, expiry_string))
    }

    fn get_test_server(with_user: bool) -> TestServer {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        if with_user {
            create_user("test@test.com", &connection).unwrap();
        }

        let state = AuthState {
            cookie_key: create_cookie_key("nafstenoas"),
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let app = Router::new()
            .route(TEST_PROTECTED_ROUTE, get(test_handler))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard))
            .route(TEST_LOG_IN_ROUTE, post(stub_log_in_route))
            .route("/log_in_expired", post(stub_expired_log_in_route))
            .with_state(state);

        TestServer::new(app)
    }

    #[tokio::test]
    async fn valid_cookie_reaches_handler_with_user_id() {
        let server = get_test_server(true);
        let response = server.post(TEST_LOG_IN_ROUTE).await;
        let cookies = response.cookies();

        let response = server.get(TEST_PROTECTED_ROUTE).add_cookies(cookies).await;

        response.assert_status_ok();
        response.assert_json(&json!({"userId": 1}));
    }

    #[tokio::test]
    async fn missing_cookie_returns_unauthorized() {
        let server = get_test_server(true);

        let response = server.get(TEST_PROTECTED_ROUTE).await;

        response.assert_status_unauthorized();
        response.assert_json(&json!({"error": "Access token required"}));
    }

    #[tokio::test]
    async fn garbage_cookie_returns_unauthorized() {
        let server = get_test_server(true);

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(Cookie::build((COOKIE_USER_ID, "FOOBAR")).build())
            .await;

        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn expired_cookie_returns_unauthorized() {
        let server = get_test_server(true);
        let response = server.post("/log_in_expired").await;
        let cookies = response.cookies();

        let response = server.get(TEST_PROTECTED_ROUTE).add_cookies(cookies).await;

        response.assert_status_unauthorized();
        response.assert_json(&json!({"error": "Token expired"}));
    }

    #[tokio::test]
    async fn cookie_for_unregistered_user_returns_unauthorized() {
        let server = get_test_server(false);
        let response = server.post(TEST_LOG_IN_ROUTE).await;
        let cookies = response.cookies();

        let response = server.get(TEST_PROTECTED_ROUTE).add_cookies(cookies).await;

        response.assert_status_unauthorized();
        response.assert_json(&json!({"error": "Invalid token"}));
    }
}
