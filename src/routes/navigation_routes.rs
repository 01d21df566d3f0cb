//! Navigation endpoint: any path not claimed by another route.

use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde_json::json;

use crate::navigation::{Decision, Navigation, NavigationOutcome};
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

/// Navigations carrying the same value supersede each other.
pub const SESSION_HEADER: &str = "x-navigation-session";

/// Runs the request path through the middleware chain.
///
/// Proceed answers 200 with the resolved path and identity, Redirect answers 307,
/// Abort answers 503 and a superseded navigation answers 409.
pub async fn navigate(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, HTTPError> {
    if method != Method::GET && method != Method::HEAD {
        return Err(HTTPError::new(
            StatusCode::METHOD_NOT_ALLOWED,
            "Navigations must use GET",
        ));
    }

    let mut navigation = Navigation::new(uri.path());
    if let Some(query) = uri.query() {
        navigation = navigation.with_query(query);
    }
    if let Some(session) = headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
    {
        navigation = navigation.with_session(session);
    }
    let full_path = navigation.full_path();

    match state.navigator.navigate(navigation).await {
        NavigationOutcome::Completed(Decision::Proceed) => {
            let identity = state.auth.identity();
            Ok(Json(json!({ "path": full_path, "identity": identity })).into_response())
        }
        NavigationOutcome::Completed(Decision::Redirect(location)) => {
            Ok(Redirect::temporary(&location).into_response())
        }
        NavigationOutcome::Completed(Decision::Abort(reason)) => {
            Err(HTTPError::new(StatusCode::SERVICE_UNAVAILABLE, reason))
        }
        NavigationOutcome::Superseded => Err(HTTPError::new(
            StatusCode::CONFLICT,
            "Navigation superseded by a newer one",
        )),
    }
}
