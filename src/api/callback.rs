use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use tokio::sync::Mutex;

use crate::{types::AuthCallback, warning};

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<Mutex<AuthCallback>>>,
) -> Html<&'static str> {
    let mut state = shared_state.lock().await;

    if state.outcome.is_some() {
        return Html("<h4>Authorization already handled.</h4>");
    }

    if params.get("state") != Some(&state.expected_state) {
        warning!("Authorization callback carried an unexpected state parameter.");
        state.outcome = Some(Err("state mismatch".to_string()));
        return Html("<h4>Login failed.</h4>");
    }

    if let Some(error) = params.get("error") {
        state.outcome = Some(Err(error.clone()));
        return Html("<h4>Login failed.</h4>");
    }

    match params.get("code") {
        Some(code) => {
            state.outcome = Some(Ok(code.clone()));
            Html("<h2>Authentication successful.</h2><p>Close browser window.</p>")
        }
        None => {
            state.outcome = Some(Err("missing authorization code".to_string()));
            Html("<h4>Missing authorization code.</h4>")
        }
    }
}
