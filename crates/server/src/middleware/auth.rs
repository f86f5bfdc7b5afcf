use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use deployment::Deployment;

use crate::{DeploymentImpl, error::ApiError};

/// Verify the bearer token and attach the caller's
/// [`Session`](services::services::auth::Session) to the request.
/// Handlers read it back with `Extension<Session>`.
pub async fn require_session(
    State(deployment): State<DeploymentImpl>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let session = deployment.auth().verify_bearer(header)?;

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}
