//! Request identity: bearer token middleware and extractors.
//!
//! The middleware runs on every route. Requests without credentials pass
//! through anonymously; requests that present a bearer token must present a
//! valid one or they are rejected before any handler runs. Handlers opt in to
//! authentication through the [`Identity`] extractor, or accept anonymous
//! callers with [`MaybeIdentity`].

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::{AppState, errors::Error, types::UserId};

/// The authenticated caller, resolved from a verified bearer token.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
}

/// Verify the bearer token, if any, and attach an [`Identity`] extension.
///
/// A request with no `Authorization` header, or one that is not a bearer
/// scheme, proceeds anonymously. A bearer token that fails verification
/// short-circuits with 401 even on routes that allow anonymous access.
pub async fn authenticate(State(state): State<AppState>, mut request: Request, next: Next) -> Result<Response, Error> {
    let header = match request.headers().get(AUTHORIZATION) {
        Some(header) => header,
        None => return Ok(next.run(request).await),
    };

    let token = match header.to_str().ok().and_then(|value| value.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => return Ok(next.run(request).await),
    };

    let claims = state.token_codec.verify(token)?;
    debug!(user_id = claims.sub, "Authenticated request");

    request.extensions_mut().insert(Identity {
        user_id: claims.sub,
        email: claims.email,
    });

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or(Error::Unauthenticated)
    }
}

/// Extractor for routes that serve both anonymous and authenticated callers.
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<Identity>);

impl<S> FromRequestParts<S> for MaybeIdentity
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeIdentity(parts.extensions.get::<Identity>().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;

    fn parts_with_identity() -> Parts {
        let mut request = HttpRequest::new(());
        request.extensions_mut().insert(Identity {
            user_id: 42,
            email: "user@example.com".to_string(),
        });
        request.into_parts().0
    }

    fn parts_anonymous() -> Parts {
        HttpRequest::new(()).into_parts().0
    }

    #[tokio::test]
    async fn test_identity_extractor_requires_authentication() {
        let mut parts = parts_with_identity();
        let identity = Identity::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(identity.user_id, 42);
        assert_eq!(identity.email, "user@example.com");

        let mut parts = parts_anonymous();
        let err = Identity::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(err, Error::Unauthenticated));
    }

    #[tokio::test]
    async fn test_maybe_identity_never_rejects() {
        let mut parts = parts_with_identity();
        let MaybeIdentity(identity) = MaybeIdentity::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(identity.unwrap().user_id, 42);

        let mut parts = parts_anonymous();
        let MaybeIdentity(identity) = MaybeIdentity::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(identity.is_none());
    }
}
