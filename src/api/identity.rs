use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::error::{Error, UnauthorizedType};

const JWK_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Identity attached to a request by [`attach_identity`]. `None` when the
/// request carried no bearer token or the token did not verify.
#[derive(Clone, Debug)]
pub struct AuthIdentity(pub Option<String>);

impl AuthIdentity {
    pub fn email(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub email: String,
}

#[axum::async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, Error>;
}

#[derive(Clone)]
pub struct Verifier(pub Arc<dyn IdentityVerifier>);

impl std::ops::Deref for Verifier {
    type Target = dyn IdentityVerifier;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

/// Verifies Firebase ID tokens against the securetoken JWK set.
pub struct FirebaseVerifier {
    project_id: String,
    http: reqwest::Client,
    keys: RwLock<HashMap<String, Jwk>>,
}

#[derive(Deserialize, Debug, Clone)]
struct Jwk {
    kid: String,
    n: String,
    e: String,
}

#[derive(Deserialize, Debug)]
struct JwkSet {
    keys: Vec<Jwk>,
}

#[derive(Deserialize, Debug)]
struct IdTokenClaims {
    email: Option<String>,
}

impl FirebaseVerifier {
    pub fn new(project_id: String, http: reqwest::Client) -> Self {
        Self {
            project_id,
            http,
            keys: RwLock::new(HashMap::new()),
        }
    }

    async fn signing_key(&self, kid: &str) -> Result<DecodingKey, Error> {
        if let Some(jwk) = self.keys.read().await.get(kid) {
            return DecodingKey::from_rsa_components(&jwk.n, &jwk.e).map_err(Into::into);
        }

        // Unknown kid: the provider rotates keys, refetch the set once.
        self.refresh_keys().await?;

        let keys = self.keys.read().await;
        let jwk = keys
            .get(kid)
            .ok_or(Error::Unauthorized(UnauthorizedType::InvalidIdToken))?;

        DecodingKey::from_rsa_components(&jwk.n, &jwk.e).map_err(Into::into)
    }

    async fn refresh_keys(&self) -> Result<(), Error> {
        let set: JwkSet = self
            .http
            .get(JWK_URL)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut keys = self.keys.write().await;
        keys.clear();
        for key in set.keys {
            keys.insert(key.kid.clone(), key);
        }

        Ok(())
    }
}

#[axum::async_trait]
impl IdentityVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, Error> {
        let header = jsonwebtoken::decode_header(token)?;
        let kid = header
            .kid
            .ok_or(Error::Unauthorized(UnauthorizedType::InvalidIdToken))?;

        let key = self.signing_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[format!(
            "https://securetoken.google.com/{}",
            self.project_id
        )]);

        let token = jsonwebtoken::decode::<IdTokenClaims>(token, &key, &validation)?;

        let email = token
            .claims
            .email
            .ok_or(Error::Unauthorized(UnauthorizedType::InvalidIdToken))?;

        Ok(VerifiedIdentity { email })
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Runs before every route. Attaches the verified identity (or `None`) to the
/// request and always lets it through; handlers decide whether a missing
/// identity is an error.
pub async fn attach_identity<B>(
    State(verifier): State<Verifier>,
    mut request: Request<B>,
    next: Next<B>,
) -> Response {
    let identity = match bearer_token(request.headers()) {
        Some(token) => match verifier.verify(token).await {
            Ok(identity) => Some(identity.email),
            Err(error) => {
                tracing::warn!("id token verification failed: {}", error);
                None
            }
        },
        None => None,
    };

    request.extensions_mut().insert(AuthIdentity(identity));
    next.run(request).await
}
