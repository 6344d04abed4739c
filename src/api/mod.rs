pub mod identity;
pub mod menu;
pub mod order;
pub mod payment;
pub mod user;

#[cfg(test)]
pub mod tests {
    use std::{collections::HashMap, sync::Arc};

    use axum::{extract::State, Extension};
    use bson::oid::ObjectId;

    use crate::{
        app::AppState,
        error::{Error, UnauthorizedType},
    };

    use super::{
        identity::{AuthIdentity, IdentityVerifier, VerifiedIdentity, Verifier},
        menu::{menu_item_from_parts, MenuCollection},
        order::OrderCollection,
        payment::PaymentGateway,
        user::UserCollection,
    };

    /// Verifier resolving a fixed token -> email map, standing in for the
    /// external identity provider.
    #[derive(Default)]
    pub struct StaticVerifier(pub HashMap<String, String>);

    impl StaticVerifier {
        pub fn with_token(mut self, token: &str, email: &str) -> Self {
            self.0.insert(token.to_string(), email.to_string());
            self
        }
    }

    #[axum::async_trait]
    impl IdentityVerifier for StaticVerifier {
        async fn verify(&self, token: &str) -> Result<VerifiedIdentity, Error> {
            self.0
                .get(token)
                .map(|email| VerifiedIdentity {
                    email: email.clone(),
                })
                .ok_or(Error::Unauthorized(UnauthorizedType::InvalidIdToken))
        }
    }

    pub struct Bootstrap {
        pub app_state: AppState,
    }

    impl Bootstrap {
        pub fn user_collection(&self) -> State<UserCollection> {
            State(self.app_state.user_collection.clone())
        }

        pub fn menu_collection(&self) -> State<MenuCollection> {
            State(self.app_state.menu_collection.clone())
        }

        pub fn order_collection(&self) -> State<OrderCollection> {
            State(self.app_state.order_collection.clone())
        }

        pub fn identity(&self, email: &str) -> Extension<AuthIdentity> {
            Extension(AuthIdentity(Some(email.to_string())))
        }

        pub fn no_identity(&self) -> Extension<AuthIdentity> {
            Extension(AuthIdentity(None))
        }

        pub async fn seed_menu(&self, count: usize) {
            for i in 0..count {
                let item = menu_item_from_parts(
                    format!("item-{}", i),
                    "9.99",
                    "fast food".to_string(),
                    "4.5",
                    "10",
                    vec![0xff, 0xd8],
                )
                .unwrap();

                self.app_state
                    .menu_collection
                    .insert_one(&item, None)
                    .await
                    .unwrap();
            }
        }
    }

    pub async fn bootstrap() -> Bootstrap {
        dotenvy::dotenv().ok();
        let mongodb_uri = std::env::var("MONGODB_URI")
            .expect("Cannot retreive MONGODB_URI from environment variable.");

        let database_name = format!("foody-test-{}", ObjectId::new());

        let verifier = Verifier(Arc::new(
            StaticVerifier::default().with_token("token-a", "a@x.com"),
        ));
        let payment_gateway = PaymentGateway::with_api_base(
            "sk_test_dummy".to_string(),
            reqwest::Client::new(),
            "http://localhost:12111".to_string(),
        );

        let app_state = AppState::new(&mongodb_uri, &database_name, verifier, payment_gateway)
            .await
            .unwrap();

        Bootstrap { app_state }
    }

    mod middleware {
        use std::sync::Arc;

        use axum::{
            body::Body,
            http::{Request, StatusCode},
            middleware::from_fn_with_state,
            routing, Extension, Router,
        };
        use tower::ServiceExt;

        use crate::api::identity::{attach_identity, AuthIdentity, Verifier};

        use super::StaticVerifier;

        fn app() -> Router {
            let verifier = Verifier(Arc::new(
                StaticVerifier::default().with_token("good", "a@x.com"),
            ));

            Router::new()
                .route(
                    "/",
                    routing::get(|Extension(identity): Extension<AuthIdentity>| async move {
                        identity.0.unwrap_or_else(|| "anonymous".to_string())
                    }),
                )
                .layer(from_fn_with_state(verifier, attach_identity))
        }

        async fn body_string(request: Request<Body>) -> (StatusCode, String) {
            let response = app().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
            (status, String::from_utf8(bytes.to_vec()).unwrap())
        }

        #[tokio::test]
        async fn test_no_token_passes_through() {
            let request = Request::get("/").body(Body::empty()).unwrap();
            let (status, body) = body_string(request).await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, "anonymous");
        }

        #[tokio::test]
        async fn test_valid_token_attaches_email() {
            let request = Request::get("/")
                .header("Authorization", "Bearer good")
                .body(Body::empty())
                .unwrap();
            let (status, body) = body_string(request).await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, "a@x.com");
        }

        #[tokio::test]
        async fn test_invalid_token_fails_open() {
            let request = Request::get("/")
                .header("Authorization", "Bearer bad")
                .body(Body::empty())
                .unwrap();
            let (status, body) = body_string(request).await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, "anonymous");
        }
    }
}
