use std::sync::Arc;

use axum::extract::FromRef;

use crate::api::{
    identity::{FirebaseVerifier, Verifier},
    menu::MenuCollection,
    order::OrderCollection,
    payment::PaymentGateway,
    user::UserCollection,
};
use crate::config::Config;

#[derive(FromRef, Clone)]
pub struct AppState {
    pub mongo_client: mongodb::Client,
    pub user_collection: UserCollection,
    pub menu_collection: MenuCollection,
    pub order_collection: OrderCollection,

    pub verifier: Verifier,
    pub payment_gateway: PaymentGateway,
}

impl AppState {
    pub async fn new(
        mongo_uri: &str,
        database_name: &str,
        verifier: Verifier,
        payment_gateway: PaymentGateway,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mongo_client_opt = mongodb::options::ClientOptions::parse(mongo_uri).await?;
        let mongo_client = mongodb::Client::with_options(mongo_client_opt)?;

        let db = mongo_client.database(database_name);
        Ok(Self {
            mongo_client,
            user_collection: UserCollection(db.collection("users").into()),
            menu_collection: MenuCollection(db.collection("menu").into()),
            order_collection: OrderCollection(db.collection("orders").into()),

            verifier,
            payment_gateway,
        })
    }

    pub async fn new_from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::from_env();
        Self::new_with_config(&config).await
    }

    pub async fn new_with_config(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        let http = reqwest::Client::new();

        let verifier = Verifier(Arc::new(FirebaseVerifier::new(
            config.firebase_project_id.clone(),
            http.clone(),
        )));
        let payment_gateway = PaymentGateway::new(config.stripe_secret_key.clone(), http);

        Self::new(
            &config.mongodb_uri(),
            &config.db_name,
            verifier,
            payment_gateway,
        )
        .await
    }
}
