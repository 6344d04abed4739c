use axum::{
    extract::{Query, State},
    Extension, Json,
};
use bson::Document;
use serde::{Deserialize, Serialize};
use tap::TapFallible;

use crate::{
    error::{Error, UnauthorizedType},
    mongo_ext::Collection,
    util::InsertManyResponse,
};

use super::identity::AuthIdentity;

#[derive(Clone)]
pub struct OrderCollection(pub Collection<Document>);

impl std::ops::Deref for OrderCollection {
    type Target = Collection<Document>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Bulk insert, ordered: the engine stops at the first failing document
/// instead of continuing past it.
pub async fn create(
    State(orders): State<OrderCollection>,
    Json(documents): Json<Vec<Document>>,
) -> Result<Json<InsertManyResponse>, Error> {
    let options = mongodb::options::InsertManyOptions::builder()
        .ordered(true)
        .build();

    let result = orders.insert_many(documents, options).await?;

    tracing::debug!("inserted {} orders", result.inserted_ids.len());
    Ok(Json(result.into()))
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OrderQuery {
    pub email: String,
}

pub async fn index(
    State(orders): State<OrderCollection>,
    Extension(identity): Extension<AuthIdentity>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<Vec<Document>>, Error> {
    if identity.email() != Some(query.email.as_str()) {
        return Err(Error::Unauthorized(UnauthorizedType::OwnerMismatch))
            .tap_err(|_| tracing::debug!("tried listing orders of another user"));
    }

    let orders = orders.find_to_vec(bson::doc! { "email": query.email }).await?;

    Ok(Json(orders))
}
