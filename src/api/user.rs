use axum::{
    extract::{Path, State},
    Extension, Json,
};
use bson::Document;
use serde::{Deserialize, Serialize};
use tap::TapFallible;

use crate::{
    error::{Error, UnauthorizedType},
    mongo_ext::Collection,
    util::{InsertOneResponse, UpdateResponse},
};

use super::identity::AuthIdentity;

#[derive(Clone)]
pub struct UserCollection(pub Collection<Document>);

impl std::ops::Deref for UserCollection {
    type Target = Collection<Document>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Users are stored as-is: the client supplies arbitrary profile fields and
/// `email` is the identifying key.
pub async fn create(
    State(users): State<UserCollection>,
    Json(user): Json<Document>,
) -> Result<Json<InsertOneResponse>, Error> {
    let result = users.insert_one(user, None).await?;

    Ok(Json(result.into()))
}

pub async fn index(State(users): State<UserCollection>) -> Result<Json<Vec<Document>>, Error> {
    let users = users.find_to_vec(bson::doc! {}).await?;

    Ok(Json(users))
}

/// Replace-or-insert keyed by `email`. `$set` keeps fields the body does not
/// mention, so repeated upserts never duplicate a user.
pub async fn upsert(
    State(users): State<UserCollection>,
    Json(user): Json<Document>,
) -> Result<Json<UpdateResponse>, Error> {
    let email = user
        .get_str("email")
        .map_err(|_| Error::MissingField("email"))?
        .to_string();

    let options = mongodb::options::UpdateOptions::builder()
        .upsert(true)
        .build();

    let result = users
        .update_one(
            bson::doc! { "email": email },
            bson::doc! { "$set": user },
            options,
        )
        .await?;

    Ok(Json(result.into()))
}

pub async fn is_admin(users: &UserCollection, email: &str) -> Result<bool, Error> {
    let user = users.find_one(bson::doc! { "email": email }, None).await?;

    Ok(user
        .map(|user| user.get_str("role") == Ok("admin"))
        .unwrap_or(false))
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MakeAdminRequest {
    pub email: String,
}

#[tracing::instrument(
    skip_all,
    fields(
        email = %request.email,
    )
)]
pub async fn make_admin(
    State(users): State<UserCollection>,
    Extension(identity): Extension<AuthIdentity>,
    Json(request): Json<MakeAdminRequest>,
) -> Result<Json<UpdateResponse>, Error> {
    let requester = identity
        .email()
        .ok_or(Error::Unauthorized(UnauthorizedType::MissingIdentity))
        .tap_err(|_| tracing::debug!("tried promoting without identity"))?;

    if !is_admin(&users, requester).await? {
        return Err(Error::Forbidden)
            .tap_err(|_| tracing::debug!("tried promoting as non admin"));
    }

    let result = users
        .update_one(
            bson::doc! { "email": &request.email },
            bson::doc! { "$set": { "role": "admin" } },
            None,
        )
        .await?;

    Ok(Json(result.into()))
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AdminStatusResponse {
    pub admin: bool,
}

pub async fn admin_status(
    State(users): State<UserCollection>,
    Path(email): Path<String>,
) -> Result<Json<AdminStatusResponse>, Error> {
    let admin = is_admin(&users, &email).await?;

    Ok(Json(AdminStatusResponse { admin }))
}
