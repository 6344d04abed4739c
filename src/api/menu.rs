use base64::{engine::general_purpose, Engine as _};
use bson::oid::ObjectId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use axum::{
    extract::{Multipart, Query, State},
    Json,
};

use crate::{
    error::Error,
    mongo_ext::Collection,
    util::{DecimalString, FormattedDateTime, InsertOneResponse, ObjectIdString},
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MenuItemModel {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub name: String,
    pub price: Decimal,
    pub category: String,
    pub star: f64,
    pub reviews: i64,

    pub img: bson::Binary,

    pub created_at: bson::DateTime,
}

#[derive(Clone)]
pub struct MenuCollection(pub Collection<MenuItemModel>);

impl std::ops::Deref for MenuCollection {
    type Target = Collection<MenuItemModel>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MenuItem {
    pub id: ObjectIdString,

    pub name: String,
    pub price: DecimalString,
    pub category: String,
    pub star: f64,
    pub reviews: i64,

    /// Image payload, base64 encoded for the JSON surface.
    pub img: String,

    pub created_at: FormattedDateTime,
}

impl From<MenuItemModel> for MenuItem {
    fn from(item: MenuItemModel) -> Self {
        Self {
            id: item.id.into(),
            name: item.name,
            price: item.price.into(),
            category: item.category,
            star: item.star,
            reviews: item.reviews,

            img: general_purpose::STANDARD.encode(&item.img.bytes),

            created_at: item.created_at.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MenuQuery {
    pub page: Option<u64>,
    pub size: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MenuResponse {
    /// Total item count, global regardless of the requested window.
    pub count: u64,
    pub menu: Vec<MenuItem>,
}

pub async fn index(
    State(menu): State<MenuCollection>,
    Query(query): Query<MenuQuery>,
) -> Result<Json<MenuResponse>, Error> {
    let count = menu.count_all().await?;

    // Zero-indexed pages: page 0 is the first window.
    let items = match (query.page, query.size) {
        (Some(page), Some(size)) => {
            menu.find_page(bson::doc! {}, page * size, size as i64)
                .await?
        }
        _ => menu.find_to_vec(bson::doc! {}).await?,
    };

    Ok(Json(MenuResponse {
        count,
        menu: items.into_iter().map(Into::into).collect(),
    }))
}

pub fn menu_item_from_parts(
    name: String,
    price: &str,
    category: String,
    star: &str,
    reviews: &str,
    img: Vec<u8>,
) -> Result<MenuItemModel, Error> {
    Ok(MenuItemModel {
        id: ObjectId::new(),
        name,
        price: price.parse().map_err(|_| Error::InvalidField("price"))?,
        category,
        star: star.parse().map_err(|_| Error::InvalidField("star"))?,
        reviews: reviews.parse().map_err(|_| Error::InvalidField("reviews"))?,
        img: bson::Binary {
            subtype: bson::spec::BinarySubtype::Generic,
            bytes: img,
        },
        created_at: OffsetDateTime::now_utc().into(),
    })
}

pub async fn create(
    State(menu): State<MenuCollection>,
    mut multipart: Multipart,
) -> Result<Json<InsertOneResponse>, Error> {
    let mut name = None;
    let mut price = None;
    let mut category = None;
    let mut star = None;
    let mut reviews = None;
    let mut img = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("name") => name = Some(field.text().await?),
            Some("price") => price = Some(field.text().await?),
            Some("category") => category = Some(field.text().await?),
            Some("star") => star = Some(field.text().await?),
            Some("reviews") => reviews = Some(field.text().await?),
            Some("img") => img = Some(field.bytes().await?.to_vec()),
            _ => {}
        }
    }

    let model = menu_item_from_parts(
        name.ok_or(Error::MissingField("name"))?,
        &price.ok_or(Error::MissingField("price"))?,
        category.ok_or(Error::MissingField("category"))?,
        &star.ok_or(Error::MissingField("star"))?,
        &reviews.ok_or(Error::MissingField("reviews"))?,
        img.ok_or(Error::MissingField("img"))?,
    )?;

    tracing::debug!("creating menu item {}", model.name);
    let result = menu.insert_one(&model, None).await?;

    Ok(Json(result.into()))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use axum::{extract::Query, Json};
    use rust_decimal::Decimal;

    use crate::{api::tests::bootstrap, error::Error};

    use super::{menu_item_from_parts, MenuQuery};

    #[test]
    fn test_menu_item_from_parts() {
        let item = menu_item_from_parts(
            "Burger".to_string(),
            "9.99",
            "fast food".to_string(),
            "4.5",
            "120",
            vec![1, 2, 3],
        )
        .unwrap();

        assert_eq!(item.price, Decimal::new(999, 2));
        assert_eq!(item.star, 4.5);
        assert_eq!(item.reviews, 120);
        assert_eq!(item.img.bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_menu_item_from_parts_invalid() {
        let error = menu_item_from_parts(
            "Burger".to_string(),
            "cheap",
            "fast food".to_string(),
            "4.5",
            "120",
            vec![],
        )
        .unwrap_err();
        assert_matches!(error, Error::InvalidField("price"));

        let error = menu_item_from_parts(
            "Burger".to_string(),
            "9.99",
            "fast food".to_string(),
            "many",
            "120",
            vec![],
        )
        .unwrap_err();
        assert_matches!(error, Error::InvalidField("star"));
    }

    #[tokio::test]
    async fn test_index_without_page() {
        let bootstrap = bootstrap().await;
        bootstrap.seed_menu(5).await;

        let Json(response) = super::index(
            bootstrap.menu_collection(),
            Query(MenuQuery {
                page: None,
                size: None,
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.count, 5);
        assert_eq!(response.menu.len(), 5);
    }

    #[tokio::test]
    async fn test_index_with_page() {
        let bootstrap = bootstrap().await;
        bootstrap.seed_menu(5).await;

        let Json(response) = super::index(
            bootstrap.menu_collection(),
            Query(MenuQuery {
                page: Some(1),
                size: Some(2),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.count, 5);
        assert_eq!(
            response
                .menu
                .iter()
                .map(|item| item.name.as_str())
                .collect::<Vec<_>>(),
            vec!["item-2", "item-3"]
        );
    }

    #[tokio::test]
    async fn test_index_last_page_is_short() {
        let bootstrap = bootstrap().await;
        bootstrap.seed_menu(5).await;

        let Json(response) = super::index(
            bootstrap.menu_collection(),
            Query(MenuQuery {
                page: Some(2),
                size: Some(2),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.count, 5);
        assert_eq!(response.menu.len(), 1);
        assert_eq!(response.menu[0].name, "item-4");
    }
}
