use std::str::FromStr;

use bson::oid::ObjectId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct ObjectIdString(#[serde(with = "object_id_string")] pub ObjectId);

impl From<ObjectId> for ObjectIdString {
    fn from(value: ObjectId) -> Self {
        Self(value)
    }
}

impl std::ops::Deref for ObjectIdString {
    type Target = ObjectId;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::cmp::PartialEq for ObjectIdString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl std::cmp::Eq for ObjectIdString {}

impl From<ObjectIdString> for bson::Bson {
    fn from(value: ObjectIdString) -> Self {
        value.0.into()
    }
}

mod object_id_string {
    use bson::oid::ObjectId;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(id: &ObjectId, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&id.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<ObjectId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FormattedDateTime(#[serde(with = "time::serde::rfc3339")] pub OffsetDateTime);

impl From<bson::DateTime> for FormattedDateTime {
    fn from(value: bson::DateTime) -> Self {
        Self(value.into())
    }
}

impl From<OffsetDateTime> for FormattedDateTime {
    fn from(value: OffsetDateTime) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalString(pub Decimal);

impl From<Decimal> for DecimalString {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<DecimalString> for Decimal {
    fn from(value: DecimalString) -> Self {
        value.0
    }
}

impl Serialize for DecimalString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for DecimalString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        pub struct Visitor;

        impl<'de> serde::de::Visitor<'de> for Visitor {
            type Value = DecimalString;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a string of decimal or integer")
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(Decimal::from(v).into())
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(Decimal::from(v).into())
            }

            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Decimal::try_from(v)
                    .map(Into::into)
                    .map_err(serde::de::Error::custom)
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Decimal::from_str(v)
                    .map(Into::into)
                    .map_err(serde::de::Error::custom)
            }

            fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                self.visit_str(&v)
            }
        }

        deserializer.deserialize_any(Visitor)
    }
}

/// Write acknowledgments mirroring the driver result shapes the clients
/// already consume.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct InsertOneResponse {
    pub acknowledged: bool,
    pub inserted_id: bson::Bson,
}

impl From<mongodb::results::InsertOneResult> for InsertOneResponse {
    fn from(value: mongodb::results::InsertOneResult) -> Self {
        Self {
            acknowledged: true,
            inserted_id: value.inserted_id,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct InsertManyResponse {
    pub acknowledged: bool,
    pub inserted_count: usize,
    pub inserted_ids: std::collections::HashMap<usize, bson::Bson>,
}

impl From<mongodb::results::InsertManyResult> for InsertManyResponse {
    fn from(value: mongodb::results::InsertManyResult) -> Self {
        Self {
            acknowledged: true,
            inserted_count: value.inserted_ids.len(),
            inserted_ids: value.inserted_ids,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UpdateResponse {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upserted_id: Option<bson::Bson>,
}

impl From<mongodb::results::UpdateResult> for UpdateResponse {
    fn from(value: mongodb::results::UpdateResult) -> Self {
        Self {
            acknowledged: true,
            matched_count: value.matched_count,
            modified_count: value.modified_count,
            upserted_id: value.upserted_id,
        }
    }
}
