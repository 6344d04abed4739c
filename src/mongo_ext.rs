use std::ops::{Deref, DerefMut};

use serde::de::DeserializeOwned;

use crate::error::Error;

pub struct Collection<T>(pub mongodb::Collection<T>);

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Collection<T> {
    type Target = mongodb::Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for Collection<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> From<mongodb::Collection<T>> for Collection<T> {
    fn from(value: mongodb::Collection<T>) -> Self {
        Self(value)
    }
}

impl<T> Collection<T>
where
    T: DeserializeOwned + Send + Sync + Unpin,
{
    pub async fn find_to_vec(&self, filter: bson::Document) -> Result<Vec<T>, Error> {
        self.find_to_vec_with_options(filter, None).await
    }

    pub async fn find_to_vec_with_options(
        &self,
        filter: bson::Document,
        options: impl Into<Option<mongodb::options::FindOptions>>,
    ) -> Result<Vec<T>, Error> {
        let mut cursor = self.find(filter, options).await?;

        let mut documents = vec![];

        while cursor.advance().await? {
            documents.push(cursor.deserialize_current()?);
        }

        Ok(documents)
    }

    pub async fn find_page(
        &self,
        filter: bson::Document,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<T>, Error> {
        let options = mongodb::options::FindOptions::builder()
            .skip(skip)
            .limit(limit)
            .build();

        self.find_to_vec_with_options(filter, options).await
    }

    pub async fn count_all(&self) -> Result<u64, Error> {
        self.count_documents(bson::doc! {}, None)
            .await
            .map_err(Into::into)
    }
}
