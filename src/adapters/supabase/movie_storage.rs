//! Supabase PostgREST adapter for the movie collection.
//!
//! One round trip per operation against `/rest/v1/movies`. Row scoping is
//! left to the table's row-level security; the adapter only stamps
//! `user_id` on insert and refuses to insert without a signed-in user.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::client::{error_message, SupabaseClient};
use super::rows::{into_movies, InsertRow, MovieRow};
use crate::domain::foundation::MovieId;
use crate::domain::movie::{Movie, MovieUpdate, NewMovie};
use crate::ports::{MovieStorage, StorageError};

const TABLE: &str = "movies";

/// Movie storage backed by a Supabase table.
#[derive(Debug, Clone)]
pub struct SupabaseMovieStorage {
    client: Arc<SupabaseClient>,
}

impl SupabaseMovieStorage {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }

    fn table(&self, method: Method) -> RequestBuilder {
        self.client.request(method, self.client.rest_url(TABLE))
    }

    fn by_id(&self, method: Method, id: &MovieId) -> RequestBuilder {
        self.table(method).query(&[("id", format!("eq.{}", id))])
    }

    async fn send(
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Response, StorageError> {
        let response = request.send().await.map_err(|e| {
            tracing::error!(operation, error = %e, "Movie table request failed");
            StorageError::backend(operation, e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        tracing::error!(operation, %status, %message, "Movie table rejected request");
        Err(StorageError::backend(operation, message))
    }

    async fn rows<T: DeserializeOwned>(response: Response) -> Result<T, StorageError> {
        response
            .json()
            .await
            .map_err(|e| StorageError::Deserialization(e.to_string()))
    }
}

#[async_trait]
impl MovieStorage for SupabaseMovieStorage {
    async fn get_all(&self) -> Result<Vec<Movie>, StorageError> {
        let request = self
            .table(Method::GET)
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        let response = Self::send("fetch movies", request).await?;

        let movies = into_movies(Self::rows(response).await?)?;
        tracing::debug!(count = movies.len(), "Fetched movies from Supabase");
        Ok(movies)
    }

    async fn add(&self, movie: &NewMovie) -> Result<Movie, StorageError> {
        let user = self
            .client
            .fetch_user()
            .await
            .map_err(|e| StorageError::backend("add movie", e.to_string()))?
            .ok_or_else(|| StorageError::Unauthorized("add movies".to_string()))?;

        let request = self
            .table(Method::POST)
            .header("Prefer", "return=representation")
            .json(&InsertRow::new(movie, &user.id));
        let response = Self::send("add movie", request).await?;

        let rows: Vec<MovieRow> = Self::rows(response).await?;
        let stored = rows
            .into_iter()
            .next()
            .ok_or_else(|| StorageError::backend("add movie", "no row returned"))?
            .into_movie()?;

        tracing::debug!(movie_id = %stored.id, user_id = %user.id, "Inserted movie");
        Ok(stored)
    }

    async fn update(&self, id: &MovieId, update: &MovieUpdate) -> Result<Movie, StorageError> {
        let request = self
            .by_id(Method::PATCH, id)
            .header("Prefer", "return=representation")
            .json(update);
        let response = Self::send("update movie", request).await?;

        let rows: Vec<MovieRow> = Self::rows(response).await?;
        let updated = rows
            .into_iter()
            .next()
            .ok_or_else(|| StorageError::NotFound(id.clone()))?
            .into_movie()?;

        tracing::debug!(movie_id = %id, "Updated movie");
        Ok(updated)
    }

    async fn delete(&self, id: &MovieId) -> Result<(), StorageError> {
        Self::send("delete movie", self.by_id(Method::DELETE, id)).await?;
        tracing::debug!(movie_id = %id, "Deleted movie");
        Ok(())
    }
}
