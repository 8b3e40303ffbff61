//! Thin wrapper over the `/api/books` endpoints.

use std::time::Duration;

use async_trait::async_trait;
use bookstore_app::{Book, BookInput};
use bookstore_http::Envelope;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{ClientError, Result};

/// Where the API listens when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// The five catalog operations as seen from a front end.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_books(&self) -> Result<Vec<Book>>;

    async fn get_book(&self, id: &str) -> Result<Book>;

    async fn create_book(&self, input: &BookInput) -> Result<Book>;

    async fn update_book(&self, id: &str, changes: &BookInput) -> Result<Book>;

    async fn delete_book(&self, id: &str) -> Result<Book>;
}

/// [`CatalogApi`] over HTTP.
pub struct HttpCatalogClient {
    http: Client,
    base_url: Url,
}

impl HttpCatalogClient {
    /// Create a client for the API rooted at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
            return Err(ClientError::InvalidUrl(format!(
                "'{base_url}' must start with http:// or https://"
            )));
        }
        let base_url =
            Url::parse(trimmed).map_err(|err| ClientError::InvalidUrl(format!("{base_url}: {err}")))?;

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("bookstore-client/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ClientError::Transport {
                message: "Failed to initialize HTTP client",
                source: Some(source),
            })?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/api/books[/{id}]`, with the id percent-encoded as one segment.
    fn books_url(&self, id: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().extend(["api", "books"]);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    /// Send the request and unwrap the envelope. A failure envelope becomes
    /// [`ClientError::Api`] with its message; anything unreadable becomes
    /// [`ClientError::Transport`] with `generic`.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        generic: &'static str,
    ) -> Result<T> {
        let transport = |source| ClientError::Transport {
            message: generic,
            source: Some(source),
        };

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport)?;

        let envelope: Envelope<T> = match serde_json::from_slice(&body) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(status = status.as_u16(), error = %err, "unreadable response envelope");
                return Err(ClientError::Transport {
                    message: generic,
                    source: None,
                });
            }
        };

        envelope.into_result().map_err(|message| ClientError::Api {
            status: status.as_u16(),
            message: message.unwrap_or_else(|| "Something went wrong".to_string()),
        })
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
    async fn list_books(&self) -> Result<Vec<Book>> {
        let url = self.books_url(None)?;
        debug!(url = %url, "fetching books");
        self.send(self.http.get(url), "Failed to fetch books").await
    }

    async fn get_book(&self, id: &str) -> Result<Book> {
        let url = self.books_url(Some(id))?;
        debug!(url = %url, "fetching book");
        self.send(self.http.get(url), "Failed to fetch book").await
    }

    async fn create_book(&self, input: &BookInput) -> Result<Book> {
        let url = self.books_url(None)?;
        debug!(url = %url, "creating book");
        self.send(self.http.post(url).json(input), "Failed to create book")
            .await
    }

    async fn update_book(&self, id: &str, changes: &BookInput) -> Result<Book> {
        let url = self.books_url(Some(id))?;
        debug!(url = %url, "updating book");
        self.send(self.http.put(url).json(changes), "Failed to update book")
            .await
    }

    async fn delete_book(&self, id: &str) -> Result<Book> {
        let url = self.books_url(Some(id))?;
        debug!(url = %url, "deleting book");
        self.send(self.http.delete(url), "Failed to delete book").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_urls() {
        assert!(matches!(
            HttpCatalogClient::new("ftp://books.example.com"),
            Err(ClientError::InvalidUrl(_))
        ));
        assert!(HttpCatalogClient::new("").is_err());
    }

    #[test]
    fn builds_book_urls() {
        let client = HttpCatalogClient::new("http://localhost:5000/").unwrap();
        assert_eq!(
            client.books_url(None).unwrap().as_str(),
            "http://localhost:5000/api/books"
        );
        assert_eq!(
            client.books_url(Some("abc")).unwrap().as_str(),
            "http://localhost:5000/api/books/abc"
        );
        assert_eq!(
            client.books_url(Some("a/b")).unwrap().as_str(),
            "http://localhost:5000/api/books/a%2Fb"
        );
    }

    #[test]
    fn keeps_base_path_prefix() {
        let client = HttpCatalogClient::new("https://example.com/store").unwrap();
        assert_eq!(
            client.books_url(None).unwrap().as_str(),
            "https://example.com/store/api/books"
        );
    }
}
