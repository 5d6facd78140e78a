//! # HTTP Transport
//!
//! [`ProductApi`] over the backend's REST surface.
//!
//! ## Endpoints
//! ```text
//! ┌──────────┬────────────────────────────────┬──────────────────────────────┐
//! │ Method   │ Path (under products_path)     │ Body / Response              │
//! ├──────────┼────────────────────────────────┼──────────────────────────────┤
//! │ GET      │ /                              │ → Product[]                  │
//! │ GET      │ /{id}                          │ → Product (404 → NotFound)   │
//! │ POST     │ /                              │ multipart file + fields → ack│
//! │ PATCH    │ /{id}                          │ JSON ProductFields → ack     │
//! │ DELETE   │ /{id}                          │ → empty                      │
//! │ GET      │ /productImage/{id}             │ → raw bytes                  │
//! └──────────┴────────────────────────────────┴──────────────────────────────┘
//! ```
//!
//! No retries happen here; timeouts come from [`ApiSettings`].

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{header, Client, Response, StatusCode};
use storefront_core::{Product, ProductFields, ProductId};
use tracing::debug;
use url::Url;

use crate::api::{ImageData, ImageFile, ProductApi};
use crate::config::ApiSettings;
use crate::error::{SyncError, SyncResult};

/// `reqwest`-backed product API client.
#[derive(Debug, Clone)]
pub struct HttpProductApi {
    http: Client,
    products_url: Url,
}

impl HttpProductApi {
    /// Builds a client with the configured endpoint and timeouts.
    pub fn new(settings: &ApiSettings) -> SyncResult<Self> {
        let products_url = settings.products_url()?;
        if products_url.cannot_be_a_base() {
            return Err(SyncError::InvalidUrl(products_url.to_string()));
        }

        let http = Client::builder()
            .timeout(settings.timeout())
            .connect_timeout(settings.connect_timeout())
            .build()?;

        Ok(HttpProductApi { http, products_url })
    }

    /// The products resource URL every request is built from.
    pub fn products_url(&self) -> &Url {
        &self.products_url
    }

    fn endpoint(&self, segments: &[&str]) -> SyncResult<Url> {
        let mut url = self.products_url.clone();
        url.path_segments_mut()
            .map_err(|_| SyncError::InvalidUrl(self.products_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn item(&self, id: ProductId) -> SyncResult<Url> {
        self.endpoint(&[&id.to_string()])
    }
}

/// Turns a non-2xx response into [`SyncError`]. A 404 becomes `NotFound`
/// when the request addressed a single product.
async fn check_status(response: Response, product_id: Option<ProductId>) -> SyncResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if let (StatusCode::NOT_FOUND, Some(id)) = (status, product_id) {
        return Err(SyncError::NotFound(id));
    }

    let message = response.text().await.unwrap_or_default();
    Err(SyncError::Http {
        status: status.as_u16(),
        message,
    })
}

/// Reads an acknowledgement body: a JSON boolean is honoured, anything else
/// from a 2xx response counts as `true`.
fn parse_ack(body: &[u8]) -> bool {
    serde_json::from_slice::<bool>(body).unwrap_or(true)
}

#[async_trait]
impl ProductApi for HttpProductApi {
    async fn list(&self) -> SyncResult<Vec<Product>> {
        let response = self.http.get(self.products_url.clone()).send().await?;
        let response = check_status(response, None).await?;
        let products: Vec<Product> = response.json().await?;

        debug!(count = products.len(), "Fetched catalog");
        Ok(products)
    }

    async fn get(&self, id: ProductId) -> SyncResult<Product> {
        let response = self.http.get(self.item(id)?).send().await?;
        let response = check_status(response, Some(id)).await?;
        Ok(response.json().await?)
    }

    async fn create(&self, fields: &ProductFields, image: &ImageFile) -> SyncResult<bool> {
        let file = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)?;

        let form = fields
            .form_pairs()
            .into_iter()
            .fold(Form::new().part("file", file), |form, (name, value)| {
                form.text(name, value)
            });

        let response = self
            .http
            .post(self.products_url.clone())
            .multipart(form)
            .send()
            .await?;
        let response = check_status(response, None).await?;
        let body = response.bytes().await?;

        Ok(parse_ack(&body))
    }

    async fn update(&self, id: ProductId, fields: &ProductFields) -> SyncResult<bool> {
        let response = self
            .http
            .patch(self.item(id)?)
            .json(fields)
            .send()
            .await?;
        let response = check_status(response, Some(id)).await?;
        let body = response.bytes().await?;

        Ok(parse_ack(&body))
    }

    async fn delete(&self, id: ProductId) -> SyncResult<()> {
        let response = self.http.delete(self.item(id)?).send().await?;
        check_status(response, Some(id)).await?;
        Ok(())
    }

    async fn image(&self, id: ProductId) -> SyncResult<ImageData> {
        let url = self.endpoint(&["productImage", &id.to_string()])?;
        let response = self.http.get(url).send().await?;
        let response = check_status(response, Some(id)).await?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();

        debug!(product_id = id, size = bytes.len(), "Fetched product image");
        Ok(ImageData {
            content_type,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base_url: &str, products_path: &str) -> HttpProductApi {
        HttpProductApi::new(&ApiSettings {
            base_url: base_url.into(),
            products_path: products_path.into(),
            ..ApiSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoints() {
        let api = api("http://localhost:8080", "/api/products");

        assert_eq!(api.products_url().as_str(), "http://localhost:8080/api/products");
        assert_eq!(
            api.item(42).unwrap().as_str(),
            "http://localhost:8080/api/products/42"
        );
        assert_eq!(
            api.endpoint(&["productImage", "42"]).unwrap().as_str(),
            "http://localhost:8080/api/products/productImage/42"
        );
    }

    #[test]
    fn test_trailing_slash_is_not_doubled() {
        let api = api("http://localhost:8080", "/api/products/");
        assert_eq!(
            api.item(7).unwrap().as_str(),
            "http://localhost:8080/api/products/7"
        );
    }

    #[test]
    fn test_parse_ack() {
        assert!(parse_ack(b"true"));
        assert!(!parse_ack(b"false"));
        assert!(parse_ack(b""));
        assert!(parse_ack(b"{\"id\": 3}"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // Port 9 (discard) on loopback is closed on test machines.
        let api = HttpProductApi::new(&ApiSettings {
            base_url: "http://127.0.0.1:9".into(),
            connect_timeout_secs: 1,
            timeout_secs: 2,
            ..ApiSettings::default()
        })
        .unwrap();

        let err = api.list().await.unwrap_err();
        assert!(err.is_transport(), "unexpected error: {err:?}");
    }
}
