//! HTTP client for the storefront's backend API.
//!
//! Every endpoint answers with a `{ "success": bool, ... }` envelope; a
//! `false` success flag is treated like a transport failure so the fallback
//! layer can take over.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use partsdesk_core::config::RemoteConfig;
use partsdesk_core::domain::product::{NewProduct, Product, ProductId};
use partsdesk_core::domain::sale::Sale;

use super::{ProductRepository, RepositoryError, SaleRepository};

pub struct RemoteApiClient {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
}

#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    products: Option<Vec<Product>>,
    #[serde(default)]
    product: Option<Product>,
    #[serde(default)]
    sales: Option<Vec<Sale>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Serialize)]
struct QuantityUpdate {
    id: ProductId,
    quantity: u32,
}

#[derive(Serialize)]
struct FullUpdate<'a> {
    #[serde(flatten)]
    product: &'a Product,
    #[serde(rename = "fullUpdate")]
    full_update: bool,
}

#[derive(Serialize)]
struct DeleteRequest {
    id: ProductId,
}

impl RemoteApiClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        api_key: Option<SecretString>,
    ) -> Result<Self, RepositoryError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url, api_key })
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self, RepositoryError> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
            config.api_key.clone(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn products_url(&self) -> String {
        format!("{}/products.json", self.base_url)
    }

    fn sales_url(&self) -> String {
        format!("{}/sales.php", self.base_url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Envelope, RepositoryError> {
        let request = match &self.api_key {
            Some(key) => request.bearer_auth(key.expose_secret()),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RepositoryError::Remote(format!("server returned {status}")));
        }

        let envelope: Envelope = response.json().await?;
        if !envelope.success {
            return Err(RepositoryError::Remote(
                envelope.error.unwrap_or_else(|| "request was not successful".to_string()),
            ));
        }

        Ok(envelope)
    }
}

#[async_trait::async_trait]
impl ProductRepository for RemoteApiClient {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let envelope = self.send(self.client.get(self.products_url())).await?;
        debug!(base_url = %self.base_url, "fetched products from remote store");
        Ok(envelope.products.unwrap_or_default())
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.list_products().await?;
        Ok(products.into_iter().find(|product| product.id == id))
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let envelope = self.send(self.client.post(self.products_url()).json(&product)).await?;
        envelope.product.ok_or_else(|| {
            RepositoryError::Remote("response did not include the created product".to_string())
        })
    }

    async fn update_quantity(&self, id: ProductId, quantity: u32) -> Result<(), RepositoryError> {
        let body = QuantityUpdate { id, quantity };
        self.send(self.client.put(self.products_url()).json(&body)).await.map(|_| ())
    }

    async fn update(&self, product: Product) -> Result<(), RepositoryError> {
        let body = FullUpdate { product: &product, full_update: true };
        self.send(self.client.put(self.products_url()).json(&body)).await.map(|_| ())
    }

    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let body = DeleteRequest { id };
        self.send(self.client.delete(self.products_url()).json(&body)).await.map(|_| ())
    }
}

#[async_trait::async_trait]
impl SaleRepository for RemoteApiClient {
    async fn list_sales(&self) -> Result<Vec<Sale>, RepositoryError> {
        let envelope = self.send(self.client.get(self.sales_url())).await?;
        Ok(envelope.sales.unwrap_or_default())
    }

    async fn append_sale(&self, sale: Sale) -> Result<(), RepositoryError> {
        self.send(self.client.post(self.sales_url()).json(&sale)).await.map(|_| ())
    }
}
