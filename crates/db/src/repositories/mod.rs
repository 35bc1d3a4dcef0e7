use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use partsdesk_core::domain::product::{NewProduct, Product, ProductId};
use partsdesk_core::domain::sale::Sale;
use partsdesk_core::errors::ApplicationError;

pub mod fallback;
pub mod json_store;
pub mod memory;
pub mod remote;

pub use fallback::FallbackRepository;
pub use json_store::{JsonFileStore, SeedOutcome, PRODUCTS_FILE, SALES_FILE};
pub use memory::{InMemoryProductRepository, InMemorySaleRepository, InMemoryStore};
pub use remote::RemoteApiClient;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("io error at `{path}`: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("remote store rejected request: {0}")]
    Remote(String),
    #[error("product {0} not found")]
    NotFound(ProductId),
}

impl From<RepositoryError> for ApplicationError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Http(_) | RepositoryError::Remote(_) => {
                Self::Integration(error.to_string())
            }
            RepositoryError::NotFound(id) => {
                Self::Domain(partsdesk_core::errors::DomainError::ProductNotFound(id))
            }
            other => Self::Persistence(other.to_string()),
        }
    }
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError>;
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;
    /// Stores a new product under the next free id and returns it.
    async fn insert(&self, product: NewProduct) -> Result<Product, RepositoryError>;
    async fn update_quantity(&self, id: ProductId, quantity: u32) -> Result<(), RepositoryError>;
    /// Replaces every field of an existing product.
    async fn update(&self, product: Product) -> Result<(), RepositoryError>;
    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait SaleRepository: Send + Sync {
    async fn list_sales(&self) -> Result<Vec<Sale>, RepositoryError>;
    async fn append_sale(&self, sale: Sale) -> Result<(), RepositoryError>;
}

/// A backend serving both products and sales.
pub trait Store: ProductRepository + SaleRepository {}

impl<T: ProductRepository + SaleRepository> Store for T {}
