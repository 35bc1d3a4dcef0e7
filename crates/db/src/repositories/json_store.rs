//! Local JSON document store.
//!
//! Each collection is one JSON array on disk, named after the storage keys
//! the storefront has always used. A missing file is an empty collection.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use partsdesk_core::domain::product::{next_product_id, NewProduct, Product, ProductId};
use partsdesk_core::domain::sale::Sale;

use super::{ProductRepository, RepositoryError, SaleRepository};

pub const PRODUCTS_FILE: &str = "allProducts.json";
pub const SALES_FILE: &str = "salesHistory.json";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SeedOutcome {
    pub products_written: usize,
    pub sales_written: usize,
}

impl SeedOutcome {
    pub fn is_noop(&self) -> bool {
        self.products_written == 0 && self.sales_written == 0
    }
}

pub struct JsonFileStore {
    data_dir: PathBuf,
    // serialises read-modify-write cycles
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into(), write_lock: Mutex::new(()) }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn products_path(&self) -> PathBuf {
        self.data_dir.join(PRODUCTS_FILE)
    }

    pub fn sales_path(&self) -> PathBuf {
        self.data_dir.join(SALES_FILE)
    }

    /// Writes the given catalog and sales only into collections that are
    /// currently empty, so running it twice changes nothing.
    pub async fn seed_if_empty(
        &self,
        products: Vec<Product>,
        sales: Vec<Sale>,
    ) -> Result<SeedOutcome, RepositoryError> {
        let _guard = self.write_lock.lock().await;
        let mut outcome = SeedOutcome { products_written: 0, sales_written: 0 };

        let products_path = self.products_path();
        if read_collection::<Product>(&products_path).await?.is_empty() {
            outcome.products_written = products.len();
            write_collection(&products_path, &products).await?;
        }

        let sales_path = self.sales_path();
        if read_collection::<Sale>(&sales_path).await?.is_empty() {
            outcome.sales_written = sales.len();
            write_collection(&sales_path, &sales).await?;
        }

        info!(
            event_name = "partsdesk.store.seeded",
            data_dir = %self.data_dir.display(),
            products_written = outcome.products_written,
            sales_written = outcome.sales_written,
            "local store seeded"
        );
        Ok(outcome)
    }

    async fn modify_products<T>(
        &self,
        change: impl FnOnce(&mut Vec<Product>) -> Result<T, RepositoryError> + Send,
    ) -> Result<T, RepositoryError> {
        let _guard = self.write_lock.lock().await;
        let path = self.products_path();
        let mut products = read_collection::<Product>(&path).await?;
        let result = change(&mut products)?;
        write_collection(&path, &products).await?;
        Ok(result)
    }
}

async fn read_collection<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, RepositoryError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "collection file missing; treating as empty");
            return Ok(Vec::new());
        }
        Err(source) => return Err(RepositoryError::Io { path: path.to_path_buf(), source }),
    };

    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&raw)
        .map_err(|error| RepositoryError::Decode(format!("{}: {error}", path.display())))
}

async fn write_collection<T: Serialize>(path: &Path, items: &[T]) -> Result<(), RepositoryError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| RepositoryError::Io { path: parent.to_path_buf(), source })?;
    }

    let body = serde_json::to_string_pretty(items)
        .map_err(|error| RepositoryError::Decode(error.to_string()))?;
    tokio::fs::write(path, body)
        .await
        .map_err(|source| RepositoryError::Io { path: path.to_path_buf(), source })
}

#[async_trait::async_trait]
impl ProductRepository for JsonFileStore {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        read_collection(&self.products_path()).await
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.list_products().await?;
        Ok(products.into_iter().find(|product| product.id == id))
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        self.modify_products(move |products| {
            let product = product.with_id(next_product_id(products));
            products.push(product.clone());
            Ok(product)
        })
        .await
    }

    async fn update_quantity(&self, id: ProductId, quantity: u32) -> Result<(), RepositoryError> {
        self.modify_products(move |products| {
            let product = products
                .iter_mut()
                .find(|product| product.id == id)
                .ok_or(RepositoryError::NotFound(id))?;
            product.quantity = quantity;
            Ok(())
        })
        .await
    }

    async fn update(&self, product: Product) -> Result<(), RepositoryError> {
        self.modify_products(move |products| {
            let slot = products
                .iter_mut()
                .find(|existing| existing.id == product.id)
                .ok_or(RepositoryError::NotFound(product.id))?;
            *slot = product;
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        self.modify_products(move |products| {
            let before = products.len();
            products.retain(|product| product.id != id);
            if products.len() == before {
                return Err(RepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait::async_trait]
impl SaleRepository for JsonFileStore {
    async fn list_sales(&self) -> Result<Vec<Sale>, RepositoryError> {
        read_collection(&self.sales_path()).await
    }

    async fn append_sale(&self, sale: Sale) -> Result<(), RepositoryError> {
        let _guard = self.write_lock.lock().await;
        let path = self.sales_path();
        let mut sales = read_collection::<Sale>(&path).await?;
        sales.push(sale);
        write_collection(&path, &sales).await
    }
}
