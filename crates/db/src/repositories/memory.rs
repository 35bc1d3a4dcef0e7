use std::collections::BTreeMap;

use tokio::sync::RwLock;

use partsdesk_core::domain::product::{NewProduct, Product, ProductId};
use partsdesk_core::domain::sale::Sale;

use super::{ProductRepository, RepositoryError, SaleRepository};

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<BTreeMap<ProductId, Product>>,
}

impl InMemoryProductRepository {
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let products = products.into_iter().map(|product| (product.id, product)).collect();
        Self { products: RwLock::new(products) }
    }
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.values().cloned().collect())
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.get(&id).cloned())
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let mut products = self.products.write().await;
        let id = products.keys().next_back().map_or(ProductId(1), |last| ProductId(last.0 + 1));
        let product = product.with_id(id);
        products.insert(id, product.clone());
        Ok(product)
    }

    async fn update_quantity(&self, id: ProductId, quantity: u32) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        let product = products.get_mut(&id).ok_or(RepositoryError::NotFound(id))?;
        product.quantity = quantity;
        Ok(())
    }

    async fn update(&self, product: Product) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        let slot = products.get_mut(&product.id).ok_or(RepositoryError::NotFound(product.id))?;
        *slot = product;
        Ok(())
    }

    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        products.remove(&id).map(|_| ()).ok_or(RepositoryError::NotFound(id))
    }
}

#[derive(Default)]
pub struct InMemorySaleRepository {
    sales: RwLock<Vec<Sale>>,
}

impl InMemorySaleRepository {
    pub fn with_sales(sales: Vec<Sale>) -> Self {
        Self { sales: RwLock::new(sales) }
    }
}

#[async_trait::async_trait]
impl SaleRepository for InMemorySaleRepository {
    async fn list_sales(&self) -> Result<Vec<Sale>, RepositoryError> {
        Ok(self.sales.read().await.clone())
    }

    async fn append_sale(&self, sale: Sale) -> Result<(), RepositoryError> {
        self.sales.write().await.push(sale);
        Ok(())
    }
}

/// Products and sales held together, for wiring a [`super::Store`] in tests
/// and demos.
#[derive(Default)]
pub struct InMemoryStore {
    pub products: InMemoryProductRepository,
    pub sales: InMemorySaleRepository,
}

impl InMemoryStore {
    pub fn new(products: Vec<Product>, sales: Vec<Sale>) -> Self {
        Self {
            products: InMemoryProductRepository::with_products(products),
            sales: InMemorySaleRepository::with_sales(sales),
        }
    }
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryStore {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        self.products.list_products().await
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        self.products.find_by_id(id).await
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        self.products.insert(product).await
    }

    async fn update_quantity(&self, id: ProductId, quantity: u32) -> Result<(), RepositoryError> {
        self.products.update_quantity(id, quantity).await
    }

    async fn update(&self, product: Product) -> Result<(), RepositoryError> {
        self.products.update(product).await
    }

    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        self.products.delete(id).await
    }
}

#[async_trait::async_trait]
impl SaleRepository for InMemoryStore {
    async fn list_sales(&self) -> Result<Vec<Sale>, RepositoryError> {
        self.sales.list_sales().await
    }

    async fn append_sale(&self, sale: Sale) -> Result<(), RepositoryError> {
        self.sales.append_sale(sale).await
    }
}
