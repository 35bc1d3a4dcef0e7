use tracing::warn;

use partsdesk_core::domain::product::{NewProduct, Product, ProductId};
use partsdesk_core::domain::sale::Sale;

use super::{ProductRepository, RepositoryError, SaleRepository};

/// Writes go to `primary` and are retried against `local` when it fails.
/// Product reads prefer `local` once it holds a catalog, so edits that only
/// reached the local store are not masked by a stale remote copy. Sale reads
/// prefer `primary`; sales it accepts are mirrored into `local` as well.
pub struct FallbackRepository<P, L> {
    primary: P,
    local: L,
}

impl<P, L> FallbackRepository<P, L> {
    pub fn new(primary: P, local: L) -> Self {
        Self { primary, local }
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn local(&self) -> &L {
        &self.local
    }
}

fn log_fallback(operation: &'static str, error: &RepositoryError) {
    warn!(
        event_name = "partsdesk.store.fallback_engaged",
        operation,
        error = %error,
        "primary store failed; using local store"
    );
}

impl<P, L> FallbackRepository<P, L>
where
    P: ProductRepository,
    L: ProductRepository,
{
    /// The local catalog when it is readable and non-empty.
    async fn local_catalog(&self) -> Option<Vec<Product>> {
        match self.local.list_products().await {
            Ok(products) if !products.is_empty() => Some(products),
            Ok(_) => None,
            Err(error) => {
                warn!(
                    event_name = "partsdesk.store.local_read_failed",
                    error = %error,
                    "local catalog unreadable; reading primary store"
                );
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl<P, L> ProductRepository for FallbackRepository<P, L>
where
    P: ProductRepository,
    L: ProductRepository,
{
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        if let Some(products) = self.local_catalog().await {
            return Ok(products);
        }
        match self.primary.list_products().await {
            Ok(products) => Ok(products),
            Err(error) => {
                log_fallback("list_products", &error);
                self.local.list_products().await
            }
        }
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        if let Some(products) = self.local_catalog().await {
            return Ok(products.into_iter().find(|product| product.id == id));
        }
        match self.primary.find_by_id(id).await {
            Ok(product) => Ok(product),
            Err(error) => {
                log_fallback("find_by_id", &error);
                self.local.find_by_id(id).await
            }
        }
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        match self.primary.insert(product.clone()).await {
            Ok(created) => Ok(created),
            Err(error) => {
                log_fallback("insert", &error);
                self.local.insert(product).await
            }
        }
    }

    async fn update_quantity(&self, id: ProductId, quantity: u32) -> Result<(), RepositoryError> {
        match self.primary.update_quantity(id, quantity).await {
            Ok(()) => Ok(()),
            Err(error) => {
                log_fallback("update_quantity", &error);
                self.local.update_quantity(id, quantity).await
            }
        }
    }

    async fn update(&self, product: Product) -> Result<(), RepositoryError> {
        match self.primary.update(product.clone()).await {
            Ok(()) => Ok(()),
            Err(error) => {
                log_fallback("update", &error);
                self.local.update(product).await
            }
        }
    }

    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        match self.primary.delete(id).await {
            Ok(()) => Ok(()),
            Err(error) => {
                log_fallback("delete", &error);
                self.local.delete(id).await
            }
        }
    }
}

#[async_trait::async_trait]
impl<P, L> SaleRepository for FallbackRepository<P, L>
where
    P: SaleRepository,
    L: SaleRepository,
{
    async fn list_sales(&self) -> Result<Vec<Sale>, RepositoryError> {
        match self.primary.list_sales().await {
            Ok(sales) => Ok(sales),
            Err(error) => {
                log_fallback("list_sales", &error);
                self.local.list_sales().await
            }
        }
    }

    async fn append_sale(&self, sale: Sale) -> Result<(), RepositoryError> {
        match self.primary.append_sale(sale.clone()).await {
            Ok(()) => {
                if let Err(error) = self.local.append_sale(sale).await {
                    warn!(
                        event_name = "partsdesk.store.mirror_failed",
                        error = %error,
                        "sale recorded remotely but not mirrored locally"
                    );
                }
                Ok(())
            }
            Err(error) => {
                log_fallback("append_sale", &error);
                self.local.append_sale(sale).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;

    use partsdesk_core::domain::product::{NewProduct, Product, ProductId};
    use partsdesk_core::domain::sale::Sale;

    use super::FallbackRepository;
    use crate::fixtures::{sample_products, sample_sales};
    use crate::repositories::remote::test_server::{closed_port, serve_json};
    use crate::repositories::{
        InMemoryProductRepository, InMemoryStore, ProductRepository, RemoteApiClient,
        RepositoryError, SaleRepository,
    };

    /// Serves reads from memory and rejects every write.
    struct ReadOnlyCatalog(InMemoryProductRepository);

    fn rejected() -> RepositoryError {
        RepositoryError::Remote("writes disabled".to_string())
    }

    #[async_trait::async_trait]
    impl ProductRepository for ReadOnlyCatalog {
        async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
            self.0.list_products().await
        }

        async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
            self.0.find_by_id(id).await
        }

        async fn insert(&self, _product: NewProduct) -> Result<Product, RepositoryError> {
            Err(rejected())
        }

        async fn update_quantity(
            &self,
            _id: ProductId,
            _quantity: u32,
        ) -> Result<(), RepositoryError> {
            Err(rejected())
        }

        async fn update(&self, _product: Product) -> Result<(), RepositoryError> {
            Err(rejected())
        }

        async fn delete(&self, _id: ProductId) -> Result<(), RepositoryError> {
            Err(rejected())
        }
    }

    fn read_only_primary() -> ReadOnlyCatalog {
        ReadOnlyCatalog(InMemoryProductRepository::with_products(sample_products()))
    }

    fn remote(base_url: String) -> RemoteApiClient {
        RemoteApiClient::new(base_url, Duration::from_secs(5), None).expect("client")
    }

    #[tokio::test]
    async fn unreachable_primary_falls_back_to_local() {
        let local = InMemoryStore::new(sample_products(), Vec::new());
        let store = FallbackRepository::new(remote(closed_port().await), local);

        let products = store.list_products().await.expect("fallback list");
        assert_eq!(products.len(), 10);

        store.update_quantity(ProductId(1), 9).await.expect("fallback update");
        let updated = store.local().find_by_id(ProductId(1)).await.expect("find");
        assert_eq!(updated.map(|product| product.quantity), Some(9));
    }

    #[tokio::test]
    async fn sale_is_recorded_locally_when_primary_is_down() {
        let store = FallbackRepository::new(remote(closed_port().await), InMemoryStore::default());
        let sale = Sale::record(&sample_products()[0], 2, Utc::now());

        store.append_sale(sale.clone()).await.expect("append");

        assert_eq!(store.local().list_sales().await.expect("sales"), vec![sale]);
    }

    #[tokio::test]
    async fn successful_remote_sale_is_mirrored_locally() {
        let base_url = serve_json(r#"{"success":true}"#, 1).await;
        let store = FallbackRepository::new(remote(base_url), InMemoryStore::default());
        let sale = Sale::record(&sample_products()[4], 3, Utc::now());

        store.append_sale(sale.clone()).await.expect("append");

        assert_eq!(store.local().list_sales().await.expect("sales"), vec![sale]);
    }

    #[tokio::test]
    async fn healthy_primary_is_authoritative() {
        let base_url = serve_json(r#"{"success":true,"sales":[]}"#, 1).await;
        let local = InMemoryStore::new(Vec::new(), sample_sales(Utc::now()));
        let store = FallbackRepository::new(remote(base_url), local);

        assert!(store.list_sales().await.expect("sales").is_empty());
    }

    #[tokio::test]
    async fn locally_written_stock_is_read_back_over_the_primary() {
        let local = InMemoryStore::new(sample_products(), Vec::new());
        let store = FallbackRepository::new(read_only_primary(), local);

        store.update_quantity(ProductId(1), 999).await.expect("fallback update");

        let product = store.find_by_id(ProductId(1)).await.expect("find");
        assert_eq!(product.map(|product| product.quantity), Some(999));
        let listed = store.list_products().await.expect("list");
        let listed_quantity =
            listed.iter().find(|product| product.id == ProductId(1)).map(|product| product.quantity);
        assert_eq!(listed_quantity, Some(999));

        let stale = store.primary().find_by_id(ProductId(1)).await.expect("primary");
        assert_eq!(stale.map(|product| product.quantity), Some(3));
    }

    #[tokio::test]
    async fn empty_local_catalog_reads_the_primary() {
        let store = FallbackRepository::new(read_only_primary(), InMemoryStore::default());

        assert_eq!(store.list_products().await.expect("list").len(), 10);
        let found = store.find_by_id(ProductId(7)).await.expect("find");
        assert_eq!(found.map(|product| product.quantity), Some(1));
    }
}
