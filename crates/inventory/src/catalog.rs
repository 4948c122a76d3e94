use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use shopfront_core::{DomainError, DomainResult, Entity, ProductId};
use shopfront_products::{CreateProduct, Product};

/// Arena of catalog products addressed by [`ProductId`].
///
/// Records are inserted at load time (`&mut self`) and afterwards only
/// mutated through their individual locks, so a `&Catalog` can be shared
/// across threads running concurrent checkouts.
#[derive(Debug, Default)]
pub struct Catalog {
    products: BTreeMap<ProductId, Mutex<Product>>,
}

/// Exclusive access to a set of products, held in ascending id order.
///
/// Dropping the guard releases every lock.
pub struct ProductLocks<'a> {
    guards: Vec<MutexGuard<'a, Product>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Add a product record; its id becomes the handle carts refer to.
    pub fn insert(&mut self, product: Product) -> DomainResult<ProductId> {
        let id = product.id();
        if self.products.contains_key(&id) {
            return Err(DomainError::validation(format!(
                "product {id} already in catalog"
            )));
        }
        self.products.insert(id, Mutex::new(product));
        Ok(id)
    }

    /// Build and insert a product in one step.
    pub fn create(&mut self, cmd: CreateProduct) -> DomainResult<ProductId> {
        self.insert(Product::create(cmd)?)
    }

    /// Point-in-time copy of a product.
    pub fn get(&self, id: ProductId) -> DomainResult<Product> {
        Ok(self.lock(id)?.clone())
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.products.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.products.keys().copied()
    }

    /// Lock a single product.
    pub fn lock(&self, id: ProductId) -> DomainResult<MutexGuard<'_, Product>> {
        let cell = self
            .products
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("product {id}")))?;
        cell.lock()
            .map_err(|_| DomainError::invariant(format!("product {id} lock poisoned")))
    }

    /// Lock every product in `ids`, deduplicated, in ascending id order.
    ///
    /// All callers that need more than one product go through here, so lock
    /// order is global and concurrent callers cannot deadlock.
    pub fn lock_many(
        &self,
        ids: impl IntoIterator<Item = ProductId>,
    ) -> DomainResult<ProductLocks<'_>> {
        let mut ordered: Vec<ProductId> = ids.into_iter().collect();
        ordered.sort_unstable();
        ordered.dedup();

        // Resolve every handle before taking any lock.
        if let Some(missing) = ordered.iter().find(|id| !self.contains(**id)) {
            return Err(DomainError::not_found(format!("product {missing}")));
        }

        let mut guards = Vec::with_capacity(ordered.len());
        for id in ordered {
            guards.push(self.lock(id)?);
        }
        Ok(ProductLocks { guards })
    }
}

impl<'a> ProductLocks<'a> {
    pub fn get(&self, id: ProductId) -> DomainResult<&Product> {
        self.position(id).map(|idx| &*self.guards[idx])
    }

    pub fn get_mut(&mut self, id: ProductId) -> DomainResult<&mut Product> {
        let idx = self.position(id)?;
        Ok(&mut *self.guards[idx])
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    fn position(&self, id: ProductId) -> DomainResult<usize> {
        self.guards
            .binary_search_by(|guard| guard.id().cmp(&id))
            .map_err(|_| DomainError::invariant(format!("product {id} not held")))
    }
}
