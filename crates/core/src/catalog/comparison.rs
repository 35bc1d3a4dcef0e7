use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductId};
use crate::errors::DomainError;

pub const DEFAULT_MAX_SELECTION: usize = 4;
pub const MIN_SELECTION: usize = 2;

/// Products the shopper ticked for side-by-side comparison, in the order
/// they were picked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonSelection {
    ids: Vec<ProductId>,
    max: usize,
}

impl Default for ComparisonSelection {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SELECTION)
    }
}

impl ComparisonSelection {
    pub fn new(max: usize) -> Self {
        Self { ids: Vec::new(), max: max.max(MIN_SELECTION) }
    }

    /// Builds a selection from ids in order, ignoring repeats.
    pub fn from_ids(
        ids: impl IntoIterator<Item = ProductId>,
        max: usize,
    ) -> Result<Self, DomainError> {
        let mut selection = Self::new(max);
        for id in ids {
            if !selection.contains(id) {
                selection.add(id)?;
            }
        }
        Ok(selection)
    }

    pub fn ids(&self) -> &[ProductId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.ids.contains(&id)
    }

    pub fn can_compare(&self) -> bool {
        self.ids.len() >= MIN_SELECTION
    }

    /// Adds the id if absent, removes it if present. Returns whether the id
    /// is selected afterwards.
    pub fn toggle(&mut self, id: ProductId) -> Result<bool, DomainError> {
        if self.remove(id) {
            return Ok(false);
        }
        self.add(id)?;
        Ok(true)
    }

    pub fn remove(&mut self, id: ProductId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|selected| *selected != id);
        self.ids.len() != before
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Looks the selected ids up in `products`. Ids no longer in the catalog
    /// are skipped; fewer than two remaining products is an error.
    pub fn resolve<'a>(&self, products: &'a [Product]) -> Result<Vec<&'a Product>, DomainError> {
        let resolved: Vec<&Product> = self
            .ids
            .iter()
            .filter_map(|id| products.iter().find(|product| product.id == *id))
            .collect();

        if resolved.len() < MIN_SELECTION {
            return Err(DomainError::NotEnoughToCompare {
                min: MIN_SELECTION,
                selected: resolved.len(),
            });
        }

        Ok(resolved)
    }

    fn add(&mut self, id: ProductId) -> Result<(), DomainError> {
        if self.ids.len() >= self.max {
            return Err(DomainError::ComparisonLimit { max: self.max });
        }
        self.ids.push(id);
        Ok(())
    }
}
