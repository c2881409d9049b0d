//! Service layer API for purchase order operations
use super::codec::Guid;
use super::error::StoreError;
use super::persistence::Persistence;
use super::purchase_order::PurchaseOrder;
use super::store::SledStore;
use std::sync::{Mutex, MutexGuard};
use tracing::info;

/// Runs each load -> check -> save sequence while holding the store, so two
/// callers can't both pass the status check on the same order.
pub struct PurchaseOrderService {
    store: Mutex<SledStore>,
}

impl PurchaseOrderService {
    pub fn new(store: SledStore) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, SledStore>> {
        self.store.lock().map_err(|_| StoreError::Poisoned.into())
    }

    /// Save a new purchase order and return it with its assigned id
    pub fn create(&self, mut order: PurchaseOrder) -> anyhow::Result<PurchaseOrder> {
        let mut store = self.lock()?;
        store.save(&mut order)?;

        info!(purchase_order = %order.identity(), "created purchase order");
        Ok(order)
    }

    pub fn fetch(&self, id: &Guid) -> anyhow::Result<PurchaseOrder> {
        self.lock()?.fetch(id)
    }

    pub fn find_by_number(&self, number: &str) -> anyhow::Result<PurchaseOrder> {
        self.lock()?.find_by_number(number)
    }

    /// Summaries of every purchase order
    pub fn list(&self) -> anyhow::Result<Vec<PurchaseOrder>> {
        self.lock()?.list()
    }

    /// Approve a draft or submitted purchase order
    pub fn approve_purchase_order(&self, id: &Guid) -> anyhow::Result<PurchaseOrder> {
        let mut store = self.lock()?;
        let mut order = store.fetch(id)?;

        order.approve(&mut *store)?;
        Ok(order)
    }

    /// Delete a purchase order that hasn't been billed
    pub fn delete_purchase_order(&self, id: &Guid) -> anyhow::Result<PurchaseOrder> {
        let mut store = self.lock()?;
        let mut order = store.fetch(id)?;

        order.delete(&mut *store)?;
        Ok(order)
    }
}
