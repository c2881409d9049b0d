//! The seam between purchase order records and wherever they are saved
use super::purchase_order::PurchaseOrder;

pub trait Persistence {
    /// Create or update `order` remotely. New records receive their id here.
    fn save(&mut self, order: &mut PurchaseOrder) -> anyhow::Result<()>;

    fn is_new_record(&self, order: &PurchaseOrder) -> bool {
        order.is_new_record()
    }
}
