use crate::status::PurchaseOrderStatus;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum StatusError {
    #[error("purchase order {record} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        record: String,
        from: PurchaseOrderStatus,
        to: PurchaseOrderStatus,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("purchase order {0} was not found")]
    NotFound(String),
    #[error("purchase order {0} has not been saved yet")]
    Unsaved(String),
    #[error("purchase order number {0} already belongs to another record")]
    DuplicateNumber(String),
    #[error("purchase order store lock was poisoned")]
    Poisoned,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown purchase order status: {0}")]
    UnknownStatus(String),
    #[error("unknown line amount type: {0}")]
    UnknownLineAmountTypes(String),
}
