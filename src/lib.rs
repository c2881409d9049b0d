pub mod amount;
pub mod codec;
pub mod contact;
pub mod error;
pub mod line_item;
pub mod persistence;
pub mod purchase_order;
pub mod service;
pub mod status;
pub mod store;
