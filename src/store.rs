//! sled backed purchase order storage
use super::amount::DerivedAmount;
use super::codec::{CborDate, CborDecimal, Guid};
use super::contact::ContactRef;
use super::error::StoreError;
use super::line_item::{LineAmountTypes, LineItem};
use super::persistence::Persistence;
use super::purchase_order::{Completeness, PurchaseOrder};
use super::status::PurchaseOrderStatus;
use sled::{Batch, Db};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

const ORDER_PREFIX: &str = "order/";
const NUMBER_PREFIX: &str = "number/";

fn order_key(id: &Guid) -> String {
    format!("{ORDER_PREFIX}{id}")
}

fn number_key(number: &str) -> String {
    format!("{NUMBER_PREFIX}{number}")
}

/// Where and how the sled database is opened.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    path: Option<PathBuf>,
    temporary: bool,
    flush_every_ms: Option<u64>,
    cache_capacity: Option<u64>,
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
    /// Database is removed when dropped. Used when no path is set either.
    pub fn set_temporary(mut self, temporary: bool) -> Self {
        self.temporary = temporary;
        self
    }
    pub fn set_flush_every_ms(mut self, ms: Option<u64>) -> Self {
        self.flush_every_ms = ms;
        self
    }
    pub fn set_cache_capacity(mut self, bytes: u64) -> Self {
        self.cache_capacity = Some(bytes);
        self
    }

    pub fn open(&self) -> anyhow::Result<Arc<Db>> {
        let mut config = sled::Config::new()
            .temporary(self.temporary || self.path.is_none())
            .flush_every_ms(self.flush_every_ms);
        if let Some(path) = &self.path {
            config = config.path(path);
        }
        if let Some(bytes) = self.cache_capacity {
            config = config.cache_capacity(bytes);
        }
        Ok(Arc::new(config.open()?))
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug)]
struct StoredContact {
    #[n(0)]
    contact_id: Option<Guid>,
    #[n(1)]
    name: Option<String>,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug)]
struct StoredLineItem {
    #[n(0)]
    line_amount: CborDecimal,
    #[n(1)]
    tax_amount: CborDecimal,
    #[n(2)]
    description: Option<String>,
    #[n(3)]
    quantity: Option<CborDecimal>,
    #[n(4)]
    unit_amount: Option<CborDecimal>,
    #[n(5)]
    account_code: Option<String>,
    #[n(6)]
    tax_type: Option<String>,
    #[n(7)]
    item_code: Option<String>,
}

// Key is `order/<purchase_order_id>`
#[derive(minicbor::Encode, minicbor::Decode, Debug)]
struct StoredPurchaseOrder {
    #[n(0)]
    purchase_order_id: Guid,
    #[n(1)]
    purchase_order_number: Option<String>,
    #[n(2)]
    reference: Option<String>,
    #[n(3)]
    status: PurchaseOrderStatus,
    #[n(4)]
    line_amount_types: LineAmountTypes,
    #[n(5)]
    contact: Option<StoredContact>,
    #[n(6)]
    line_items: Vec<StoredLineItem>,
    #[n(7)]
    sub_total: Option<CborDecimal>,
    #[n(8)]
    total_tax: Option<CborDecimal>,
    #[n(9)]
    total: Option<CborDecimal>,
    #[n(10)]
    branding_theme_id: Option<Guid>,
    #[n(11)]
    date: Option<CborDate>,
    #[n(12)]
    delivery_date: Option<CborDate>,
    #[n(13)]
    expected_arrival_date: Option<CborDate>,
    #[n(14)]
    total_discount: Option<CborDecimal>,
    #[n(15)]
    currency_code: Option<String>,
    #[n(16)]
    currency_rate: Option<CborDecimal>,
    #[n(17)]
    sent_to_contact: bool,
    #[n(18)]
    has_attachments: bool,
    #[n(19)]
    delivery_address: Option<String>,
    #[n(20)]
    attention_to: Option<String>,
    #[n(21)]
    telephone: Option<String>,
    #[n(22)]
    delivery_instructions: Option<String>,
    // which of sub_total, total_tax, total were set explicitly
    #[n(23)]
    overridden: [bool; 3],
}

// Explicitly set values come back as overrides so a later full fetch
// doesn't recompute over them.
fn restore_amount(value: Option<CborDecimal>, overridden: bool) -> DerivedAmount {
    match value {
        Some(CborDecimal(value)) if overridden => DerivedAmount::Overridden(value),
        value => DerivedAmount::from_reported(value.map(|d| d.0)),
    }
}

impl From<&LineItem> for StoredLineItem {
    fn from(item: &LineItem) -> Self {
        Self {
            line_amount: CborDecimal(item.line_amount()),
            tax_amount: CborDecimal(item.tax_amount()),
            description: item.description().map(str::to_string),
            quantity: item.quantity().map(CborDecimal),
            unit_amount: item.unit_amount().map(CborDecimal),
            account_code: item.account_code().map(str::to_string),
            tax_type: item.tax_type().map(str::to_string),
            item_code: item.item_code().map(str::to_string),
        }
    }
}

impl From<StoredLineItem> for LineItem {
    fn from(stored: StoredLineItem) -> Self {
        let mut item = LineItem::new(stored.line_amount.0, stored.tax_amount.0);
        if let Some(description) = stored.description {
            item = item.with_description(description);
        }
        if let Some(quantity) = stored.quantity {
            item = item.with_quantity(quantity.0);
        }
        if let Some(unit_amount) = stored.unit_amount {
            item = item.with_unit_amount(unit_amount.0);
        }
        if let Some(code) = stored.account_code {
            item = item.with_account_code(code);
        }
        if let Some(tax_type) = stored.tax_type {
            item = item.with_tax_type(tax_type);
        }
        if let Some(code) = stored.item_code {
            item = item.with_item_code(code);
        }
        item
    }
}

impl StoredPurchaseOrder {
    // totals are written resolved, the way the remote side reports them
    fn capture(id: Guid, order: &PurchaseOrder) -> Self {
        Self {
            purchase_order_id: id,
            purchase_order_number: order.purchase_order_number.clone(),
            reference: order.reference.clone(),
            status: order.status,
            line_amount_types: order.line_amount_types,
            contact: order.contact.as_ref().map(|c| StoredContact {
                contact_id: c.contact_id,
                name: c.name.clone(),
            }),
            line_items: order.line_items.iter().map(StoredLineItem::from).collect(),
            sub_total: order.sub_total().map(CborDecimal),
            total_tax: order.total_tax().map(CborDecimal),
            total: order.total().map(CborDecimal),
            branding_theme_id: order.branding_theme_id,
            date: order.date.map(CborDate),
            delivery_date: order.delivery_date.map(CborDate),
            expected_arrival_date: order.expected_arrival_date.map(CborDate),
            total_discount: order.total_discount.map(CborDecimal),
            currency_code: order.currency_code.clone(),
            currency_rate: order.currency_rate.map(CborDecimal),
            sent_to_contact: order.sent_to_contact,
            has_attachments: order.has_attachments,
            delivery_address: order.delivery_address.clone(),
            attention_to: order.attention_to.clone(),
            telephone: order.telephone.clone(),
            delivery_instructions: order.delivery_instructions.clone(),
            overridden: [
                order.sub_total.is_overridden(),
                order.total_tax.is_overridden(),
                order.total.is_overridden(),
            ],
        }
    }

    fn into_purchase_order(self, completeness: Completeness) -> PurchaseOrder {
        let line_items = match completeness {
            Completeness::Full => self.line_items.into_iter().map(LineItem::from).collect(),
            Completeness::Summary => Vec::new(),
        };

        PurchaseOrder {
            purchase_order_number: self.purchase_order_number,
            reference: self.reference,
            line_amount_types: self.line_amount_types,
            contact: self
                .contact
                .map(|c| ContactRef::new(c.contact_id, c.name)),
            line_items,
            sub_total: restore_amount(self.sub_total, self.overridden[0]),
            total_tax: restore_amount(self.total_tax, self.overridden[1]),
            total: restore_amount(self.total, self.overridden[2]),
            branding_theme_id: self.branding_theme_id,
            date: self.date.map(|d| d.0),
            delivery_date: self.delivery_date.map(|d| d.0),
            expected_arrival_date: self.expected_arrival_date.map(|d| d.0),
            total_discount: self.total_discount.map(|d| d.0),
            currency_code: self.currency_code,
            currency_rate: self.currency_rate.map(|d| d.0),
            sent_to_contact: self.sent_to_contact,
            has_attachments: self.has_attachments,
            delivery_address: self.delivery_address,
            attention_to: self.attention_to,
            telephone: self.telephone,
            delivery_instructions: self.delivery_instructions,
            ..PurchaseOrder::persisted(self.purchase_order_id, self.status, completeness)
        }
    }
}

pub struct SledStore {
    instance: Arc<Db>,
}

impl SledStore {
    pub fn new(instance: Arc<Db>) -> Self {
        Self { instance }
    }

    pub fn open(config: &StoreConfig) -> anyhow::Result<Self> {
        Ok(Self::new(config.open()?))
    }

    fn load_stored(&self, id: &Guid) -> anyhow::Result<Option<StoredPurchaseOrder>> {
        match self.instance.get(order_key(id).as_bytes())? {
            Some(bytes) => Ok(Some(minicbor::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Full record, line items included.
    pub fn fetch(&self, id: &Guid) -> anyhow::Result<PurchaseOrder> {
        let stored = self
            .load_stored(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        Ok(stored.into_purchase_order(Completeness::Full))
    }

    pub fn find_by_number(&self, number: &str) -> anyhow::Result<PurchaseOrder> {
        let id_bytes = self
            .instance
            .get(number_key(number).as_bytes())?
            .ok_or_else(|| StoreError::NotFound(number.to_string()))?;
        let id: Guid = minicbor::decode(&id_bytes)?;

        self.fetch(&id)
    }

    /// Every stored order as a summary, without line items.
    pub fn list(&self) -> anyhow::Result<Vec<PurchaseOrder>> {
        self.instance
            .scan_prefix(ORDER_PREFIX.as_bytes())
            .map(|entry| -> anyhow::Result<PurchaseOrder> {
                let (_, bytes) = entry?;
                let stored: StoredPurchaseOrder = minicbor::decode(&bytes)?;
                Ok(stored.into_purchase_order(Completeness::Summary))
            })
            .collect()
    }
}

impl Persistence for SledStore {
    fn save(&mut self, order: &mut PurchaseOrder) -> anyhow::Result<()> {
        let (id, previous) = if self.is_new_record(order) {
            (Guid::new(), None)
        } else {
            let id = order
                .purchase_order_id()
                .ok_or_else(|| StoreError::Unsaved(order.identity()))?;
            let previous = self
                .load_stored(&id)?
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            (id, Some(previous))
        };

        let mut stored = StoredPurchaseOrder::capture(id, order);
        let mut batch = Batch::default();
        if let Some(number) = order.purchase_order_number() {
            if let Some(owner) = self.instance.get(number_key(number).as_bytes())? {
                let owner: Guid = minicbor::decode(&owner)?;
                if owner != id {
                    return Err(StoreError::DuplicateNumber(number.to_string()).into());
                }
            }
            batch.insert(number_key(number).as_bytes(), minicbor::to_vec(id)?);
        }
        if let Some(previous) = previous {
            // drop the index entry for a number the order no longer carries
            if let Some(old) = previous.purchase_order_number {
                if order.purchase_order_number() != Some(old.as_str()) {
                    batch.remove(number_key(&old).as_bytes());
                }
            }
            // a summary never saw the lines, so it cannot replace them
            if !order.is_loaded() {
                stored.line_items = previous.line_items;
            }
        }

        batch.insert(order_key(&id).as_bytes(), minicbor::to_vec(&stored)?);
        self.instance.apply_batch(batch)?;

        debug!(purchase_order = %id, status = %order.status(), "stored purchase order");
        order.mark_saved(id);
        Ok(())
    }
}
