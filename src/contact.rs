use super::codec::Guid;

// Only the part of a contact that arrives inline with a purchase order.
// Reading it never fetches the full contact record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactRef {
    pub contact_id: Option<Guid>,
    pub name: Option<String>,
}

impl ContactRef {
    pub fn new(contact_id: Option<Guid>, name: Option<String>) -> Self {
        Self { contact_id, name }
    }
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            contact_id: None,
            name: Some(name.into()),
        }
    }
}
