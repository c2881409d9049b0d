//! Purchase order status values and the transitions a client may request
use super::error::ParseError;
use std::{fmt, str::FromStr};

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PurchaseOrderStatus {
    #[default]
    #[n(0)]
    Draft,
    #[n(1)]
    Submitted,
    #[n(2)]
    Authorised,
    #[n(3)]
    Billed,
    #[n(4)]
    Deleted,
}

impl PurchaseOrderStatus {
    pub const ALL: [PurchaseOrderStatus; 5] = [
        Self::Draft,
        Self::Submitted,
        Self::Authorised,
        Self::Billed,
        Self::Deleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Submitted => "SUBMITTED",
            Self::Authorised => "AUTHORISED",
            Self::Billed => "BILLED",
            Self::Deleted => "DELETED",
        }
    }

    /// True once the remote service has accepted the order.
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Authorised | Self::Billed)
    }

    /// Whether a client may request a move from this status to `target`.
    ///
    /// Only approval and deletion are client driven. Everything else
    /// (e.g. `AUTHORISED -> BILLED`) happens on the remote side and shows up
    /// when the record is fetched again.
    pub fn can_transition_to(&self, target: PurchaseOrderStatus) -> bool {
        match target {
            Self::Authorised => matches!(self, Self::Draft | Self::Submitted),
            // payments are checked remotely; billed orders already have one
            Self::Deleted => matches!(self, Self::Draft | Self::Submitted | Self::Authorised),
            _ => false,
        }
    }
}

impl fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PurchaseOrderStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseError::UnknownStatus(s.to_string()))
    }
}
