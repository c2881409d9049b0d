//! Storage for the derived financial fields of a purchase order
use rust_decimal::Decimal;

/// What is held for one derived field.
///
/// `Reported` values came from the server and give way to recomputation once
/// the record is loaded. `Overridden` values were assigned explicitly and are
/// returned as-is for the rest of the record's life.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DerivedAmount {
    #[default]
    Absent,
    Reported(Decimal),
    Overridden(Decimal),
}

impl DerivedAmount {
    pub fn from_reported(value: Option<Decimal>) -> Self {
        value.map_or(Self::Absent, Self::Reported)
    }

    /// The stored value, whatever its origin.
    pub fn stored(&self) -> Option<Decimal> {
        match self {
            Self::Absent => None,
            Self::Reported(value) | Self::Overridden(value) => Some(*value),
        }
    }

    pub fn overridden(&self) -> Option<Decimal> {
        match self {
            Self::Overridden(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_overridden(&self) -> bool {
        matches!(self, Self::Overridden(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedField {
    SubTotal,
    TotalTax,
    Total,
}

/// How a derived field should be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    /// Recompute from line items when the record is loaded and not overridden.
    #[default]
    Resolved,
    /// Never recompute; return whatever is stored.
    Summary,
}
