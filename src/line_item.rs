//! Purchase order lines and the policy for reading their amounts
use super::error::ParseError;
use rust_decimal::Decimal;
use std::{fmt, str::FromStr};

/// Whether a line's recorded amount already includes tax.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineAmountTypes {
    #[n(0)]
    Inclusive,
    #[default]
    #[n(1)]
    Exclusive,
    #[n(2)]
    NoTax,
}

impl LineAmountTypes {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inclusive => "Inclusive",
            Self::Exclusive => "Exclusive",
            Self::NoTax => "NoTax",
        }
    }
}

impl fmt::Display for LineAmountTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LineAmountTypes {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Inclusive" => Ok(Self::Inclusive),
            "Exclusive" => Ok(Self::Exclusive),
            "NoTax" => Ok(Self::NoTax),
            other => Err(ParseError::UnknownLineAmountTypes(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineItem {
    line_amount: Decimal,
    tax_amount: Decimal,
    description: Option<String>,
    quantity: Option<Decimal>,
    unit_amount: Option<Decimal>,
    account_code: Option<String>,
    tax_type: Option<String>,
    item_code: Option<String>,
}

impl LineItem {
    pub fn new(line_amount: Decimal, tax_amount: Decimal) -> Self {
        Self {
            line_amount,
            tax_amount,
            ..Self::default()
        }
    }
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = Some(quantity);
        self
    }
    pub fn with_unit_amount(mut self, unit_amount: Decimal) -> Self {
        self.unit_amount = Some(unit_amount);
        self
    }
    pub fn with_account_code(mut self, code: impl Into<String>) -> Self {
        self.account_code = Some(code.into());
        self
    }
    pub fn with_tax_type(mut self, tax_type: impl Into<String>) -> Self {
        self.tax_type = Some(tax_type.into());
        self
    }
    pub fn with_item_code(mut self, code: impl Into<String>) -> Self {
        self.item_code = Some(code.into());
        self
    }

    /// Amount as recorded on the line; includes tax for `Inclusive` orders.
    pub fn line_amount(&self) -> Decimal {
        self.line_amount
    }
    pub fn tax_amount(&self) -> Decimal {
        self.tax_amount
    }
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
    pub fn quantity(&self) -> Option<Decimal> {
        self.quantity
    }
    pub fn unit_amount(&self) -> Option<Decimal> {
        self.unit_amount
    }
    pub fn account_code(&self) -> Option<&str> {
        self.account_code.as_deref()
    }
    pub fn tax_type(&self) -> Option<&str> {
        self.tax_type.as_deref()
    }
    pub fn item_code(&self) -> Option<&str> {
        self.item_code.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_amount_types_use_wire_names() {
        for kind in [
            LineAmountTypes::Inclusive,
            LineAmountTypes::Exclusive,
            LineAmountTypes::NoTax,
        ] {
            assert_eq!(kind.to_string().parse::<LineAmountTypes>(), Ok(kind));
        }
        assert!("inclusive".parse::<LineAmountTypes>().is_err());
    }
}
