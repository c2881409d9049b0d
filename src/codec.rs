//! CBOR newtypes for values whose crates don't implement the minicbor traits
use chrono::{Datelike, NaiveDate};
use minicbor::Encode;
use rust_decimal::Decimal;
use std::{fmt, str::FromStr};
use uuid7::{Uuid, uuid7};

// newtype wrapper over uuid because Uuid doesn't implement minicbor traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Guid(Uuid);

impl Guid {
    pub fn new() -> Self {
        Self(uuid7())
    }
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for Guid {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for Guid {
    fn from(value: Uuid) -> Self {
        Guid(value)
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl<C> minicbor::Encode<C> for Guid {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        self.0.as_bytes().encode(e, ctx)
    }
}

impl<'b, C> minicbor::Decode<'b, C> for Guid {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let bytes: [u8; 16] = d.decode()?;

        Ok(Guid(Uuid::from(bytes)))
    }
}

// Decimals travel as their canonical string so scale survives the round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CborDecimal(pub Decimal);

impl<C> minicbor::Encode<C> for CborDecimal {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.str(&self.0.to_string())?.ok()
    }
}

impl<'b, C> minicbor::Decode<'b, C> for CborDecimal {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let text = d.str()?;

        Decimal::from_str(text)
            .map(CborDecimal)
            .map_err(|_| minicbor::decode::Error::message("failed to parse decimal amount"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CborDate(pub NaiveDate);

impl<C> minicbor::Encode<C> for CborDate {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.i32(self.0.num_days_from_ce())?.ok()
    }
}

impl<'b, C> minicbor::Decode<'b, C> for CborDate {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let days = d.i32()?;

        NaiveDate::from_num_days_from_ce_opt(days)
            .map(CborDate)
            .ok_or(minicbor::decode::Error::message(
                "failed to convert day count to a date",
            ))
    }
}
