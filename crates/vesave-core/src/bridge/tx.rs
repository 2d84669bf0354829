//! The source-chain transaction behind a bridge task, and the seam that
//! signs and broadcasts it.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::{Result, VeSaveError};
use crate::session::KeyPair;

/// Unsigned integer given either as `0x`-prefixed hex or as decimal.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawQuantity", into = "String")]
pub struct Quantity(u128);

impl Quantity {
    pub fn new(value: u128) -> Self {
        Self(value)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            Some(hex) => u128::from_str_radix(hex, 16),
            None => text.parse::<u128>(),
        };
        parsed
            .map(Self)
            .map_err(|_| VeSaveError::invalid_input(format!("Invalid quantity '{}'.", text)))
    }

    pub fn value(self) -> u128 {
        self.0
    }

    /// Narrows to `u64` for nonces and chain ids.
    pub fn as_u64(self) -> Result<u64> {
        u64::try_from(self.0)
            .map_err(|_| VeSaveError::invalid_input(format!("Quantity {} exceeds u64.", self.0)))
    }
}

impl fmt::Debug for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Quantity({:#x})", self.0)
    }
}

impl From<Quantity> for String {
    fn from(quantity: Quantity) -> Self {
        format!("{:#x}", quantity.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuantity {
    Number(u64),
    Text(String),
}

impl TryFrom<RawQuantity> for Quantity {
    type Error = VeSaveError;

    fn try_from(raw: RawQuantity) -> Result<Self> {
        match raw {
            RawQuantity::Number(n) => Ok(Self(u128::from(n))),
            RawQuantity::Text(text) => Self::parse(&text),
        }
    }
}

/// Blank strings and nulls count as absent.
fn optional_quantity<'de, D>(deserializer: D) -> std::result::Result<Option<Quantity>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawQuantity>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawQuantity::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(raw) => Quantity::try_from(raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Contract call the source wallet signs to fund a bridge task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeTxData {
    #[serde(alias = "to")]
    pub contract_address: String,
    /// Hex calldata.
    #[serde(default, alias = "data")]
    pub contract_data: String,
    #[serde(default, deserialize_with = "optional_quantity", skip_serializing_if = "Option::is_none")]
    pub value: Option<Quantity>,
    #[serde(default, deserialize_with = "optional_quantity", skip_serializing_if = "Option::is_none")]
    pub gas: Option<Quantity>,
    #[serde(default, deserialize_with = "optional_quantity", skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<Quantity>,
    #[serde(default, deserialize_with = "optional_quantity", skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<Quantity>,
    #[serde(default, deserialize_with = "optional_quantity", skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<Quantity>,
    #[serde(default, deserialize_with = "optional_quantity", skip_serializing_if = "Option::is_none")]
    pub nonce: Option<Quantity>,
    #[serde(default, deserialize_with = "optional_quantity", skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<Quantity>,
    /// Token allowance the bridge contract needs before the call.
    #[serde(default, deserialize_with = "optional_quantity", skip_serializing_if = "Option::is_none")]
    pub approve_amount: Option<Quantity>,
}

impl BridgeTxData {
    /// Whether the fee fields call for a type-2 transaction.
    pub fn is_eip1559(&self) -> bool {
        self.max_fee_per_gas.is_some() || self.max_priority_fee_per_gas.is_some()
    }
}

/// Signs bridge transactions with a session's source key and broadcasts them.
#[async_trait]
pub trait BridgeTxSubmitter: Send + Sync {
    /// Raises the `token` allowance when `tx.approve_amount` asks for it,
    /// then sends the bridge call and waits for its receipt. Returns the
    /// transaction hash.
    async fn submit(&self, signer: &KeyPair, token: &str, tx: &BridgeTxData) -> Result<String>;
}
