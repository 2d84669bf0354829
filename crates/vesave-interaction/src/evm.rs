//! Source-chain signer: approves the bridge's token allowance and sends the
//! bridge call from a session's source key.

use async_trait::async_trait;
use ethers::abi::Token;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{
    Address, Bytes, Eip1559TransactionRequest, TransactionReceipt, TransactionRequest, U64, U256,
};
use vesave_core::bridge::{BridgeTxData, BridgeTxSubmitter, Quantity};
use vesave_core::session::KeyPair;
use vesave_core::{Result, VeSaveError};

type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Signs with session keys over a JSON-RPC endpoint of the source chain.
#[derive(Debug, Clone)]
pub struct EvmBridgeSubmitter {
    provider: Provider<Http>,
}

impl EvmBridgeSubmitter {
    pub fn new(rpc_url: &str) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url).map_err(|e| {
            VeSaveError::config(format!("Invalid source_rpc_url '{}': {}", rpc_url, e))
        })?;
        Ok(Self { provider })
    }

    async fn client_for(&self, signer: &KeyPair, chain_id: Option<Quantity>) -> Result<SignerClient> {
        let wallet = signer
            .private_key
            .expose()
            .parse::<LocalWallet>()
            .map_err(|_| VeSaveError::internal("Session source key is not a valid secp256k1 key."))?;
        let chain_id = match chain_id {
            Some(id) => id.as_u64()?,
            None => self
                .provider
                .get_chainid()
                .await
                .map_err(|e| rpc_error("Chain id lookup", e))?
                .as_u64(),
        };
        Ok(SignerMiddleware::new(
            self.provider.clone(),
            wallet.with_chain_id(chain_id),
        ))
    }
}

#[async_trait]
impl BridgeTxSubmitter for EvmBridgeSubmitter {
    async fn submit(&self, signer: &KeyPair, token: &str, tx: &BridgeTxData) -> Result<String> {
        let client = self.client_for(signer, tx.chain_id).await?;
        let bridge_tx = bridge_transaction(tx)?;
        let spender = parse_address(&tx.contract_address)?;

        if let Some(amount) = tx.approve_amount {
            let token = parse_address(token)?;
            let needed = U256::from(amount.value());
            let current = allowance(&client, token, client.address(), spender).await?;
            if current < needed {
                tracing::info!(
                    "[SourceChain] Allowance {} below {}, approving {:?}",
                    current,
                    needed,
                    spender
                );
                let approve: TypedTransaction = TransactionRequest::new()
                    .to(token)
                    .data(erc20_calldata(
                        "approve(address,uint256)",
                        &[Token::Address(spender), Token::Uint(needed)],
                    ))
                    .into();
                send_and_wait(&client, approve, "Approve").await?;
            }
        }

        let receipt = send_and_wait(&client, bridge_tx, "Bridge").await?;
        Ok(format!("{:?}", receipt.transaction_hash))
    }
}

fn rpc_error(action: &str, err: impl std::fmt::Display) -> VeSaveError {
    VeSaveError::upstream(format!("{} failed on the source chain: {}", action, err))
}

fn parse_address(raw: &str) -> Result<Address> {
    raw.trim()
        .parse::<Address>()
        .map_err(|_| VeSaveError::invalid_input(format!("Invalid EVM address '{}'.", raw)))
}

fn decode_hex(raw: &str) -> Result<Vec<u8>> {
    let raw = raw.trim();
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    hex::decode(digits)
        .map_err(|_| VeSaveError::invalid_input("Bridge contract data is not valid hex."))
}

/// Selector plus ABI-encoded arguments.
fn erc20_calldata(signature: &str, args: &[Token]) -> Bytes {
    let mut calldata = ethers::utils::keccak256(signature)[..4].to_vec();
    calldata.extend_from_slice(&ethers::abi::encode(args));
    Bytes::from(calldata)
}

fn bridge_transaction(tx: &BridgeTxData) -> Result<TypedTransaction> {
    let to = parse_address(&tx.contract_address)?;
    let data = Bytes::from(decode_hex(&tx.contract_data)?);
    let value = U256::from(tx.value.map_or(0, Quantity::value));
    let wide = |q: Quantity| U256::from(q.value());

    let mut typed: TypedTransaction = if tx.is_eip1559() {
        let mut request = Eip1559TransactionRequest::new().to(to).data(data).value(value);
        if let Some(fee) = tx.max_fee_per_gas {
            request = request.max_fee_per_gas(wide(fee));
        }
        if let Some(tip) = tx.max_priority_fee_per_gas {
            request = request.max_priority_fee_per_gas(wide(tip));
        }
        request.into()
    } else {
        let mut request = TransactionRequest::new().to(to).data(data).value(value);
        if let Some(price) = tx.gas_price {
            request = request.gas_price(wide(price));
        }
        request.into()
    };

    if let Some(gas) = tx.gas {
        typed.set_gas(wide(gas));
    }
    if let Some(nonce) = tx.nonce {
        typed.set_nonce(wide(nonce));
    }
    if let Some(chain_id) = tx.chain_id {
        typed.set_chain_id(chain_id.as_u64()?);
    }
    Ok(typed)
}

async fn allowance(
    client: &SignerClient,
    token: Address,
    owner: Address,
    spender: Address,
) -> Result<U256> {
    let call: TypedTransaction = TransactionRequest::new()
        .to(token)
        .data(erc20_calldata(
            "allowance(address,address)",
            &[Token::Address(owner), Token::Address(spender)],
        ))
        .into();
    let raw = client
        .call(&call, None)
        .await
        .map_err(|e| rpc_error("Allowance check", e))?;
    if raw.len() < 32 {
        return Err(VeSaveError::upstream(format!(
            "Allowance check returned {} bytes.",
            raw.len()
        )));
    }
    Ok(U256::from_big_endian(&raw[..32]))
}

async fn send_and_wait(
    client: &SignerClient,
    tx: TypedTransaction,
    label: &str,
) -> Result<TransactionReceipt> {
    let pending = client
        .send_transaction(tx, None)
        .await
        .map_err(|e| rpc_error(label, e))?;
    tracing::info!("[SourceChain] {} transaction sent: {:?}", label, pending.tx_hash());

    let receipt = pending
        .await
        .map_err(|e| rpc_error(label, e))?
        .ok_or_else(|| VeSaveError::upstream(format!("{} transaction was dropped.", label)))?;
    if receipt.status == Some(U64::zero()) {
        return Err(VeSaveError::upstream(format!(
            "{} transaction {:?} reverted.",
            label, receipt.transaction_hash
        )));
    }
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx_data() -> BridgeTxData {
        BridgeTxData {
            contract_address: "0x00000000000000000000000000000000000000b1".into(),
            contract_data: "0xdeadbeef".into(),
            value: None,
            gas: Some(Quantity::new(250_000)),
            gas_price: None,
            max_fee_per_gas: None,
            max_priority_fee_per_gas: None,
            nonce: None,
            chain_id: None,
            approve_amount: None,
        }
    }

    #[test]
    fn erc20_calls_use_standard_selectors() {
        let owner = Address::repeat_byte(0x11);
        let allowance = erc20_calldata(
            "allowance(address,address)",
            &[Token::Address(owner), Token::Address(owner)],
        );
        assert_eq!(&allowance[..4], &[0xdd, 0x62, 0xed, 0x3e]);
        assert_eq!(allowance.len(), 4 + 64);

        let approve = erc20_calldata(
            "approve(address,uint256)",
            &[Token::Address(owner), Token::Uint(U256::from(5u64))],
        );
        assert_eq!(&approve[..4], &[0x09, 0x5e, 0xa7, 0xb3]);
        assert_eq!(approve[approve.len() - 1], 5);
    }

    #[test]
    fn legacy_fees_build_a_legacy_transaction() {
        let mut tx = tx_data();
        tx.gas_price = Some(Quantity::new(2_000_000_000));
        tx.nonce = Some(Quantity::new(3));

        let typed = bridge_transaction(&tx).unwrap();
        assert!(matches!(typed, TypedTransaction::Legacy(_)));
        assert_eq!(typed.gas(), Some(&U256::from(250_000u64)));
        assert_eq!(typed.nonce(), Some(&U256::from(3u64)));
        assert_eq!(typed.value(), Some(&U256::zero()));
        assert_eq!(
            typed.data().map(|d| d.to_vec()),
            Some(vec![0xde, 0xad, 0xbe, 0xef])
        );
    }

    #[test]
    fn fee_market_fields_build_a_type_two_transaction() {
        let mut tx = tx_data();
        tx.max_fee_per_gas = Some(Quantity::new(30_000_000_000));
        tx.chain_id = Some(Quantity::new(11_155_111));

        let typed = bridge_transaction(&tx).unwrap();
        assert!(matches!(typed, TypedTransaction::Eip1559(_)));
        assert_eq!(typed.chain_id(), Some(U64::from(11_155_111u64)));
    }

    #[test]
    fn malformed_targets_are_rejected() {
        let mut tx = tx_data();
        tx.contract_address = "0xnope".into();
        assert!(bridge_transaction(&tx).is_err());

        let mut tx = tx_data();
        tx.contract_data = "0xzz".into();
        assert!(bridge_transaction(&tx).is_err());

        assert!(EvmBridgeSubmitter::new("not a url").is_err());
    }
}
