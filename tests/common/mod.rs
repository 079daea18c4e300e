//! Shared utilities for integration testing.
#![allow(dead_code)]

use alloy::primitives::{keccak256, Address, Bytes, TxHash, U256};
use alloy::signers::{local::PrivateKeySigner, SignerSync};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use payment_gateway::blockchain::{
    BlockchainError, FeePriceSource, LedgerRecord, RailClient, TransferRecord, TransferSource,
};
use payment_gateway::blockchain::types::BlockchainResult;
use payment_gateway::config::{GatewayConfig, TokenConfig};
use payment_gateway::Gateway;

pub const USDC: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";
pub const POOL: &str = "0x00000000000000000000000000000000000000aa";
pub const PAYER: &str = "0x00000000000000000000000000000000000000f0";

/// Well-known Anvil account 0. Address 0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266.
pub const ANVIL_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub fn address(raw: &str) -> Address {
    Address::from_str(raw).unwrap()
}

/// Programmable rail: node state is plain data, every call is counted.
pub struct MockRail {
    pub nonce: AtomicU64,
    pub fee_price: Mutex<Option<u128>>,
    pub chain_height: AtomicU64,
    pub fail_lookups: AtomicBool,
    pub fail_height: AtomicBool,
    pub records: Mutex<HashMap<TxHash, LedgerRecord>>,
    /// Submissions whose transaction hash is listed are rejected.
    pub reject: Mutex<HashSet<TxHash>>,
    pub submitted: Mutex<Vec<Bytes>>,
    pub delay: Duration,

    pub nonce_calls: AtomicUsize,
    pub fee_calls: AtomicUsize,
    pub lookup_calls: AtomicUsize,
    pub submit_calls: AtomicUsize,
}

impl MockRail {
    pub fn new() -> Arc<Self> {
        Self::with_delay(Duration::ZERO)
    }

    /// Every call sleeps for `delay` first, to widen race windows.
    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            nonce: AtomicU64::new(0),
            fee_price: Mutex::new(Some(10)),
            chain_height: AtomicU64::new(1_000),
            fail_lookups: AtomicBool::new(false),
            fail_height: AtomicBool::new(false),
            records: Mutex::new(HashMap::new()),
            reject: Mutex::new(HashSet::new()),
            submitted: Mutex::new(Vec::new()),
            delay,
            nonce_calls: AtomicUsize::new(0),
            fee_calls: AtomicUsize::new(0),
            lookup_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
        })
    }

    pub fn set_fee_price(&self, price: Option<u128>) {
        *self.fee_price.lock().unwrap() = price;
    }

    pub fn insert_record(&self, reference: TxHash, record: LedgerRecord) {
        self.records.lock().unwrap().insert(reference, record);
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl RailClient for MockRail {
    async fn get_nonce(&self, _address: Address) -> BlockchainResult<u64> {
        self.nonce_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        Ok(self.nonce.load(Ordering::SeqCst))
    }

    async fn get_transaction_by_reference(&self, reference: TxHash) -> BlockchainResult<Option<LedgerRecord>> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(BlockchainError::Timeout(5));
        }
        Ok(self.records.lock().unwrap().get(&reference).cloned())
    }

    async fn get_chain_height(&self) -> BlockchainResult<u64> {
        if self.fail_height.load(Ordering::SeqCst) {
            return Err(BlockchainError::Rpc("connection refused".into()));
        }
        Ok(self.chain_height.load(Ordering::SeqCst))
    }

    async fn submit_raw_transaction(&self, raw: Bytes) -> BlockchainResult<TxHash> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        let reference = keccak256(&raw);
        self.submitted.lock().unwrap().push(raw);
        if self.reject.lock().unwrap().contains(&reference) {
            return Err(BlockchainError::Submission("replacement transaction underpriced".into()));
        }
        Ok(reference)
    }
}

#[async_trait]
impl FeePriceSource for MockRail {
    async fn get_current_fee_price(&self) -> BlockchainResult<u128> {
        self.fee_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        let price = *self.fee_price.lock().unwrap();
        price.ok_or_else(|| BlockchainError::Rpc("eth_gasPrice failed".into()))
    }
}

/// Programmable external transfer index.
#[derive(Default)]
pub struct MockTransferSource {
    pub records: Mutex<HashMap<String, TransferRecord>>,
    pub fail: AtomicBool,
    pub calls: AtomicUsize,
}

#[async_trait]
impl TransferSource for MockTransferSource {
    async fn lookup_transfer(&self, _symbol: &str, reference: &str) -> BlockchainResult<Option<TransferRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(BlockchainError::DataSource("index unavailable".into()));
        }
        Ok(self.records.lock().unwrap().get(reference).cloned())
    }
}

/// Native ETH plus USDC, chain 1, default policies.
pub fn config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.tokens.supported.push(TokenConfig {
        symbol: "USDC".into(),
        contract_address: Some(USDC.into()),
        decimals: 6,
    });
    config
}

pub fn gateway(rail: Arc<MockRail>) -> Gateway {
    Gateway::new(&config(), rail.clone(), rail, None).unwrap()
}

pub fn gateway_with_config(config: &GatewayConfig, rail: Arc<MockRail>) -> Gateway {
    Gateway::new(config, rail.clone(), rail, None).unwrap()
}

pub fn gateway_with_index(rail: Arc<MockRail>, index: Arc<MockTransferSource>) -> Gateway {
    Gateway::new(&config(), rail.clone(), rail, Some(index as Arc<dyn TransferSource>)).unwrap()
}

pub fn signer() -> PrivateKeySigner {
    ANVIL_KEY.parse().unwrap()
}

/// Sign each hex signing hash with the Anvil key, as an external signer would.
pub fn sign_all(signing_hashes: &[String]) -> Vec<String> {
    let signer = signer();
    signing_hashes
        .iter()
        .map(|hash| {
            let digest = alloy::primitives::B256::from_str(hash).unwrap();
            alloy::hex::encode(signer.sign_hash_sync(&digest).unwrap().as_bytes())
        })
        .collect()
}

pub fn wei(amount: u64) -> U256 {
    U256::from(amount)
}

/// Start a programmable HTTP backend on an ephemeral port.
///
/// `f` receives the request path and returns (status, JSON body).
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 4096];
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        let request = String::from_utf8_lossy(&buf[..n]);
                        let path = request
                            .lines()
                            .next()
                            .and_then(|line| line.split_whitespace().nth(1))
                            .unwrap_or("/")
                            .to_string();

                        let (status, body) = f(path).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}
