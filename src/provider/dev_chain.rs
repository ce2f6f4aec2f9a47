#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

//! In-process development chain.
//!
//! Plays both the wallet and the deployed social contract so sessions can
//! run without a browser or a node. Each network has its own deployment
//! with its own storage. Clones share one chain state.

use super::{CallRequest, PortFuture, Provider, ProviderError, ProviderEvent, TransactionRequest};
use crate::social::{methods, FeeSchedule};
use crate::types::{Address, NetworkId, Post, PostId, Profile, TxHash, Wei};
use chrono::Utc;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

const DEFAULT_ACCOUNT_COUNT: u8 = 3;
const DEFAULT_BALANCE_UNITS: u128 = 100 * 1_000_000_000_000_000_000;

/// Deterministic address of the `index`-th funded development account.
#[must_use]
pub fn dev_account(index: u8) -> Address {
    derive_address(&format!("chainpost-dev-account-{index}"))
}

fn derive_address(seed: &str) -> Address {
    let digest = Sha256::digest(seed.as_bytes());
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest[..20]);
    Address::from_bytes(bytes)
}

/// Storage of one deployed contract instance.
#[derive(Debug, Default)]
struct ContractStorage {
    balance: Wei,
    profiles: HashMap<Address, Profile>,
    posts: Vec<Post>,
}

#[derive(Debug)]
struct ChainState {
    network_id: NetworkId,
    network_query_fails: bool,
    approve_accounts: bool,
    authorized: bool,
    reject_transactions: bool,
    accounts: Vec<Address>,
    balances: HashMap<Address, Wei>,
    contracts: HashMap<Address, ContractStorage>,
    nonce: u64,
}

impl ContractStorage {
    fn post(&self, id: PostId) -> Option<&Post> {
        usize::try_from(id.value())
            .ok()
            .and_then(|index| index.checked_sub(1))
            .and_then(|index| self.posts.get(index))
    }

    fn post_mut(&mut self, id: PostId) -> Option<&mut Post> {
        usize::try_from(id.value())
            .ok()
            .and_then(|index| index.checked_sub(1))
            .and_then(|index| self.posts.get_mut(index))
    }
}

#[derive(Debug, Clone)]
pub struct DevChainBuilder {
    network_id: NetworkId,
    deployments: HashMap<NetworkId, Address>,
    accounts: Vec<(Address, Wei)>,
    prices: FeeSchedule,
    approve_accounts: bool,
    requires_authorization: bool,
}

impl DevChainBuilder {
    /// Deploys the contract at `address` on the starting network.
    #[must_use]
    pub fn contract(self, address: Address) -> Self {
        let network_id = self.network_id;
        self.deploy(network_id, address)
    }

    /// Deploys another contract instance, reachable once the chain is
    /// switched to `network_id`.
    #[must_use]
    pub fn deploy(mut self, network_id: NetworkId, address: Address) -> Self {
        self.deployments.insert(network_id, address);
        self
    }

    /// Replaces the default funded accounts. The first account is active.
    #[must_use]
    pub fn accounts(mut self, accounts: Vec<(Address, Wei)>) -> Self {
        self.accounts = accounts;
        self
    }

    /// Prices the contract itself charges, independent of what clients pay.
    #[must_use]
    pub const fn prices(mut self, prices: FeeSchedule) -> Self {
        self.prices = prices;
        self
    }

    #[must_use]
    pub const fn approve_accounts(mut self, approve: bool) -> Self {
        self.approve_accounts = approve;
        self
    }

    /// Legacy providers hand out accounts without an access request.
    #[must_use]
    pub const fn legacy(mut self) -> Self {
        self.requires_authorization = false;
        self
    }

    #[must_use]
    pub fn build(mut self) -> DevChain {
        let contract = *self
            .deployments
            .entry(self.network_id)
            .or_insert_with(|| derive_address("chainpost-dev-contract"));
        let contracts = self
            .deployments
            .values()
            .map(|address| (*address, ContractStorage::default()))
            .collect();
        let state = ChainState {
            network_id: self.network_id,
            network_query_fails: false,
            approve_accounts: self.approve_accounts,
            authorized: !self.requires_authorization,
            reject_transactions: false,
            accounts: self.accounts.iter().map(|(address, _)| *address).collect(),
            balances: self.accounts.into_iter().collect(),
            contracts,
            nonce: 0,
        };

        DevChain {
            contract,
            deployments: Arc::new(self.deployments),
            prices: self.prices,
            state: Arc::new(Mutex::new(state)),
            requests: Arc::new(AtomicU64::new(0)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DevChain {
    contract: Address,
    deployments: Arc<HashMap<NetworkId, Address>>,
    prices: FeeSchedule,
    state: Arc<Mutex<ChainState>>,
    requests: Arc<AtomicU64>,
}

impl DevChain {
    #[must_use]
    pub fn builder(network_id: NetworkId) -> DevChainBuilder {
        DevChainBuilder {
            network_id,
            deployments: HashMap::new(),
            accounts: (0..DEFAULT_ACCOUNT_COUNT)
                .map(|index| (dev_account(index), Wei::new(DEFAULT_BALANCE_UNITS)))
                .collect(),
            prices: FeeSchedule::default(),
            approve_accounts: true,
            requires_authorization: true,
        }
    }

    /// Contract address on the network the chain was built for.
    #[must_use]
    pub const fn contract(&self) -> Address {
        self.contract
    }

    #[must_use]
    pub fn deployment(&self, network_id: NetworkId) -> Option<Address> {
        self.deployments.get(&network_id).copied()
    }

    /// Number of provider requests served so far.
    #[must_use]
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }

    pub async fn set_network_id(&self, network_id: NetworkId) -> ProviderEvent {
        self.state.lock().await.network_id = network_id;
        ProviderEvent::ChainChanged { network_id }
    }

    /// Makes `address` the active account, if the chain knows it.
    pub async fn select_account(&self, address: Address) -> Option<ProviderEvent> {
        let mut state = self.state.lock().await;
        let position = state.accounts.iter().position(|a| *a == address)?;
        let selected = state.accounts.remove(position);
        state.accounts.insert(0, selected);
        Some(ProviderEvent::AccountsChanged {
            accounts: state.accounts.clone(),
        })
    }

    pub async fn set_approve_accounts(&self, approve: bool) {
        self.state.lock().await.approve_accounts = approve;
    }

    pub async fn set_reject_transactions(&self, reject: bool) {
        self.state.lock().await.reject_transactions = reject;
    }

    pub async fn set_network_query_failure(&self, fails: bool) {
        self.state.lock().await.network_query_fails = fails;
    }

    pub async fn balance_of(&self, address: Address) -> Wei {
        let state = self.state.lock().await;
        state
            .contracts
            .get(&address)
            .map(|storage| storage.balance)
            .or_else(|| state.balances.get(&address).copied())
            .unwrap_or(Wei::ZERO)
    }

    /// Posts stored by the contract on the current network.
    pub async fn post_count(&self) -> usize {
        let state = self.state.lock().await;
        self.deployments
            .get(&state.network_id)
            .and_then(|address| state.contracts.get(address))
            .map_or(0, |storage| storage.posts.len())
    }

    fn count_request(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }

    /// Only the deployment of the current network has code.
    fn ensure_deployed(&self, state: &ChainState, to: Address) -> Result<(), ProviderError> {
        match self.deployments.get(&state.network_id) {
            Some(address) if *address == to => Ok(()),
            _ => Err(ProviderError::Rpc(format!("no contract code at {to}"))),
        }
    }

    fn read(&self, state: &ChainState, request: &CallRequest) -> Result<Value, ProviderError> {
        self.ensure_deployed(state, request.to)?;
        let storage = state
            .contracts
            .get(&request.to)
            .ok_or_else(|| ProviderError::Rpc(format!("no contract code at {}", request.to)))?;

        match request.method.as_str() {
            methods::GET_POST => {
                let id = arg_post_id(&request.args, 0)?;
                let post = storage.post(id).cloned().unwrap_or_else(Post::empty);
                serde_json::to_value(post).map_err(|e| ProviderError::Rpc(e.to_string()))
            }
            methods::PROFILES => {
                let owner = arg_address(&request.args, 0)?;
                let profile = storage.profiles.get(&owner).cloned().unwrap_or_default();
                serde_json::to_value(profile).map_err(|e| ProviderError::Rpc(e.to_string()))
            }
            other => Err(ProviderError::Reverted(format!(
                "function '{other}' was not recognized"
            ))),
        }
    }

    /// Applies a transaction to contract state. Every check runs before the
    /// first mutation so a revert leaves state untouched.
    fn execute(
        &self,
        storage: &mut ContractStorage,
        request: &TransactionRequest,
    ) -> Result<(), ProviderError> {
        let required = |price: Wei, what: &str| {
            if request.value < price {
                Err(ProviderError::Reverted(format!(
                    "Insufficient payment to {what}: need {price}, got {}",
                    request.value
                )))
            } else {
                Ok(())
            }
        };

        match request.method.as_str() {
            methods::UPDATE_USER_PROFILE => {
                let username = arg_str(&request.args, 0)?;
                let bio = arg_str(&request.args, 1)?;
                storage.profiles.insert(
                    request.from,
                    Profile {
                        username: username.to_string(),
                        bio: bio.to_string(),
                    },
                );
            }
            methods::CREATE_POST => {
                let content = arg_str(&request.args, 0)?;
                required(self.prices.create_post, "create post")?;
                storage.posts.push(Post {
                    creator: request.from,
                    content: content.to_string(),
                    created_at: Utc::now(),
                    like_count: 0,
                    comment_count: 0,
                    comments: Vec::new(),
                });
            }
            methods::LIKE_POST => {
                let id = arg_post_id(&request.args, 0)?;
                required(self.prices.like_post, "like post")?;
                let post = storage
                    .post_mut(id)
                    .ok_or_else(|| ProviderError::Reverted("Post does not exist".to_string()))?;
                post.like_count = post.like_count.saturating_add(1);
            }
            methods::COMMENT_ON_POST => {
                let id = arg_post_id(&request.args, 0)?;
                let content = arg_str(&request.args, 1)?;
                required(self.prices.comment_on_post, "comment")?;
                let post = storage
                    .post_mut(id)
                    .ok_or_else(|| ProviderError::Reverted("Post does not exist".to_string()))?;
                post.comments.push(content.to_string());
                post.comment_count = post.comment_count.saturating_add(1);
            }
            other => {
                return Err(ProviderError::Reverted(format!(
                    "function '{other}' was not recognized"
                )))
            }
        }
        Ok(())
    }
}

impl Provider for DevChain {
    fn request_accounts(&self) -> PortFuture<'_, Vec<Address>> {
        Box::pin(async move {
            self.count_request();
            let mut state = self.state.lock().await;
            if !state.approve_accounts {
                return Err(ProviderError::UserRejected);
            }
            state.authorized = true;
            Ok(state.accounts.clone())
        })
    }

    fn accounts(&self) -> PortFuture<'_, Vec<Address>> {
        Box::pin(async move {
            self.count_request();
            let state = self.state.lock().await;
            Ok(if state.authorized {
                state.accounts.clone()
            } else {
                Vec::new()
            })
        })
    }

    fn network_id(&self) -> PortFuture<'_, NetworkId> {
        Box::pin(async move {
            self.count_request();
            let state = self.state.lock().await;
            if state.network_query_fails {
                return Err(ProviderError::Rpc("net_version is unavailable".to_string()));
            }
            Ok(state.network_id)
        })
    }

    fn call<'a>(&'a self, request: &'a CallRequest) -> PortFuture<'a, Value> {
        Box::pin(async move {
            self.count_request();
            let state = self.state.lock().await;
            self.read(&state, request)
        })
    }

    fn send_transaction<'a>(&'a self, request: &'a TransactionRequest) -> PortFuture<'a, TxHash> {
        Box::pin(async move {
            self.count_request();
            let mut state = self.state.lock().await;

            if !state.authorized || !state.accounts.contains(&request.from) {
                return Err(ProviderError::Rpc(format!(
                    "account {} is not authorized",
                    request.from
                )));
            }
            if state.reject_transactions {
                return Err(ProviderError::UserRejected);
            }
            self.ensure_deployed(&state, request.to)?;

            let balance = state.balances.get(&request.from).copied().unwrap_or(Wei::ZERO);
            let remaining = balance
                .checked_sub(request.value)
                .ok_or(ProviderError::InsufficientFunds)?;

            let storage = state
                .contracts
                .get_mut(&request.to)
                .ok_or_else(|| ProviderError::Rpc(format!("no contract code at {}", request.to)))?;
            self.execute(storage, request)?;
            storage.balance = storage.balance.saturating_add(request.value);

            state.balances.insert(request.from, remaining);
            state.nonce = state.nonce.saturating_add(1);
            let hash = transaction_hash(request, state.nonce);
            debug!("Dev chain accepted {} from {} as {}", request.method, request.from, hash);
            Ok(hash)
        })
    }
}

fn transaction_hash(request: &TransactionRequest, nonce: u64) -> TxHash {
    let mut hasher = Sha256::new();
    hasher.update(request.from.as_slice());
    hasher.update(nonce.to_be_bytes());
    hasher.update(request.method.as_bytes());
    hasher.update(Value::Array(request.args.clone()).to_string().as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    TxHash::from_bytes(bytes)
}

fn arg(args: &[Value], index: usize) -> Result<&Value, ProviderError> {
    args.get(index)
        .ok_or_else(|| ProviderError::Reverted(format!("missing argument #{index}")))
}

fn arg_str(args: &[Value], index: usize) -> Result<&str, ProviderError> {
    arg(args, index)?
        .as_str()
        .ok_or_else(|| ProviderError::Reverted(format!("argument #{index} is not a string")))
}

fn arg_address(args: &[Value], index: usize) -> Result<Address, ProviderError> {
    arg_str(args, index)?
        .parse::<Address>()
        .map_err(ProviderError::Reverted)
}

fn arg_post_id(args: &[Value], index: usize) -> Result<PostId, ProviderError> {
    let value = arg(args, index)?;
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.parse::<u64>().ok()))
        .map(PostId::new)
        .ok_or_else(|| ProviderError::Reverted(format!("argument #{index} is not a post id")))
}
