//! Operation scripts replayed against a genesis ledger.

use std::{collections::BTreeMap, path::Path};

use alloy_primitives::{Address, Bytes, Log, U256};
use alloy_sol_types::SolCall;
use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use splittable_token::{
    abi::ISplittableToken, LedgerEvent, SplittableToken, TokenContract, TokenResult,
};
use tracing::{debug, warn};

/// A single ledger call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub(crate) enum Operation {
    Transfer {
        from: Address,
        to: Address,
        amount: U256,
    },
    Approve {
        owner: Address,
        spender: Address,
        amount: U256,
    },
    TransferFrom {
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    },
    IncreaseSupply {
        caller: Address,
    },
    Mint {
        to: Address,
        amount: U256,
    },
    Burn {
        from: Address,
        amount: U256,
    },
    BurnFrom {
        spender: Address,
        from: Address,
        amount: U256,
    },
    TransferOwnership {
        caller: Address,
        new_owner: Address,
    },
}

impl Operation {
    const fn name(&self) -> &'static str {
        match self {
            Self::Transfer { .. } => "transfer",
            Self::Approve { .. } => "approve",
            Self::TransferFrom { .. } => "transfer_from",
            Self::IncreaseSupply { .. } => "increase_supply",
            Self::Mint { .. } => "mint",
            Self::Burn { .. } => "burn",
            Self::BurnFrom { .. } => "burn_from",
            Self::TransferOwnership { .. } => "transfer_ownership",
        }
    }

    /// Runs the call and returns the events it emitted.
    fn apply(&self, token: &mut SplittableToken) -> TokenResult<Vec<LedgerEvent>> {
        let events = match *self {
            Self::Transfer { from, to, amount } => token.transfer(from, to, amount)?.events,
            Self::Approve {
                owner,
                spender,
                amount,
            } => token.approve(owner, spender, amount)?.events,
            Self::TransferFrom {
                spender,
                from,
                to,
                amount,
            } => token.transfer_from(spender, from, to, amount)?.events,
            Self::IncreaseSupply { caller } => token.increase_supply(caller)?.events,
            Self::Mint { to, amount } => token.mint(to, amount)?.events,
            Self::Burn { from, amount } => token.burn(from, amount)?.events,
            Self::BurnFrom {
                spender,
                from,
                amount,
            } => token.burn_from(spender, from, amount)?.events,
            Self::TransferOwnership { caller, new_owner } => {
                token.transfer_ownership(caller, new_owner)?.events
            }
        };
        Ok(events)
    }

    /// Caller and calldata for the same call through [`ISplittableToken`].
    ///
    /// Mint and burn have no selector on the token interface.
    fn calldata(&self) -> Option<(Address, Vec<u8>)> {
        let call = match *self {
            Self::Transfer { from, to, amount } => {
                (from, ISplittableToken::transferCall { to, amount }.abi_encode())
            }
            Self::Approve {
                owner,
                spender,
                amount,
            } => (owner, ISplittableToken::approveCall { spender, amount }.abi_encode()),
            Self::TransferFrom {
                spender,
                from,
                to,
                amount,
            } => (
                spender,
                ISplittableToken::transferFromCall { from, to, amount }.abi_encode(),
            ),
            Self::IncreaseSupply { caller } => {
                (caller, ISplittableToken::increaseSupplyCall {}.abi_encode())
            }
            Self::TransferOwnership { caller, new_owner } => (
                caller,
                ISplittableToken::transferOwnershipCall { newOwner: new_owner }.abi_encode(),
            ),
            Self::Mint { .. } | Self::Burn { .. } | Self::BurnFrom { .. } => return None,
        };
        Some(call)
    }
}

/// Ordered list of operations.
///
/// TOML scripts use `[[operations]]` tables, JSON scripts an `operations` array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Script {
    #[serde(default)]
    pub(crate) operations: Vec<Operation>,
}

impl Script {
    pub(crate) fn from_path(path: &Path) -> eyre::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read script {}", path.display()))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let script = if is_json {
            serde_json::from_str(&raw).wrap_err("invalid JSON script")?
        } else {
            toml::from_str(&raw).wrap_err("invalid TOML script")?
        };
        Ok(script)
    }
}

/// Result of one replayed operation.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct Step {
    pub(crate) index: usize,
    pub(crate) op: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
    pub(crate) events: Vec<LedgerEvent>,
}

/// Point-in-time view of a ledger.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Summary {
    pub(crate) name: String,
    pub(crate) symbol: String,
    pub(crate) decimals: u8,
    pub(crate) owner: Address,
    pub(crate) exponent: u32,
    pub(crate) total_supply: U256,
    /// Effective balances of every stored account.
    pub(crate) balances: BTreeMap<Address, U256>,
}

impl Summary {
    pub(crate) fn of(token: &SplittableToken) -> Self {
        Self {
            name: token.name().to_string(),
            symbol: token.symbol().to_string(),
            decimals: token.decimals(),
            owner: token.owner(),
            exponent: token.exponent(),
            total_supply: token.total_supply(),
            balances: token
                .holders()
                .map(|(account, _)| (*account, token.balance_of(*account)))
                .filter(|(_, balance)| !balance.is_zero())
                .collect(),
        }
    }
}

/// Replay output.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct Report {
    pub(crate) steps: Vec<Step>,
    pub(crate) summary: Summary,
}

/// Applies `script` in order. A failed operation commits nothing; with
/// `fail_fast` it also stops the replay.
pub(crate) fn replay(token: &mut SplittableToken, script: &Script, fail_fast: bool) -> Report {
    let mut steps = Vec::with_capacity(script.operations.len());

    for (index, operation) in script.operations.iter().enumerate() {
        match operation.apply(token) {
            Ok(events) => {
                debug!(target: "splittable", index, op = operation.name(), events = events.len(), "applied");
                steps.push(Step {
                    index,
                    op: operation.name(),
                    error: None,
                    events,
                });
            }
            Err(err) => {
                warn!(target: "splittable", index, op = operation.name(), %err, "operation reverted");
                steps.push(Step {
                    index,
                    op: operation.name(),
                    error: Some(err.to_string()),
                    events: Vec::new(),
                });
                if fail_fast {
                    break;
                }
            }
        }
    }

    Report {
        steps,
        summary: Summary::of(token),
    }
}

/// Result of one operation sent through the contract interface.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct AbiStep {
    pub(crate) index: usize,
    pub(crate) op: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
    pub(crate) output: Bytes,
    pub(crate) logs: Vec<Log>,
}

/// Contract-interface replay output.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct AbiReport {
    pub(crate) contract: Address,
    pub(crate) steps: Vec<AbiStep>,
    pub(crate) summary: Summary,
}

/// Like [`replay`], but every operation is ABI-encoded and executed through
/// `contract`, so steps carry return data and EVM logs.
pub(crate) fn replay_abi(contract: &TokenContract, script: &Script, fail_fast: bool) -> AbiReport {
    let mut steps = Vec::with_capacity(script.operations.len());

    for (index, operation) in script.operations.iter().enumerate() {
        let result = match operation.calldata() {
            Some((caller, data)) => contract.call(caller, &data).map_err(|err| err.to_string()),
            None => Err(format!("{} is not part of the token interface", operation.name())),
        };
        match result {
            Ok(out) => {
                debug!(target: "splittable", index, op = operation.name(), logs = out.logs.len(), "call succeeded");
                steps.push(AbiStep {
                    index,
                    op: operation.name(),
                    error: None,
                    output: out.output,
                    logs: out.logs,
                });
            }
            Err(err) => {
                warn!(target: "splittable", index, op = operation.name(), %err, "call reverted");
                steps.push(AbiStep {
                    index,
                    op: operation.name(),
                    error: Some(err),
                    output: Bytes::new(),
                    logs: Vec::new(),
                });
                if fail_fast {
                    break;
                }
            }
        }
    }

    AbiReport {
        contract: contract.address(),
        steps,
        summary: contract.token().read(Summary::of),
    }
}
