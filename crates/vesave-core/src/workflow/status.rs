//! Per-run status model for the bridge → swap → stake pipeline.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// One unit of the sequential pipeline.
///
/// Stages always execute in declaration order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Stage {
    Bridge,
    Swap,
    Stake,
}

impl Stage {
    /// Message recorded when a stage fails without a usable error message.
    pub fn default_failure_message(self) -> &'static str {
        match self {
            Stage::Bridge => "WanBridge transfer failed.",
            Stage::Swap => "USDC to VET swap failed.",
            Stage::Stake => "Stargate staking failed.",
        }
    }
}

/// Status of a single stage within the current run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StepStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

/// Which of the two session accounts a check refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum AccountSide {
    /// Deposit account on the source chain.
    #[strum(serialize = "Ethereum")]
    Source,
    /// Operating account on the destination chain.
    #[strum(serialize = "VeChain")]
    Destination,
}

/// Status of all three stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkflowStatuses {
    pub bridge: StepStatus,
    pub swap: StepStatus,
    pub stake: StepStatus,
}

impl WorkflowStatuses {
    pub fn get(&self, stage: Stage) -> StepStatus {
        match stage {
            Stage::Bridge => self.bridge,
            Stage::Swap => self.swap,
            Stage::Stake => self.stake,
        }
    }

    pub fn set(&mut self, stage: Stage, status: StepStatus) {
        match stage {
            Stage::Bridge => self.bridge = status,
            Stage::Swap => self.swap = status,
            Stage::Stake => self.stake = status,
        }
    }

    /// Number of stages currently pending. Never more than one.
    pub fn pending_count(&self) -> usize {
        [self.bridge, self.swap, self.stake]
            .iter()
            .filter(|status| **status == StepStatus::Pending)
            .count()
    }

    pub fn all_idle(&self) -> bool {
        *self == Self::default()
    }

    pub fn all_succeeded(&self) -> bool {
        [self.bridge, self.swap, self.stake]
            .iter()
            .all(|status| *status == StepStatus::Success)
    }
}
