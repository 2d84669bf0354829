//! Bridge domain module.

mod client;
mod model;
mod tx;

pub use client::{BridgeClient, BridgeGateway};
pub use model::{
    BridgeRoute, BridgeTaskCreated, BridgeTaskState, BridgeTransferPayload, BridgeTransferRequest,
    BridgeTransferResponse, BridgeTransferStatus, validate_task_id,
};
pub use tx::{BridgeTxData, BridgeTxSubmitter, Quantity};
