//! Outbound interaction layer: backend HTTP clients, the upstream bridge
//! gateway, the source-chain signer, simulated clients and client-set
//! construction.

pub mod backend;
pub mod clients;
pub mod evm;
pub mod http;
pub mod simulated;
pub mod wanbridge;

pub use backend::{HttpBridgeClient, HttpStakeClient, HttpSwapClient, HttpWalletService};
pub use clients::WorkflowClients;
pub use evm::EvmBridgeSubmitter;
pub use simulated::{
    SimulatedBridgeClient, SimulatedStakeClient, SimulatedSwapClient, SimulatedWalletService,
};
pub use wanbridge::WanBridgeGateway;
