pub mod devnet;
pub mod rpc;
pub mod store;
pub mod wallet;
