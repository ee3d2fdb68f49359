pub mod configuration;
pub mod credentials;
pub mod memory;
pub mod navigation;
pub mod network;
pub mod storage;
pub mod telemetry;
pub mod token_file;
pub mod transport;

// Re-exports for convenience
pub use credentials::KeyringTokenStore;
pub use memory::MemoryTokenStore;
pub use navigation::HistoryNavigator;
pub use storage::build_token_store;
pub use token_file::FileTokenStore;
pub use transport::ReqwestTransport;
