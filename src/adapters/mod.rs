// Adapters layer: concrete implementations of the domain ports (http backend, local files, in-memory).

pub mod http;
pub mod identity;
pub mod local;
pub mod memory;
pub mod object_store;
pub mod rest;

pub use http::BackendClient;
pub use identity::HttpIdentityProvider;
pub use local::LocalStorage;
pub use object_store::HttpObjectStore;
pub use rest::RestListingStore;
