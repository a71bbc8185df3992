pub mod auth;
pub mod filter;
pub mod repository;
pub mod service;
pub mod session;
pub mod uploader;

pub use crate::domain::model::{Listing, ListingDraft, ListingId, ListingPatch, ListingQuery, Session};
pub use crate::domain::ports::{ConfigProvider, IdentityProvider, ListingStore, ObjectStore, Storage};
pub use crate::utils::error::Result;
