pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;
pub mod view;

#[cfg(feature = "cli")]
pub use config::{Cli, Command};

pub use adapters::LocalStorage;
pub use app::App;
pub use config::AppConfig;
pub use crate::core::{
    auth::AuthService,
    filter::{filter, Criteria},
    repository::ListingRepository,
    service::ListingService,
    session::{AuthEvent, SessionStore, Subscription},
    uploader::ImageUploader,
};
pub use domain::model::{
    Account, AccountId, ImageFile, Listing, ListingDraft, ListingId, ListingPatch, ListingQuery,
    PropertyType, Session, TenantPreference,
};
pub use utils::error::{Result, RoomError};
