//! Client side of the admin dashboard: paginated collection views over the
//! store's REST backend, with optimistic status changes and deletes.

pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod transport;

pub use catalog::{find_category, load_categories};
pub use config::{load_settings, resolve_api_config, ApiConfig, Settings};
pub use controller::{
    AssumeYes, Banner, BannerKind, BulkDeleteOutcome, Confirm, MutationOutcome, MutationPhase,
    PendingBulkDelete, PendingMutation, ResourceListController, Settlement,
};
pub use error::{ControllerError, MutationKind, TransportError};
pub use filter::ItemFilter;
pub use transport::{CollectionApi, HttpCollectionApi};

/// Controller over the HTTP backend, the shape front ends normally hold.
pub type HttpListController<T> = ResourceListController<T, HttpCollectionApi>;
