pub mod handlers;
pub mod models;
mod store;

pub use models::ToggleOutcome;
pub use store::FavouritesStore;
