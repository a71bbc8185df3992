// View layer: terminal rendering, route guarding and local list state.

pub mod listings;
pub mod render;
pub mod routes;

pub use listings::{without, ListingsView};
pub use render::{render_card, render_detail, render_listings, OutputFormat};
pub use routes::{guard, Navigation, Route};
