// Presentation layer - HTTP surface for map front-ends
pub mod app_state;
pub mod handlers;
