pub mod api;
pub mod auth;
pub mod resource;
pub mod tenant;
