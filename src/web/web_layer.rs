// Web layer - the poll page and its JSON API.

#[path = "routes.rs"]
pub mod routes;
