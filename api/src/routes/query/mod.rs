pub mod query_route;
pub mod usage_route;
