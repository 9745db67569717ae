//! Gateway collaborators: the route table view and the profile flags.

mod client;
mod error;
mod route_view;

pub use client::{GatewayRoutesClient, HttpGatewayClient, ProfileClient};
pub use error::GatewayError;
pub use route_view::{GatewayRouteView, RouteTableSnapshot};
