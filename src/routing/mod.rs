// src/routing/mod.rs
pub mod registry;
pub mod router;

pub use registry::{ClientSettings, NodeRegistry, RoutePool, RoutingTable};
pub use router::RequestRouter;
