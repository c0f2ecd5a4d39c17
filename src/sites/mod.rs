//! Site policies: per-site classification rules
//!
//! This module defines the classification capability set (`SitePolicy`), the
//! concrete per-outlet rules (`NewsSitePolicy`), and the registry that turns
//! configured site ids into policies at startup.

mod outlets;
mod policy;
mod registry;

pub use outlets::{NewsSitePolicy, Outlet};
pub use policy::SitePolicy;
pub use registry::SiteRegistry;
