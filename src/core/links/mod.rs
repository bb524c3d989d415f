pub mod link_discovery;
pub mod link_resolver;

pub use link_discovery::discover_link;
pub use link_resolver::resolve;
