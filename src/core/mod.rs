pub mod loadable;
pub mod navigation;
pub mod session;

pub use loadable::{FetchGuard, Loadable};
pub use navigation::{Route, RouteDecision};
pub use session::{Session, SessionOptions};
pub use crate::utils::error::Result;
