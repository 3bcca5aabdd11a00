pub mod config;
pub mod inner;
pub mod session;

pub use config::*;
pub use inner::*;
pub use session::*;
