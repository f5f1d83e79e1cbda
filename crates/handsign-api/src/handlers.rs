//! Request handlers.

pub mod health;
pub mod root;
pub mod signs;
pub mod upload;

pub use health::*;
pub use root::*;
pub use signs::*;
pub use upload::*;
