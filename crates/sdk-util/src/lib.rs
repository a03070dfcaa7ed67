pub mod batch;
pub mod error;
pub mod types;
pub mod uri;
pub mod xml;

pub use batch::*;
pub use error::*;
pub use types::*;
pub use uri::*;
