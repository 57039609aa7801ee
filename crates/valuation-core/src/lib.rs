pub mod error;
pub mod format;
pub mod ticker;
pub mod traits;
pub mod types;

pub use error::*;
pub use ticker::Ticker;
pub use traits::*;
pub use types::*;
