pub mod assumptions;
pub mod engine;
pub mod result;
pub mod validation;


pub use assumptions::*;
pub use engine::*;
pub use result::*;
pub use validation::*;
