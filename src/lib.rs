pub use rowtag_core::*;
pub use rowtag_macros::*;
