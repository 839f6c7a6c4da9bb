pub mod inventory;
pub mod pre_order;

pub use inventory::*;
pub use pre_order::*;
