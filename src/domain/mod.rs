pub mod mapping;
pub mod routine;
pub mod sheets;
pub mod transfer;
pub mod worklist;
