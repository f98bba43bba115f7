pub mod export;
pub mod outputs;
pub mod preview;
pub mod validate;
