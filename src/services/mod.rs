pub mod diagnostics;
pub mod expiry_scheduler;
pub mod export;
pub mod mirror;
pub mod portal;
pub mod sheets;
pub mod submissions;
