pub mod menu;
pub mod month;
pub mod portal;
pub mod submission;
