pub mod items;
pub mod study;
