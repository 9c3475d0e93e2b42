pub mod ai;
pub mod chat;
pub mod media;
pub mod speech;
pub mod staging;
