pub mod error;
pub mod markup;
pub mod response;
pub mod upload;
