pub mod containers;
pub mod error;
pub mod members;
pub mod users;
