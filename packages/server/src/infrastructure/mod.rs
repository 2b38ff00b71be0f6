//! Infrastructure layer: implementations of the domain ports.

pub mod pusher;
pub mod repository;
