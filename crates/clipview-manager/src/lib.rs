//! clipview-manager: the synchronization engine between the record store
//! and the external renderer.

pub mod bridge;
pub mod config;
pub mod focus;
pub mod lifecycle;
pub mod mutate;
pub mod remote;
pub mod surface;
pub mod view;
