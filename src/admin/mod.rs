//! Admin-panel collaborators: the config sync client for the backend's
//! economy settings. The game engine never calls into this module.

pub mod config_client;
pub mod transport;
