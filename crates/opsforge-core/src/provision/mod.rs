//! Rendering of approved recommendations into provisioning artifacts.

pub mod terraform;
