//! Post-install provisioning for the migraine CLI

pub mod config;
pub mod install;
