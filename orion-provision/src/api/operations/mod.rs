//! SWIS Operations Module
//!
//! This module provides a unified description of the create, update, query
//! and invoke requests the SolarWinds Information Service accepts.

pub mod operation;

pub use operation::Operation;
