//! Post-Processing & Reporting
//!
//! Independent tasks over already extracted results: the measured/simulated water content
//! comparison, per-variable wide tables of the profile snapshots and the windowed sink summary.

pub mod compare;
pub mod reshape;
pub mod summary;
