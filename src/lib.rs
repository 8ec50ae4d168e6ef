//! Savings projection: month-by-month compound growth with yearly snapshots,
//! optional inflation-adjusted values, and side-by-side scenario comparison.

pub mod api;
pub mod core;
pub mod report;
