
pub mod error;
pub mod parameters;
pub mod pipeline;
pub mod table;

pub mod model;
pub mod report;
pub mod results;
pub mod solver;

pub mod utils;
