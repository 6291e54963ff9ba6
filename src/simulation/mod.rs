pub mod constants;
pub mod context;
pub mod manager;
pub mod object;
pub mod sim;
pub mod units;
