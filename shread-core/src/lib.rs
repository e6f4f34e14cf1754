pub mod awdb;
pub mod csas;
pub mod date_index;
pub mod error;
pub mod grid;
pub mod observation;
pub mod site;
pub mod units;
