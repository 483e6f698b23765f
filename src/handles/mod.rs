mod read_handle;
mod thermostat_handle;

pub use read_handle::*;
pub use thermostat_handle::*;
