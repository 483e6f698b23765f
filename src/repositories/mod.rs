mod thermostat;
mod thermostat_read;

pub use thermostat::ThermostatRepository;
pub use thermostat_read::ThermostatReadRepository;
