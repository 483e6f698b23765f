mod thermostat;
mod thermostat_read;

pub use thermostat::{Thermostat, ThermostatTable};
pub use thermostat_read::{ReadDraft, ThermostatRead, ThermostatReadTable};

pub trait Table {
    /// The name of the table
    fn name(&self) -> &'static str;

    /// The SQL statement to create the table
    fn create(&self) -> String;

    /// The SQL statement to dispose the table
    fn dispose(&self) -> String;

    /// The dependencies of the table
    fn dependencies(&self) -> Vec<&'static str>;
}
