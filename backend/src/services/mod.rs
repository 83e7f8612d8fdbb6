pub mod coercion;
pub mod importer;
pub mod stocks;
