pub mod fleet_api;
