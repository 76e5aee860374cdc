pub mod radio;

pub use radio::radio_routes;
