// Domain layer: records and ports. No storage or clock implementation lives here.

pub mod model;
pub mod ports;
