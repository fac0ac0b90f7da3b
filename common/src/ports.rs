/// Port the field devices broadcast envelopes to.
pub const LISTEN_PORT: u16 = 37020;
/// Port the window controller listens on for directed instructions.
pub const RESPONSE_PORT: u16 = 37021;

pub const CLIENT_ID: &str = "proxy_pc";

/// Seconds between 1970-01-01 and 2000-01-01; the sensor firmware counts from
/// the latter.
pub const SENSOR_EPOCH_OFFSET_SECS: i64 = 946_684_800;

pub const DEFAULT_MAX_DATAGRAM_BYTES: usize = 1024;
