pub const FMSVER: &str = "FMS/3,0,2,217";
pub const FMS_CAPABILITIES: f64 = 31.0;
pub const CONNECT_DESCRIPTION: &str = "Connection succeeded.";
