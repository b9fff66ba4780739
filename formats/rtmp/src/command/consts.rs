pub mod c2s_command_names {
    pub const CONNECT: &str = "connect";
    pub const CALL: &str = "call";
}

pub mod s2c_command_names {
    pub const RESULT: &str = "_result";
    pub const ERROR: &str = "_error";
}

pub mod response_code {
    // The connection attempt succeeded.
    // level: status
    pub const NET_CONNECTION_CONNECT_SUCCESS: &str = "NetConnection.Connect.Success";
    // The client does not have permission to connect to the application.
    // level: error
    pub const NET_CONNECTION_CONNECT_REJECTED: &str = "NetConnection.Connect.Rejected";
}

pub mod response_level {
    pub const STATUS: &str = "status";
    pub const ERROR: &str = "error";
}

/// The connect command object a Flash Player 10.1 client advertises.
pub mod connect_properties {
    pub const FLASH_VERSION: &str = "WIN 10,1,85,3";
    pub const VIDEO_CODECS: f64 = 252.0;
    pub const AUDIO_CODECS: f64 = 3191.0;
    pub const VIDEO_FUNCTION: f64 = 1.0;
    pub const CAPABILITIES: f64 = 239.0;
    pub const OBJECT_ENCODING_AMF0: f64 = 0.0;
}
