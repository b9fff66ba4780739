/// What a Flash Media Server announces before accepting a connect. The
/// session is as strict about these as the deployed players are.
pub const EXPECTED_WINDOW_ACK_SIZE: u32 = 2_500_000;
pub const EXPECTED_STREAM_BEGIN_DATA: [u8; 4] = [0, 0, 0, 0];

pub const CONNECT_TRANSACTION_ID: f64 = 1.0;
