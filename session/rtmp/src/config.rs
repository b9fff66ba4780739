/// Connection parameters of a client session. The url and app fields go
/// verbatim into the connect command object.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct RtmpClientConfig {
    pub ip: String,
    pub port: u16,
    pub tc_url: String,
    pub page_url: String,
    pub swf_url: String,
    pub app: String,
}
