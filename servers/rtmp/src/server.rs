use super::{
    config::{RtmpServerConfig, RtmpSessionConfig},
    errors::RtmpServerResult,
    session::ServerSession,
};

/// Accepts TCP connections and runs one independent session per client.
/// Sessions share no state.
#[derive(Debug)]
pub struct RtmpServer {
    config: RtmpServerConfig,
}

impl RtmpServer {
    pub fn new(config: RtmpServerConfig) -> Self {
        Self { config }
    }

    pub async fn run(&mut self) -> RtmpServerResult<()> {
        tracing::info!("rtmp server is running: {:?}", self.config);
        let listener =
            tokio::net::TcpListener::bind((self.config.address.as_str(), self.config.port))
                .await?;
        loop {
            let (tcp_stream, addr) = listener.accept().await?;
            tracing::info!("got new rtmp connection, addr: {}", addr);
            let config = RtmpSessionConfig {
                read_timeout_ms: self.config.read_timeout_ms,
                write_timeout_ms: self.config.write_timeout_ms,
            };
            tokio::spawn(async move {
                let mut session = ServerSession::new(tcp_stream, config);
                let result = async {
                    session.run_until_connected().await?;
                    session
                        .serve(|message| {
                            tracing::debug!("unhandled message from {}: {:?}", addr, message.message);
                            Ok(())
                        })
                        .await
                }
                .await;
                match result {
                    Ok(()) => {
                        tracing::info!("rtmp session closed, addr: {}", addr);
                    }
                    Err(err) => {
                        tracing::error!("rtmp session failed, addr: {}: {:?}", addr, err);
                    }
                }
            });
        }
    }
}
