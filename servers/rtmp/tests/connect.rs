use amf::{Pair, amf0::Value as Amf0Value};
use rtmp_formats::{
    message::RtmpMessage,
    shared_object::{SharedObjectEvent, SharedObjectMessage},
    user_control::{UserControlEventType, UserControlMessage},
};
use rtmp_server::{config::RtmpSessionConfig, session::ServerSession};
use rtmp_session::{client::ClientSession, config::RtmpClientConfig, shared_object::SharedObject};
use tokio::io::duplex;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn session_config() -> RtmpSessionConfig {
    RtmpSessionConfig {
        read_timeout_ms: 5_000,
        write_timeout_ms: 5_000,
    }
}

fn client_config() -> RtmpClientConfig {
    RtmpClientConfig {
        ip: "127.0.0.1".to_owned(),
        port: 1935,
        tc_url: "rtmp://127.0.0.1/app".to_owned(),
        page_url: "http://example.com/".to_owned(),
        swf_url: "http://example.com/app.swf".to_owned(),
        app: "app".to_owned(),
    }
}

#[tokio::test]
async fn a_client_connects_and_replicates_a_shared_object() {
    init_tracing();
    let (client_end, server_end) = duplex(64 * 1024);

    let server = tokio::spawn(async move {
        let mut session = ServerSession::new(server_end, session_config());
        session.run_until_connected().await.unwrap();

        let message = session
            .read_message()
            .await
            .unwrap()
            .expect("a shared object subscription");
        let RtmpMessage::SharedObject(so_message) = &message.message else {
            panic!("expected a shared object message, got {:?}", message.message);
        };
        assert_eq!(so_message.name, "room");
        assert_eq!(so_message.events, vec![SharedObjectEvent::Use]);

        session
            .write_message(&RtmpMessage::SharedObject(SharedObjectMessage::new(
                "room",
                vec![
                    SharedObjectEvent::UseSuccess,
                    SharedObjectEvent::Clear,
                    SharedObjectEvent::Change(vec![Pair {
                        key: "sparam".to_owned(),
                        value: Amf0Value::String("hi".to_owned()),
                    }]),
                ],
            )))
            .await
            .unwrap();
    });

    let mut session = ClientSession::connect(client_end, client_config(), Vec::new())
        .await
        .unwrap();
    session
        .shared_object_use(SharedObject::new("room"))
        .await
        .unwrap();
    session.run().await.unwrap();

    let so = &session.shared_objects()[0];
    assert!(so.use_success());
    assert_eq!(
        so.data().get("sparam"),
        Some(&Amf0Value::String("hi".to_owned()))
    );
    server.await.unwrap();
}

#[tokio::test]
async fn a_server_ping_comes_back_as_an_echo() {
    init_tracing();
    let (client_end, server_end) = duplex(64 * 1024);

    let server = tokio::spawn(async move {
        let mut session = ServerSession::new(server_end, session_config());
        session.run_until_connected().await.unwrap();

        session
            .write_message(&RtmpMessage::UserControl(UserControlMessage {
                event_type: UserControlEventType::PingRequest,
                event_data: vec![0, 0, 0, 9],
            }))
            .await
            .unwrap();

        let response = session
            .read_message()
            .await
            .unwrap()
            .expect("a ping response");
        assert_eq!(
            response.message,
            RtmpMessage::UserControl(UserControlMessage {
                event_type: UserControlEventType::PingResponse,
                event_data: vec![0, 0, 0, 9],
            })
        );
    });

    let mut session = ClientSession::connect(client_end, client_config(), Vec::new())
        .await
        .unwrap();
    session.run().await.unwrap();
    server.await.unwrap();
}
