use std::time::{Duration, Instant};

use scopr_common::config::{Config, SessionTimeouts};
use scopr_common::error::{ConnectionFailure, ScoprError};
use scopr_core::dispatcher::CommandDispatcher;

use crate::utils::{MockInstrument, closed_port, png_block};

fn dispatcher(read_timeout: Duration) -> CommandDispatcher {
    let operation = SessionTimeouts::new(Duration::from_secs(1), read_timeout).unwrap();
    CommandDispatcher::new(Config {
        operation,
        drain_timeout: Duration::from_millis(200),
        identify_timeout: Duration::from_millis(500),
        ..Config::default()
    })
}

#[tokio::test]
async fn screenshot_returns_exactly_the_declared_payload() {
    let mut reply = b"#800000010".to_vec();
    reply.extend_from_slice(b"\x89PNG\r\n\x1a\nAB");
    reply.push(b'\n');
    let scope = MockInstrument::replying(reply, Duration::ZERO).await;

    let shot = dispatcher(Duration::from_secs(2))
        .fetch_screenshot(&scope.resource())
        .await
        .unwrap();

    assert_eq!(shot.len(), 10);
    assert_eq!(shot.bytes(), b"\x89PNG\r\n\x1a\nAB");
    assert!(shot.has_png_signature());

    let transcript = scope.transcript().await;
    assert_eq!(transcript.request, ":DISP:DATA? PNG\n");
    assert!(transcript.saw_hangup);
}

#[tokio::test]
async fn large_screenshot_arrives_intact() {
    let payload: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    let scope = MockInstrument::replying(png_block(&payload), Duration::ZERO).await;

    let shot = dispatcher(Duration::from_secs(2))
        .fetch_screenshot(&scope.resource())
        .await
        .unwrap();

    assert_eq!(shot.bytes(), payload.as_slice());
}

#[tokio::test]
async fn silent_instrument_times_out_instead_of_hanging() {
    let scope = MockInstrument::silent().await;
    let started = Instant::now();

    let err = dispatcher(Duration::from_millis(200))
        .fetch_screenshot(&scope.resource())
        .await
        .unwrap_err();

    assert!(err.is_timeout(), "{err}");
    assert!(matches!(
        err,
        ScoprError::Connection {
            kind: ConnectionFailure::Timeout,
            ..
        }
    ));
    assert!(started.elapsed() < Duration::from_secs(3));
    assert!(scope.transcript().await.saw_hangup, "session leaked its socket");
}

#[tokio::test]
async fn non_block_reply_is_a_protocol_error() {
    let scope = MockInstrument::replying("-113,\"Undefined header\"\n", Duration::ZERO).await;

    let err = dispatcher(Duration::from_secs(1))
        .fetch_screenshot(&scope.resource())
        .await
        .unwrap_err();

    assert!(matches!(err, ScoprError::Protocol { .. }), "{err}");
    assert!(scope.transcript().await.saw_hangup);
}

#[tokio::test]
async fn refused_connection_is_reported() {
    let address = format!("TCPIP::127.0.0.1::{}::SOCKET", closed_port().await);

    let err = dispatcher(Duration::from_secs(1))
        .identify(&address)
        .await
        .unwrap_err();

    assert!(err.is_refused(), "{err}");
    assert_eq!(err.endpoint().map(|e| e.host.as_str()), Some("127.0.0.1"));
}

#[tokio::test]
async fn identify_returns_the_whole_reply() {
    let scope = MockInstrument::replying(
        "Siglent Technologies,SDS1104X-E,SDSMMEBX000000,8.2.6.1.37R9\n",
        Duration::ZERO,
    )
    .await;

    let idn = dispatcher(Duration::from_secs(1))
        .identify(&scope.resource())
        .await
        .unwrap();

    assert_eq!(idn, "Siglent Technologies,SDS1104X-E,SDSMMEBX000000,8.2.6.1.37R9");
    assert_eq!(scope.transcript().await.request, "*IDN?\n");
}

#[tokio::test]
async fn send_command_frames_and_releases() {
    let scope = MockInstrument::silent().await;

    let reply = dispatcher(Duration::from_secs(1))
        .send_command(&scope.resource(), ":TRIG:SWE SING")
        .await
        .unwrap();

    assert_eq!(reply, None);
    let transcript = scope.transcript().await;
    assert_eq!(transcript.request, ":TRIG:SWE SING\n");
    assert!(transcript.saw_hangup);
}

#[tokio::test]
async fn bare_host_uses_the_default_port() {
    let scope = MockInstrument::replying("RIGOL TECHNOLOGIES,DS2202A,X,1\n", Duration::ZERO).await;
    let dispatcher = CommandDispatcher::new(Config {
        default_port: scope.port,
        ..Config::default()
    });

    let idn = dispatcher.identify("127.0.0.1").await.unwrap();
    assert!(idn.starts_with("RIGOL TECHNOLOGIES,DS2202A"));
}
