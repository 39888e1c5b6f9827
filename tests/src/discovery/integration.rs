use std::time::Duration;

use scopr_common::config::{Config, SessionTimeouts};
use scopr_common::device::ProbeOutcome;
use scopr_common::network::target::SweepTarget;
use scopr_core::discovery::DiscoveryService;
use scopr_core::enumerators::{ChainedResources, FixedResources, TcpSweep};

use crate::utils::{MockInstrument, always_on_instrument, closed_port};

fn config() -> Config {
    let probe = SessionTimeouts::new(Duration::from_millis(500), Duration::from_millis(800)).unwrap();
    Config {
        probe,
        ..Config::default()
    }
}

/// Slow first, fast last: results must still come back in enumeration order.
#[tokio::test]
async fn results_follow_enumeration_order() {
    let slow = MockInstrument::replying("RIGOL TECHNOLOGIES,DS1104Z,A,1\n", Duration::from_millis(300)).await;
    let medium = MockInstrument::replying("Siglent,SDS1202X-E,B,2\n", Duration::from_millis(150)).await;
    let fast = MockInstrument::replying("KEYSIGHT,DSOX1204G,C,3\n", Duration::ZERO).await;

    let resources = FixedResources::new(vec![slow.resource(), medium.resource(), fast.resource()]);
    let service = DiscoveryService::new(Box::new(resources), &config());

    let devices = service.discover().await.unwrap();
    let names: Vec<&str> = devices.iter().map(|d| d.display_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "DS1104Z (127.0.0.1)",
            "SDS1202X-E (127.0.0.1)",
            "DSOX1204G (127.0.0.1)",
        ]
    );

    for mock in [slow, medium, fast] {
        let transcript = mock.transcript().await;
        assert_eq!(transcript.request, "*IDN?\n");
        assert!(transcript.saw_hangup, "probe left the socket open");
    }
}

#[tokio::test]
async fn malformed_identity_falls_back_to_unknown_device() {
    let confused = MockInstrument::replying("ready\n", Duration::ZERO).await;
    let healthy = MockInstrument::replying("RIGOL TECHNOLOGIES,MSO5074,X,9\n", Duration::ZERO).await;

    let resources = FixedResources::new(vec![confused.resource(), healthy.resource()]);
    let devices = DiscoveryService::new(Box::new(resources), &config())
        .discover()
        .await
        .unwrap();

    assert_eq!(devices[0].display_name, "Unknown Device (127.0.0.1)");
    assert!(matches!(devices[0].outcome, ProbeOutcome::Unidentified { .. }));
    assert_eq!(devices[1].display_name, "MSO5074 (127.0.0.1)");
}

#[tokio::test]
async fn dead_and_silent_instruments_do_not_abort_the_scan() {
    let silent = MockInstrument::silent().await;
    let dead = format!("TCPIP::127.0.0.1::{}::SOCKET", closed_port().await);

    let resources = FixedResources::new(vec![dead, silent.resource()]);
    let devices = DiscoveryService::new(Box::new(resources), &config())
        .discover()
        .await
        .unwrap();

    assert_eq!(devices.len(), 2);
    assert!(devices.iter().all(|d| d.display_name == "Unknown Device (127.0.0.1)"));
    assert!(silent.transcript().await.saw_hangup);
}

#[tokio::test]
async fn non_network_resources_pass_through_unprobed() {
    let scope = MockInstrument::replying("Tektronix,TBS2104,S,1\n", Duration::ZERO).await;
    let resources = FixedResources::new(vec![
        "USB0::0x0699::0x03C4::C010101::INSTR".to_string(),
        scope.resource(),
        "GPIB0::12::INSTR".to_string(),
    ]);

    let devices = DiscoveryService::new(Box::new(resources), &config())
        .discover()
        .await
        .unwrap();

    assert_eq!(devices[0].display_name, "USB0::0x0699::0x03C4::C010101::INSTR");
    assert_eq!(devices[0].outcome, ProbeOutcome::Skipped);
    assert_eq!(devices[1].display_name, "TBS2104 (127.0.0.1)");
    assert_eq!(devices[2].display_name, "GPIB0::12::INSTR");
}

#[tokio::test]
async fn sweep_finds_a_listening_instrument() {
    let port = always_on_instrument("RIGOL TECHNOLOGIES,DHO804,Z,1\n").await;
    let target: SweepTarget = "127.0.0.1".parse().unwrap();

    let mut sources = ChainedResources::new();
    sources.push(Box::new(TcpSweep::new(target, &config()).with_port(port)));
    sources.push(Box::new(FixedResources::new(vec!["ASRL3::INSTR".to_string()])));

    let devices = DiscoveryService::new(Box::new(sources), &config())
        .discover()
        .await
        .unwrap();

    let names: Vec<&str> = devices.iter().map(|d| d.display_name.as_str()).collect();
    assert_eq!(names, vec!["DHO804 (127.0.0.1)", "ASRL3::INSTR"]);
}
