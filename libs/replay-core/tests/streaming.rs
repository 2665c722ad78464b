//! Socket round-trip tests: stream fixture files through real loopback
//! sockets and assert on what the receiver actually got.

use std::io::Read;
use std::net::{TcpListener, UdpSocket};
use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;

use replay_core::{run_jobs, ExecMode, Protocol, StreamJob};

const SAMPLE_CRLX: &str = "\
2025-11-14T00:05:36.704224Z transm002005 CST-2005DR\t05072\t06604\t14647\t00.212\t532
2025-11-14T00:05:37.545576Z transm002005 CST-2005DR\t05072\t06604\t14647\t00.212\t531
2025-11-14T00:05:38.386962Z transm002005 CST-2005DR\t05072\t06604\t14647\t00.212\t532
2025-11-14T00:05:39.228399Z transm002005 CST-2005DR\t05072\t06604\t14647\t00.212\t532
";

const SAMPLE_CSV: &str = "\
timestamp,value,sensor_id
2023-01-01T00:00:00,23.5,sensor_1
2023-01-01T00:01:00,24.1,sensor_1
2023-01-01T00:02:00,23.8,sensor_1
2023-01-01T00:03:00,24.2,sensor_1
";

fn write_fixture(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Bind a loopback UDP receiver and collect `expected` datagrams on a
/// background thread. Returns the bound port and the join handle.
fn udp_receiver(expected: usize) -> (u16, std::thread::JoinHandle<Vec<String>>) {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    let port = socket.local_addr().unwrap().port();
    socket
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();

    let handle = std::thread::spawn(move || {
        let mut messages = Vec::new();
        let mut buf = [0u8; 2048];
        while messages.len() < expected {
            match socket.recv_from(&mut buf) {
                Ok((len, _)) => messages.push(String::from_utf8_lossy(&buf[..len]).into_owned()),
                Err(_) => break, // timeout
            }
        }
        messages
    });
    (port, handle)
}

fn crlx_job(name: &str, file: PathBuf, protocol: Protocol, port: u16) -> StreamJob {
    StreamJob {
        name: name.into(),
        file,
        protocol,
        port,
        host: None,
        broadcast_addr: None,
        unicast_addr: None,
        sensor_id: None,
        update_timestamp: false,
        raw_data_only: false,
        interval: 0.0,
    }
}

#[test]
fn udp_unicast_reproduces_original_triples_verbatim() {
    let dir = TempDir::new().unwrap();
    let file = write_fixture(&dir, "sample.crlx", SAMPLE_CRLX);
    let (port, receiver) = udp_receiver(4);

    let mut job = crlx_job("unicast", file, Protocol::UdpUnicast, port);
    job.unicast_addr = Some("127.0.0.1".into());

    let sent = replay_core::execute_job(&job).unwrap();
    assert_eq!(sent, 4);

    let messages = receiver.join().unwrap();
    assert_eq!(messages.len(), 4);
    let original: Vec<&str> = SAMPLE_CRLX.lines().collect();
    for (got, want) in messages.iter().zip(original) {
        assert_eq!(got, want);
    }
}

#[test]
fn udp_broadcast_applies_sensor_override_and_fresh_timestamps() {
    let dir = TempDir::new().unwrap();
    let file = write_fixture(&dir, "sample.crlx", SAMPLE_CRLX);
    let (port, receiver) = udp_receiver(4);

    let mut job = crlx_job("broadcast", file, Protocol::UdpBroadcast, port);
    job.broadcast_addr = Some("127.0.0.1".into());
    job.sensor_id = Some("custom_sensor_999".into());
    job.update_timestamp = true;

    let sent = replay_core::execute_job(&job).unwrap();
    assert_eq!(sent, 4);

    let messages = receiver.join().unwrap();
    assert_eq!(messages.len(), 4);
    let original_timestamps: Vec<&str> = SAMPLE_CRLX
        .lines()
        .map(|l| l.split(' ').next().unwrap())
        .collect();
    for (msg, original_ts) in messages.iter().zip(original_timestamps) {
        let parts: Vec<&str> = msg.splitn(3, ' ').collect();
        assert_eq!(parts.len(), 3);
        assert_ne!(parts[0], original_ts, "timestamp must be refreshed");
        assert!(parts[0].ends_with('Z'));
        assert_eq!(parts[1], "custom_sensor_999");
        assert!(parts[2].starts_with("CST-2005DR"));
    }
}

#[test]
fn raw_data_only_datagrams_carry_no_prefix() {
    let dir = TempDir::new().unwrap();
    let file = write_fixture(&dir, "sample.crlx", SAMPLE_CRLX);
    let (port, receiver) = udp_receiver(4);

    let mut job = crlx_job("raw", file, Protocol::UdpUnicast, port);
    job.unicast_addr = Some("127.0.0.1".into());
    job.raw_data_only = true;
    job.update_timestamp = true;

    replay_core::execute_job(&job).unwrap();

    let messages = receiver.join().unwrap();
    assert_eq!(messages.len(), 4);
    for msg in &messages {
        assert!(msg.starts_with("CST-2005DR\t"));
    }
}

#[test]
fn tcp_streams_csv_as_json_lines() {
    let dir = TempDir::new().unwrap();
    let file = write_fixture(&dir, "sample.csv", SAMPLE_CSV);

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let receiver = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut data = String::new();
        stream.read_to_string(&mut data).unwrap();
        data
    });

    let mut job = crlx_job("tcp", file, Protocol::Tcp, port);
    job.host = Some("127.0.0.1".into());

    let sent = replay_core::execute_job(&job).unwrap();
    assert_eq!(sent, 4);

    let data = receiver.join().unwrap();
    let lines: Vec<&str> = data.lines().collect();
    assert_eq!(lines.len(), 4);

    // Round-trip field equality, not positional order
    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first.get("timestamp").unwrap(), "2023-01-01T00:00:00");
    assert_eq!(first.get("value").unwrap(), "23.5");
    assert_eq!(first.get("sensor_id").unwrap(), "sensor_1");
}

#[test]
fn tcp_connect_refused_fails_the_job() {
    let dir = TempDir::new().unwrap();
    let file = write_fixture(&dir, "sample.csv", SAMPLE_CSV);

    // Grab a free port and close it again so nothing is listening
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let mut job = crlx_job("refused", file, Protocol::Tcp, port);
    job.host = Some("127.0.0.1".into());

    let err = replay_core::execute_job(&job).unwrap_err();
    assert!(matches!(err, replay_core::ReplayError::Connection { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn parallel_run_isolates_the_failing_job() {
    let dir = TempDir::new().unwrap();
    let file = write_fixture(&dir, "sample.crlx", SAMPLE_CRLX);
    let (port_a, recv_a) = udp_receiver(4);
    let (port_c, recv_c) = udp_receiver(4);

    let mut first = crlx_job("first", file.clone(), Protocol::UdpUnicast, port_a);
    first.unicast_addr = Some("127.0.0.1".into());

    // Missing unicast_addr: must fail validation inside its own slot
    let second = crlx_job("second", file.clone(), Protocol::UdpUnicast, port_a);

    let mut third = crlx_job("third", file, Protocol::UdpUnicast, port_c);
    third.unicast_addr = Some("127.0.0.1".into());

    let results = run_jobs(vec![first, second, third], ExecMode::Parallel).await;

    assert_eq!(results.len(), 3);
    // Original job order preserved regardless of completion order
    assert_eq!(results[0].name, "first");
    assert_eq!(results[1].name, "second");
    assert_eq!(results[2].name, "third");

    assert!(results[0].success);
    assert_eq!(results[0].records_sent, 4);
    assert!(!results[1].success);
    assert!(results[1].error.as_deref().unwrap().contains("unicast_addr"));
    assert!(results[2].success);
    assert_eq!(results[2].records_sent, 4);

    assert_eq!(recv_a.join().unwrap().len(), 4);
    assert_eq!(recv_c.join().unwrap().len(), 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn sequential_run_produces_the_same_aggregate() {
    let dir = TempDir::new().unwrap();
    let file = write_fixture(&dir, "sample.crlx", SAMPLE_CRLX);
    let (port, receiver) = udp_receiver(8);

    let mut a = crlx_job("a", file.clone(), Protocol::UdpUnicast, port);
    a.unicast_addr = Some("127.0.0.1".into());
    let mut b = crlx_job("b", file, Protocol::UdpUnicast, port);
    b.unicast_addr = Some("127.0.0.1".into());

    let results = run_jobs(vec![a, b], ExecMode::Sequential).await;
    assert!(results.iter().all(|r| r.success));
    assert_eq!(results.iter().map(|r| r.records_sent).sum::<u64>(), 8);
    assert_eq!(receiver.join().unwrap().len(), 8);
}
