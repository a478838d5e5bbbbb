//! Full-pipeline runs against local TCP fixtures: catalog -> runner -> rank.

use mirrorpick::catalog::Catalog;
use mirrorpick::probe::{self, ProbeConfig};
use mirrorpick::rank;
use mirrorpick::runner::{RunOptions, Runner};
use mirrorpick::session::ProbeSession;
use mirrorpick::types::MirrorCandidate;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Minimal HTTP fixture: serves `body_len` zero bytes to any request,
/// optionally pausing between writes to simulate a slow mirror.
async fn spawn_fixture(body_len: usize, chunk_delay: Duration) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => {
                            head.extend_from_slice(&buf[..n]);
                            if head.windows(4).any(|w| w == b"\r\n\r\n") {
                                break;
                            }
                        }
                    }
                }

                let header = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body_len
                );
                if socket.write_all(header.as_bytes()).await.is_err() {
                    return;
                }
                let chunk = vec![0u8; 8 * 1024];
                let mut sent = 0;
                while sent < body_len {
                    let n = chunk.len().min(body_len - sent);
                    if socket.write_all(&chunk[..n]).await.is_err() {
                        return;
                    }
                    sent += n;
                    if !chunk_delay.is_zero() {
                        tokio::time::sleep(chunk_delay).await;
                    }
                }
            });
        }
    });

    format!("http://{}/repo/", addr)
}

fn quiet_options() -> RunOptions {
    RunOptions {
        quiet: true,
        timeout: Duration::from_secs(2),
        probe: ProbeConfig {
            max_samples: 2,
            sample_delay: Duration::from_millis(1),
            ..ProbeConfig::default()
        },
        ..RunOptions::default()
    }
}

#[tokio::test]
async fn ranking_run_keeps_reachable_mirrors_in_speed_order() {
    // Two live mirrors (one throttled), three dead ones.
    let fast = spawn_fixture(256 * 1024, Duration::ZERO).await;
    let slow = spawn_fixture(256 * 1024, Duration::from_millis(25)).await;

    let mut catalog = Catalog::new();
    catalog.add_candidate(MirrorCandidate::new("A", &fast));
    catalog.add_candidate(MirrorCandidate::new("B", &slow));
    for port in [1, 2, 3] {
        catalog.add_candidate(MirrorCandidate::new("X", &format!("http://127.0.0.1:{port}/repo/")));
    }
    assert_eq!(catalog.len(), 5);

    let mut options = quiet_options();
    options.top_n = 10;
    options.workers = 5;
    let runner = Runner::new(options);

    let survivors = runner.run(catalog, &["index.db".to_string()]).await.unwrap();
    assert_eq!(runner.session().completed(), 5);
    assert_eq!(survivors.len(), 2);

    // Window order is descending by measured speed.
    assert_eq!(survivors[0].url, fast);
    assert_eq!(survivors[1].url, slow);
    assert!(survivors[0].avg_speed > survivors[1].avg_speed);
    assert!(survivors.iter().all(|r| r.success_rate > 0.0));

    let ranked = rank::rank(survivors);
    assert_eq!(ranked[0].url, fast);
    assert!(ranked[0].score > 0.0);
}

#[tokio::test]
async fn probe_gives_up_when_threshold_is_out_of_reach() {
    // ~8 KB per 20 ms is roughly 400 KB/s, far below the cutoff of
    // 60_000 / 3 = 20_000 KB/s, so the first successful sample already
    // shows this mirror cannot make the window.
    let throttled = spawn_fixture(256 * 1024, Duration::from_millis(20)).await;
    let candidate = MirrorCandidate::new("XX", &throttled);
    let files = vec!["index.db".to_string()];
    let client = probe::build_client(Duration::from_secs(2)).unwrap();
    let config = ProbeConfig {
        max_samples: 3,
        sample_delay: Duration::from_millis(1),
        ..ProbeConfig::default()
    };

    let session = ProbeSession::new();
    session.set_threshold(60_000.0);
    let aborted = probe::probe(&client, &candidate, &session, &files, &config).await;
    assert!(aborted.is_none());

    // Same mirror, no threshold published: the probe completes normally.
    let session = ProbeSession::new();
    let result = probe::probe(&client, &candidate, &session, &files, &config)
        .await
        .expect("unthresholded run should produce a result");
    assert!(result.avg_speed > 0.0);
    assert_eq!(result.success_rate, 1.0);
}
