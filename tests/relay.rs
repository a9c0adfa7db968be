//! Relay termination over real sockets.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

use dynaproxy::config::RelayConfig;
use dynaproxy::net::{Connection, ConnectionId, ConnectionRelay};

/// Returns (proxy-side client socket, test client, proxy-side backend socket, test backend).
async fn socket_pairs() -> (TcpStream, TcpStream, TcpStream, TcpStream) {
    let front = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let back = TcpListener::bind("127.0.0.1:0").await.unwrap();

    let client = TcpStream::connect(front.local_addr().unwrap()).await.unwrap();
    let (proxy_client, _) = front.accept().await.unwrap();

    let proxy_backend = TcpStream::connect(back.local_addr().unwrap()).await.unwrap();
    let (backend, _) = back.accept().await.unwrap();

    (proxy_client, client, proxy_backend, backend)
}

#[tokio::test]
async fn backend_closing_first_ends_both_directions() {
    let (proxy_client, mut client, proxy_backend, mut backend) = socket_pairs().await;
    let peer = client.local_addr().unwrap();

    // long idle timeout: termination must come from EOF propagation
    let relay = ConnectionRelay::new(&RelayConfig {
        idle_timeout_ms: 30_000,
        buffer_size: 64,
    });
    let relay_task = tokio::spawn(async move {
        relay
            .run(Connection {
                id: ConnectionId::new(),
                peer,
                client: proxy_client,
                backend: proxy_backend,
                backend_host: "127.0.0.1".into(),
            })
            .await
    });

    let backend_task = tokio::spawn(async move {
        backend.write_all(b"goodbye").await.unwrap();
        backend.shutdown().await.unwrap();
        let mut rest = Vec::new();
        backend.read_to_end(&mut rest).await.unwrap();
        rest
    });

    let mut received = Vec::new();
    timeout(Duration::from_secs(3), client.read_to_end(&mut received))
        .await
        .expect("client never saw EOF")
        .unwrap();
    assert_eq!(received, b"goodbye");
    drop(client);

    let summary = timeout(Duration::from_secs(3), relay_task)
        .await
        .expect("relay did not finish")
        .unwrap();
    assert_eq!(summary.backend_to_client, 7);
    assert_eq!(summary.client_to_backend, 0);

    let backend_rest = timeout(Duration::from_secs(3), backend_task)
        .await
        .expect("backend socket left open")
        .unwrap();
    assert!(backend_rest.is_empty());
}

#[tokio::test]
async fn simultaneous_traffic_flows_both_ways() {
    let (proxy_client, mut client, proxy_backend, mut backend) = socket_pairs().await;
    let peer = client.local_addr().unwrap();

    let relay = ConnectionRelay::new(&RelayConfig::default());
    let relay_task = tokio::spawn(async move {
        relay
            .run(Connection {
                id: ConnectionId::new(),
                peer,
                client: proxy_client,
                backend: proxy_backend,
                backend_host: "127.0.0.1".into(),
            })
            .await
    });

    let up = vec![b'u'; 20_000];
    let down = vec![b'd'; 30_000];

    let (client_result, backend_result) = tokio::join!(
        async {
            client.write_all(&up).await.unwrap();
            client.shutdown().await.unwrap();
            let mut got = Vec::new();
            client.read_to_end(&mut got).await.unwrap();
            got
        },
        async {
            backend.write_all(&down).await.unwrap();
            backend.shutdown().await.unwrap();
            let mut got = Vec::new();
            backend.read_to_end(&mut got).await.unwrap();
            got
        }
    );

    assert_eq!(client_result, down);
    assert_eq!(backend_result, up);

    let summary = timeout(Duration::from_secs(3), relay_task).await.unwrap().unwrap();
    assert_eq!(summary.client_to_backend, 20_000);
    assert_eq!(summary.backend_to_client, 30_000);
}
