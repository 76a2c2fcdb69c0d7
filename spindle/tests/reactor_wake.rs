use spindle::RuntimeBuilder;
use spindle::error::Elapsed;
use spindle::net::AsyncSocket;
use spindle::time::{sleep, timeout};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Builds a connected loopback socket pair.
async fn socket_pair() -> (AsyncSocket, AsyncSocket) {
    let listener = AsyncSocket::bind("127.0.0.1:0").expect("bind failed");
    listener.listen(1).expect("listen failed");
    let addr = listener.local_addr().expect("local_addr failed");

    let client = AsyncSocket::connect(&addr.to_string())
        .await
        .expect("connect failed");
    let (server, _addr) = listener.accept().await.expect("accept failed");

    (client, server)
}

#[test]
fn test_no_wake_before_data_arrives() {
    let rt = RuntimeBuilder::new().worker_threads(2).build();

    rt.block_on(async {
        let (client, server) = socket_pair().await;

        let completed = Arc::new(AtomicBool::new(false));
        let completed_clone = completed.clone();

        let reader = spindle::spawn(async move {
            let mut byte = [0u8; 1];
            let n = server.read(&mut byte).await.expect("read failed");
            completed_clone.store(true, Ordering::SeqCst);
            (n, byte[0])
        });

        sleep(Duration::from_millis(100)).await;
        assert!(
            !completed.load(Ordering::SeqCst),
            "the reader must stay suspended while no data is available"
        );

        client.write(&[0x2a]).await.expect("write failed");

        let (n, byte) = reader.await.unwrap();
        assert_eq!(n, 1);
        assert_eq!(byte, 0x2a);
        assert!(completed.load(Ordering::SeqCst));
    });
}

#[test]
fn test_dropped_read_releases_its_registration() {
    let rt = RuntimeBuilder::new().worker_threads(2).build();

    rt.block_on(async {
        let (client, server) = socket_pair().await;

        // Suspend a read, then abandon it via the timeout dropping the
        // future while its interest is registered.
        let mut buffer = [0u8; 1];
        let result = timeout(Duration::from_millis(50), server.read(&mut buffer)).await;
        assert!(matches!(result, Err(Elapsed)));

        // Closing the socket deregisters the descriptor.
        drop(server);

        // Data arriving for the dead registration must not disturb the
        // reactor.
        let _ = client.write(&[1]).await;
        sleep(Duration::from_millis(50)).await;

        // The runtime is still fully operational.
        let alive = spindle::spawn(async { 11 });
        assert_eq!(alive.await.unwrap(), 11);
    });
}

#[test]
fn test_reregistration_replaces_previous_waiter() {
    let rt = RuntimeBuilder::new().worker_threads(2).build();

    rt.block_on(async {
        let (client, server) = socket_pair().await;

        // First waiter times out and is dropped; a second waiter then
        // registers on the same descriptor, replacing the stale entry.
        let mut buffer = [0u8; 1];
        let first = timeout(Duration::from_millis(50), server.read(&mut buffer)).await;
        assert!(matches!(first, Err(Elapsed)));

        let reader = spindle::spawn(async move {
            let mut byte = [0u8; 1];
            let n = server.read(&mut byte).await.expect("read failed");
            (n, byte[0])
        });

        sleep(Duration::from_millis(50)).await;
        client.write(&[9]).await.expect("write failed");

        let (n, byte) = reader.await.unwrap();
        assert_eq!((n, byte), (1, 9));
    });
}
