use spindle::RuntimeBuilder;
use spindle::net::{AsyncSocket, Domain};

async fn read_exact(socket: &AsyncSocket, buffer: &mut [u8]) {
    let mut received = 0;

    while received < buffer.len() {
        let n = socket
            .read(&mut buffer[received..])
            .await
            .expect("read failed");
        assert!(n > 0, "peer closed the connection early");
        received += n;
    }
}

#[test]
fn test_echo_over_loopback() {
    let rt = RuntimeBuilder::new().worker_threads(2).build();

    rt.block_on(async {
        let listener = AsyncSocket::bind("127.0.0.1:0").expect("bind failed");
        listener.listen(128).expect("listen failed");
        let addr = listener.local_addr().expect("local_addr failed");

        let server = spindle::spawn(async move {
            let (peer, _addr) = listener.accept().await.expect("accept failed");

            let mut buffer = [0u8; 5];
            read_exact(&peer, &mut buffer).await;
            assert_eq!(&buffer, b"hello");

            let written = peer.write(&buffer).await.expect("server write failed");
            assert_eq!(written, 5);
        });

        let client = AsyncSocket::connect(&addr.to_string())
            .await
            .expect("connect failed");

        let written = client.write(b"hello").await.expect("client write failed");
        assert_eq!(written, 5);

        let mut buffer = [0u8; 5];
        read_exact(&client, &mut buffer).await;
        assert_eq!(&buffer, b"hello");

        server.await.unwrap();
    });
}

#[test]
fn test_multiple_round_trips() {
    let rt = RuntimeBuilder::new().worker_threads(2).build();

    rt.block_on(async {
        let listener = AsyncSocket::bind("127.0.0.1:0").expect("bind failed");
        listener.listen(128).expect("listen failed");
        let addr = listener.local_addr().expect("local_addr failed");

        let server = spindle::spawn(async move {
            let (peer, _addr) = listener.accept().await.expect("accept failed");

            for _ in 0..3 {
                let mut buffer = [0u8; 4];
                read_exact(&peer, &mut buffer).await;
                assert_eq!(&buffer, b"ping");
                peer.write(b"pong").await.expect("server write failed");
            }
        });

        let client = AsyncSocket::connect(&addr.to_string())
            .await
            .expect("connect failed");

        for _ in 0..3 {
            client.write(b"ping").await.expect("client write failed");
            let mut buffer = [0u8; 4];
            read_exact(&client, &mut buffer).await;
            assert_eq!(&buffer, b"pong");
        }

        server.await.unwrap();
    });
}

#[test]
fn test_read_returns_zero_at_eof() {
    let rt = RuntimeBuilder::new().worker_threads(2).build();

    rt.block_on(async {
        let listener = AsyncSocket::bind("127.0.0.1:0").expect("bind failed");
        listener.listen(128).expect("listen failed");
        let addr = listener.local_addr().expect("local_addr failed");

        let server = spindle::spawn(async move {
            let (peer, _addr) = listener.accept().await.expect("accept failed");

            let mut buffer = [0u8; 3];
            read_exact(&peer, &mut buffer).await;
            assert_eq!(&buffer, b"bye");

            let n = peer
                .read(&mut buffer)
                .await
                .expect("read after close failed");
            assert_eq!(n, 0, "a closed peer must read as end of stream");
        });

        {
            let client = AsyncSocket::connect(&addr.to_string())
                .await
                .expect("connect failed");
            client.write(b"bye").await.expect("client write failed");
            // Dropping the client closes the connection.
        }

        server.await.unwrap();
    });
}

#[test]
fn test_socket_creation_and_options() {
    let rt = RuntimeBuilder::new().worker_threads(2).build();

    rt.block_on(async {
        for domain in [Domain::V4, Domain::V6] {
            let mut socket = AsyncSocket::with_domain(domain).expect("socket creation failed");

            socket.set_reuse_addr().expect("SO_REUSEADDR failed");
            socket.set_nonblocking().expect("non-blocking re-arm failed");

            assert!(socket.is_open());
            socket.close();
            assert!(!socket.is_open());

            // Closing twice is a no-op.
            socket.close();
        }
    });
}

#[test]
fn test_connect_to_closed_port_fails() {
    let rt = RuntimeBuilder::new().worker_threads(2).build();

    rt.block_on(async {
        // Bind a listener to grab a free port, then drop it so nothing
        // is listening there.
        let addr = {
            let listener = AsyncSocket::bind("127.0.0.1:0").expect("bind failed");
            listener.local_addr().expect("local_addr failed")
        };

        let result = AsyncSocket::connect(&addr.to_string()).await;
        assert!(result.is_err(), "connecting to a dead port must fail");
    });
}

#[test]
fn test_large_transfer() {
    let rt = RuntimeBuilder::new().worker_threads(2).build();

    rt.block_on(async {
        let listener = AsyncSocket::bind("127.0.0.1:0").expect("bind failed");
        listener.listen(128).expect("listen failed");
        let addr = listener.local_addr().expect("local_addr failed");

        // Large enough to overflow the socket buffers and force the
        // writer through at least one write-readiness suspension.
        const LEN: usize = 1 << 20;

        let server = spindle::spawn(async move {
            let (peer, _addr) = listener.accept().await.expect("accept failed");

            let mut buffer = vec![0u8; LEN];
            read_exact(&peer, &mut buffer).await;

            for (i, byte) in buffer.iter().enumerate() {
                assert_eq!(*byte, (i % 251) as u8, "corrupted byte at offset {i}");
            }
        });

        let payload: Vec<u8> = (0..LEN).map(|i| (i % 251) as u8).collect();

        let client = AsyncSocket::connect(&addr.to_string())
            .await
            .expect("connect failed");

        let written = client.write(&payload).await.expect("client write failed");
        assert_eq!(written, LEN);

        server.await.unwrap();
    });
}
