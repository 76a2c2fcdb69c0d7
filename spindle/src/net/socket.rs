use crate::reactor::ReactorHandle;
use crate::reactor::command::Command;
use crate::reactor::future::{AcceptFuture, ConnectFuture, ReadFuture, WriteFuture};
use crate::reactor::poller::unix::{
    sockaddr_storage_to_socketaddr, sys_bind, sys_close, sys_listen, sys_parse_sockaddr,
    sys_set_nonblocking, sys_set_reuseaddr, sys_shutdown, sys_socket, sys_sockname,
};
use crate::runtime::context::current_reactor;

use libc::{AF_INET, AF_INET6};
use std::io;
use std::net::{Shutdown, SocketAddr};
use std::os::fd::RawFd;

/// Sentinel stored once the descriptor has been released.
const CLOSED: RawFd = -1;

/// Address family of a socket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Domain {
    /// IPv4.
    V4,
    /// IPv6.
    V6,
}

impl Domain {
    fn as_raw(self) -> libc::c_int {
        match self {
            Domain::V4 => AF_INET,
            Domain::V6 => AF_INET6,
        }
    }
}

/// A non-blocking socket integrated with the reactor.
///
/// `AsyncSocket` owns its descriptor exclusively and keeps it in
/// non-blocking mode for its whole lifetime. Every asynchronous
/// operation follows the same pattern: attempt the syscall, and if it
/// would block, register interest with the reactor and retry on
/// wake-up. On teardown the descriptor is deregistered from the
/// reactor before being closed.
///
/// A socket must be created **inside a running runtime** (the reactor
/// handle is captured from the context at creation).
///
/// # Examples
///
/// ```rust,ignore
/// let listener = AsyncSocket::bind("127.0.0.1:0")?;
/// listener.listen(128)?;
///
/// let (peer, _addr) = listener.accept().await?;
/// let mut buffer = [0u8; 1024];
/// let n = peer.read(&mut buffer).await?;
/// peer.write(&buffer[..n]).await?;
/// ```
pub struct AsyncSocket {
    /// Owned descriptor; [`CLOSED`] after an explicit close.
    fd: RawFd,

    /// Reactor the descriptor registers with, captured at creation.
    reactor: ReactorHandle,
}

impl AsyncSocket {
    /// Creates a fresh non-blocking IPv4 stream socket.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a running runtime.
    pub fn new() -> io::Result<Self> {
        Self::with_domain(Domain::V4)
    }

    /// Creates a fresh non-blocking stream socket in the given address
    /// family.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a running runtime.
    pub fn with_domain(domain: Domain) -> io::Result<Self> {
        Ok(Self::from_fd(sys_socket(domain.as_raw())?))
    }

    /// Wraps an existing non-blocking descriptor.
    pub(crate) fn from_fd(fd: RawFd) -> Self {
        Self {
            fd,
            reactor: current_reactor(),
        }
    }

    /// Creates a socket bound to `address`.
    ///
    /// The address must be accepted by `SocketAddr::from_str`, e.g.
    /// `"127.0.0.1:8080"` or `"[::1]:8080"`. Port `0` asks the kernel
    /// to pick one; see [`local_addr`](Self::local_addr).
    /// `SO_REUSEADDR` is enabled before binding.
    pub fn bind(address: &str) -> io::Result<Self> {
        let (storage, len) = sys_parse_sockaddr(address)?;
        let domain = storage.ss_family as i32;

        let socket = Self::from_fd(sys_socket(domain)?);

        sys_set_reuseaddr(socket.fd)?;
        sys_bind(socket.fd, &storage, len)?;

        Ok(socket)
    }

    /// Marks the socket as accepting connections.
    pub fn listen(&self, backlog: i32) -> io::Result<()> {
        sys_listen(self.fd, backlog)
    }

    /// Returns the local address the socket is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        sys_sockname(self.fd)
    }

    /// Establishes a connection to `address`.
    ///
    /// Issues a non-blocking connect; when the kernel reports the
    /// attempt as in progress, the task suspends for write-readiness
    /// and the socket error state decides the outcome on resumption.
    pub async fn connect(address: &str) -> io::Result<Self> {
        let (storage, _) = sys_parse_sockaddr(address)?;
        let addr = sockaddr_storage_to_socketaddr(&storage)?;
        let domain = storage.ss_family as i32;

        let socket = Self::from_fd(sys_socket(domain)?);

        ConnectFuture::new(socket.fd, socket.reactor.clone(), addr).await?;

        Ok(socket)
    }

    /// Accepts one incoming connection.
    ///
    /// Suspends for read-readiness while no connection is pending; the
    /// retry loop lives inside one frame, so repeated wake-ups do not
    /// stack. The accepted socket is non-blocking and registered with
    /// the same reactor.
    pub async fn accept(&self) -> io::Result<(AsyncSocket, SocketAddr)> {
        let (fd, addr) = AcceptFuture::new(self.fd, self.reactor.clone()).await?;

        Ok((
            AsyncSocket {
                fd,
                reactor: self.reactor.clone(),
            },
            addr,
        ))
    }

    /// Reads up to `buffer.len()` bytes.
    ///
    /// Resolves with the number of bytes read; `0` signals end of
    /// stream. Suspends for read-readiness whenever the kernel has
    /// nothing to deliver.
    pub fn read<'a>(&'a self, buffer: &'a mut [u8]) -> ReadFuture<'a> {
        ReadFuture::new(self.fd, self.reactor.clone(), buffer)
    }

    /// Writes the entire buffer.
    ///
    /// Partial writes advance internally; the future resolves once all
    /// bytes are handed to the kernel, suspending for write-readiness
    /// whenever the send buffer is full.
    pub fn write<'a>(&'a self, buffer: &'a [u8]) -> WriteFuture<'a> {
        WriteFuture::new(self.fd, self.reactor.clone(), buffer)
    }

    /// Enables `SO_REUSEADDR` on the socket.
    ///
    /// [`bind`](Self::bind) applies this automatically; exposed for
    /// sockets created through [`with_domain`](Self::with_domain).
    pub fn set_reuse_addr(&self) -> io::Result<()> {
        sys_set_reuseaddr(self.fd)
    }

    /// Re-arms non-blocking mode on the descriptor.
    ///
    /// Every descriptor the facade creates or accepts is already
    /// non-blocking; there is no way to leave non-blocking mode while
    /// the socket is owned.
    pub fn set_nonblocking(&self) -> io::Result<()> {
        sys_set_nonblocking(self.fd)
    }

    /// Shuts down the read, write, or both halves of the connection.
    pub fn shutdown(&self, how: Shutdown) -> io::Result<()> {
        sys_shutdown(self.fd, how)
    }

    /// Returns `true` while the socket owns a live descriptor.
    pub fn is_open(&self) -> bool {
        self.fd != CLOSED
    }

    /// Closes the socket.
    ///
    /// The descriptor is deregistered from the reactor first, dropping
    /// any pending waker, and only then released. Closing twice is a
    /// no-op.
    pub fn close(&mut self) {
        if self.fd == CLOSED {
            return;
        }

        self.reactor.send(Command::Deregister { fd: self.fd });
        sys_close(self.fd);
        self.fd = CLOSED;
    }
}

impl Drop for AsyncSocket {
    fn drop(&mut self) {
        self.close();
    }
}
