//! Suspension points for non-blocking socket operations.
//!
//! Every future here follows the same attempt-then-register pattern:
//! try the syscall, and on `WouldBlock` register the current waker with
//! the reactor for the matching readiness before suspending. The retry
//! after a wake-up happens inside the same future (a loop in one frame,
//! never a recursive call), and another `WouldBlock` simply re-registers
//! — under edge-triggered readiness a wake-up is a hint, not a promise.

use super::command::Command;
use super::core::ReactorHandle;
use super::poller::common::Interest;
use super::poller::unix::{sys_accept, sys_connect, sys_read, sys_socket_error, sys_write};

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::os::fd::RawFd;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Asynchronous read on a non-blocking descriptor.
///
/// Resolves with the number of bytes read; `0` means end of stream.
pub struct ReadFuture<'a> {
    fd: RawFd,
    reactor: ReactorHandle,
    buffer: &'a mut [u8],
}

impl<'a> ReadFuture<'a> {
    pub(crate) fn new(fd: RawFd, reactor: ReactorHandle, buffer: &'a mut [u8]) -> Self {
        Self {
            fd,
            reactor,
            buffer,
        }
    }
}

impl Future for ReadFuture<'_> {
    type Output = io::Result<usize>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        loop {
            let n = sys_read(this.fd, this.buffer);

            if n >= 0 {
                return Poll::Ready(Ok(n as usize));
            }

            let err = io::Error::last_os_error();

            match err.kind() {
                io::ErrorKind::WouldBlock => {
                    this.reactor.send(Command::Register {
                        fd: this.fd,
                        interest: Interest::READ,
                        waker: cx.waker().clone(),
                    });
                    return Poll::Pending;
                }
                io::ErrorKind::Interrupted => continue,
                _ => return Poll::Ready(Err(err)),
            }
        }
    }
}

/// Asynchronous write of an entire buffer.
///
/// Partial writes advance an internal cursor; the future resolves only
/// once every byte has been handed to the kernel (or an error occurred),
/// with the total number of bytes written.
pub struct WriteFuture<'a> {
    fd: RawFd,
    reactor: ReactorHandle,
    buffer: &'a [u8],
    written: usize,
}

impl<'a> WriteFuture<'a> {
    pub(crate) fn new(fd: RawFd, reactor: ReactorHandle, buffer: &'a [u8]) -> Self {
        Self {
            fd,
            reactor,
            buffer,
            written: 0,
        }
    }
}

impl Future for WriteFuture<'_> {
    type Output = io::Result<usize>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        while this.written < this.buffer.len() {
            let n = sys_write(this.fd, &this.buffer[this.written..]);

            if n > 0 {
                this.written += n as usize;
                continue;
            }

            if n == 0 {
                return Poll::Ready(Ok(this.written));
            }

            let err = io::Error::last_os_error();

            match err.kind() {
                io::ErrorKind::WouldBlock => {
                    this.reactor.send(Command::Register {
                        fd: this.fd,
                        interest: Interest::WRITE,
                        waker: cx.waker().clone(),
                    });
                    return Poll::Pending;
                }
                io::ErrorKind::Interrupted => continue,
                _ => return Poll::Ready(Err(err)),
            }
        }

        Poll::Ready(Ok(this.written))
    }
}

/// Asynchronous accept on a listening socket.
///
/// Resolves with the connected descriptor (already non-blocking) and
/// its peer address.
pub struct AcceptFuture {
    fd: RawFd,
    reactor: ReactorHandle,
}

impl AcceptFuture {
    pub(crate) fn new(fd: RawFd, reactor: ReactorHandle) -> Self {
        Self { fd, reactor }
    }
}

impl Future for AcceptFuture {
    type Output = io::Result<(RawFd, SocketAddr)>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        loop {
            match sys_accept(this.fd) {
                Ok((client_fd, addr)) => return Poll::Ready(Ok((client_fd, addr))),

                Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                    this.reactor.send(Command::Register {
                        fd: this.fd,
                        interest: Interest::READ,
                        waker: cx.waker().clone(),
                    });
                    return Poll::Pending;
                }

                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,

                Err(err) => return Poll::Ready(Err(err)),
            }
        }
    }
}

/// Asynchronous non-blocking connect.
///
/// The first poll issues the connect. On an in-progress result the
/// future suspends for write-readiness; a later poll queries `SO_ERROR`
/// for a pending failure and probes with a repeated connect to tell an
/// established connection from one still in flight, re-arming
/// write-interest in the latter case.
pub struct ConnectFuture {
    fd: RawFd,
    reactor: ReactorHandle,
    addr: SocketAddr,
    started: bool,
}

impl ConnectFuture {
    pub(crate) fn new(fd: RawFd, reactor: ReactorHandle, addr: SocketAddr) -> Self {
        Self {
            fd,
            reactor,
            addr,
            started: false,
        }
    }
}

impl Future for ConnectFuture {
    type Output = io::Result<()>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if this.started {
            // A poll here is not proof the write-readiness wake fired:
            // combinators sharing one context re-poll every sub-future
            // on any wake. SO_ERROR alone cannot tell "established"
            // from "still in flight" (both read as no error), so after
            // surfacing a pending error, re-issue the connect to
            // separate the two and keep waiting when it is still in
            // flight.
            if let Err(err) = sys_socket_error(this.fd) {
                return Poll::Ready(Err(err));
            }

            return match sys_connect(this.fd, &this.addr) {
                Ok(()) => Poll::Ready(Ok(())),

                Err(err) if err.raw_os_error() == Some(libc::EISCONN) => Poll::Ready(Ok(())),

                Err(err)
                    if err.raw_os_error() == Some(libc::EALREADY)
                        || err.raw_os_error() == Some(libc::EINPROGRESS)
                        || err.kind() == io::ErrorKind::WouldBlock =>
                {
                    this.reactor.send(Command::Register {
                        fd: this.fd,
                        interest: Interest::WRITE,
                        waker: cx.waker().clone(),
                    });

                    Poll::Pending
                }

                Err(err) => Poll::Ready(Err(err)),
            };
        }

        match sys_connect(this.fd, &this.addr) {
            // Immediate success happens on loopback.
            Ok(()) => Poll::Ready(Ok(())),

            Err(err)
                if err.kind() == io::ErrorKind::WouldBlock
                    || err.raw_os_error() == Some(libc::EINPROGRESS) =>
            {
                this.started = true;

                this.reactor.send(Command::Register {
                    fd: this.fd,
                    interest: Interest::WRITE,
                    waker: cx.waker().clone(),
                });

                Poll::Pending
            }

            Err(err) => Poll::Ready(Err(err)),
        }
    }
}
