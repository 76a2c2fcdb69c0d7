use super::command::Command;
use super::event::Event;
use super::io::IoHandler;
use super::poller::common::Interest;
use super::poller::{EpollPoller, PollerWaker};
use super::timer::TimerQueue;

use std::collections::{HashMap, VecDeque};
use std::io;
use std::mem;
use std::os::fd::RawFd;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::task::Waker;
use std::thread;
use std::time::Instant;

/// Cloneable handle used to submit commands to the reactor thread.
///
/// Sending wakes the poller, so a command submitted mid-poll is picked
/// up without waiting for the current timeout to elapse.
#[derive(Clone)]
pub(crate) struct ReactorHandle {
    sender: Sender<Command>,
    waker: Arc<PollerWaker>,
}

impl ReactorHandle {
    /// Submits a command. Sends after the reactor has exited are
    /// silently dropped.
    pub(crate) fn send(&self, command: Command) {
        if self.sender.send(command).is_ok() {
            self.waker.wake();
        }
    }
}

/// The single-threaded event loop at the heart of the runtime.
///
/// The reactor owns the readiness poller, a map of per-descriptor
/// registrations, a ready queue of wakers and the timer store. All of
/// them are touched only on the reactor thread; the rest of the runtime
/// talks to it through [`ReactorHandle`].
pub(crate) struct Reactor {
    /// Command input from every other thread.
    receiver: Receiver<Command>,

    /// Edge-triggered readiness multiplexer.
    poller: EpollPoller,

    /// Reusable buffer of events reported by the poller.
    events: Vec<Event>,

    /// Wakers made ready by the previous cycle, resumed at the top of
    /// the next one.
    ready: VecDeque<Waker>,

    /// Registration state per descriptor; at most one pending waker each.
    handlers: HashMap<RawFd, IoHandler>,

    /// Deadline-ordered timer store.
    timers: TimerQueue,
}

impl Reactor {
    /// Starts the reactor on its own dedicated thread.
    ///
    /// Returns the command handle and the join handle of the reactor
    /// thread.
    pub(crate) fn start() -> io::Result<(ReactorHandle, thread::JoinHandle<()>)> {
        let (sender, receiver) = channel();
        let poller = EpollPoller::new()?;

        let handle = ReactorHandle {
            sender,
            waker: poller.waker(),
        };

        let mut reactor = Reactor {
            receiver,
            poller,
            events: Vec::with_capacity(64),
            ready: VecDeque::new(),
            handlers: HashMap::new(),
            timers: TimerQueue::new(),
        };

        let join = thread::Builder::new()
            .name("spindle-reactor".into())
            .spawn(move || reactor.run())?;

        Ok((handle, join))
    }

    /// The event loop. Each iteration:
    ///
    /// 1. resumes every waker made ready by the previous cycle,
    /// 2. applies pending commands,
    /// 3. fires due timers and derives the next poll timeout from the
    ///    earliest remaining deadline (bounded when none remain),
    /// 4. waits for readiness and moves the affected wakers into the
    ///    ready queue.
    ///
    /// The loop exits on [`Command::Shutdown`] or on an unrecoverable
    /// poller error; pending registrations are not resumed in either
    /// case.
    fn run(&mut self) {
        tracing::debug!("reactor started");

        loop {
            for waker in mem::take(&mut self.ready) {
                waker.wake();
            }

            while let Ok(command) = self.receiver.try_recv() {
                if self.handle_command(command) {
                    tracing::debug!("reactor shut down");
                    return;
                }
            }

            let timeout = self.timers.fire_due(Instant::now());

            if let Err(err) = self.poller.poll(&mut self.events, timeout) {
                tracing::error!(error = %err, "poller failed; reactor stopping");
                return;
            }

            let mut events = mem::take(&mut self.events);
            for event in events.drain(..) {
                self.handle_event(event);
            }
            self.events = events;
        }
    }

    /// Applies one command. Returns `true` on shutdown.
    fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Register {
                fd,
                interest,
                waker,
            } => self.register(fd, interest, waker),

            Command::Deregister { fd } => {
                if self.handlers.remove(&fd).is_some() {
                    self.poller.deregister(fd);
                }
            }

            Command::AddTimer {
                id,
                deadline,
                callback,
            } => self.timers.insert(id, deadline, callback),

            Command::CancelTimer { id } => self.timers.cancel(id),

            Command::Shutdown => return true,
        }

        false
    }

    /// Adds or replaces the registration for `fd`.
    ///
    /// A re-registration replaces both the interest and the stored
    /// waker, so a descriptor never carries more than one pending
    /// waiter. On poller failure the waiter is woken immediately; its
    /// retried syscall surfaces the underlying error.
    fn register(&mut self, fd: RawFd, interest: Interest, waker: Waker) {
        let result = if self.handlers.contains_key(&fd) {
            self.poller.reregister(fd, interest)
        } else {
            self.poller.register(fd, interest)
        };

        match result {
            Ok(()) => {
                self.handlers.insert(
                    fd,
                    IoHandler {
                        interest,
                        waker: Some(waker),
                    },
                );
            }
            Err(err) => {
                tracing::error!(fd, error = %err, "descriptor registration failed");
                self.handlers.remove(&fd);
                waker.wake();
            }
        }
    }

    /// Moves the pending waker of a ready descriptor into the ready
    /// queue.
    ///
    /// The waker is taken out of the handler, so further events for the
    /// same descriptor in this cycle find nothing to deliver; the entry
    /// is re-armed only by the next registration.
    fn handle_event(&mut self, event: Event) {
        let Some(handler) = self.handlers.get_mut(&event.fd) else {
            return;
        };

        let wanted = (event.readable && handler.interest.read)
            || (event.writable && handler.interest.write);

        if !wanted {
            return;
        }

        if let Some(waker) = handler.waker.take() {
            self.ready.push_back(waker);
        }
    }
}
