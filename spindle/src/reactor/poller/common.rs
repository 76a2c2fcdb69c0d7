/// Readiness interest attached to a registered descriptor.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Interest {
    pub(crate) read: bool,
    pub(crate) write: bool,
}

impl Interest {
    /// Read readiness only.
    pub(crate) const READ: Interest = Interest {
        read: true,
        write: false,
    };

    /// Write readiness only.
    pub(crate) const WRITE: Interest = Interest {
        read: false,
        write: true,
    };
}
