//! File-descriptor level stdout redirection

use std::fs::File;
use std::io::{self, Write};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};

fn cvt(ret: libc::c_int) -> io::Result<libc::c_int> {
    if ret < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(ret)
    }
}

fn dup2_retry(src: RawFd, dst: RawFd) -> io::Result<()> {
    loop {
        // SAFETY: dup2 only manipulates the descriptor table; both fds are valid here.
        match cvt(unsafe { libc::dup2(src, dst) }) {
            Ok(_) => return Ok(()),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

fn set_cloexec(fd: RawFd) -> io::Result<()> {
    // SAFETY: F_SETFD on a descriptor we own.
    cvt(unsafe { libc::fcntl(fd, libc::F_SETFD, libc::FD_CLOEXEC) }).map(|_| ())
}

/// Anonymous pipe as (read end, write end).
pub(crate) fn pipe() -> io::Result<(File, OwnedFd)> {
    let mut fds = [0 as libc::c_int; 2];
    // SAFETY: fds has room for the two descriptors pipe() writes.
    cvt(unsafe { libc::pipe(fds.as_mut_ptr()) })?;
    // SAFETY: pipe() succeeded, so both descriptors are fresh and owned by us.
    let (read, write) = unsafe { (File::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };
    set_cloexec(read.as_raw_fd())?;
    set_cloexec(write.as_raw_fd())?;
    Ok((read, write))
}

/// Points fd 1 somewhere else until restored or dropped.
pub(crate) struct StdoutRedirect {
    saved: OwnedFd,
    restored: bool,
}

impl StdoutRedirect {
    pub(crate) fn to(target: &impl AsRawFd) -> io::Result<Self> {
        io::stdout().flush()?;
        // SAFETY: duplicating stdout; the new descriptor is owned below.
        let saved = cvt(unsafe { libc::dup(libc::STDOUT_FILENO) })?;
        // SAFETY: dup() returned a fresh descriptor.
        let saved = unsafe { OwnedFd::from_raw_fd(saved) };
        set_cloexec(saved.as_raw_fd())?;
        dup2_retry(target.as_raw_fd(), libc::STDOUT_FILENO)?;
        Ok(Self {
            saved,
            restored: false,
        })
    }

    /// A handle on the stdout that was in place before the redirect.
    pub(crate) fn terminal(&self) -> io::Result<File> {
        Ok(File::from(self.saved.try_clone()?))
    }

    pub(crate) fn restore(&mut self) -> io::Result<()> {
        if self.restored {
            return Ok(());
        }
        let flushed = io::stdout().flush();
        dup2_retry(self.saved.as_raw_fd(), libc::STDOUT_FILENO)?;
        self.restored = true;
        flushed
    }
}

impl Drop for StdoutRedirect {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}
