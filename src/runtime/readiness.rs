use std::io;
use std::os::fd::RawFd;
use std::time::Duration;

/// Wait up to `timeout` for any of `descriptors` to become readable.
///
/// Hang-ups and errors count as readable so the caller observes them on its
/// next read. An interrupted wait reports nothing ready. A descriptor that is
/// not open fails the wait with `InvalidInput`, since polling it again would
/// return immediately forever.
pub fn poll_readable(descriptors: &[RawFd], timeout: Duration) -> io::Result<Vec<RawFd>> {
    let mut fds: Vec<libc::pollfd> = descriptors
        .iter()
        .map(|&fd| libc::pollfd {
            fd,
            events: libc::POLLIN,
            revents: 0,
        })
        .collect();
    let millis = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;

    // SAFETY: `fds` is a live, correctly sized array of pollfd records.
    let rc = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, millis) };
    if rc < 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(Vec::new());
        }
        return Err(err);
    }

    if let Some(stale) = fds.iter().find(|fd| fd.revents & libc::POLLNVAL != 0) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("descriptor {} is not open", stale.fd),
        ));
    }

    let ready = libc::POLLIN | libc::POLLHUP | libc::POLLERR;
    Ok(fds
        .iter()
        .filter(|fd| fd.revents & ready != 0)
        .map(|fd| fd.fd)
        .collect())
}
