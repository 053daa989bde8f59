// ABOUTME: Runtime connection errors.
// ABOUTME: Wraps bollard connection failures with context via snafu.

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConnectError {
    #[snafu(display("failed to connect to container runtime socket: {source}"))]
    Socket { source: bollard::errors::Error },

    #[snafu(display("container runtime did not answer ping: {source}"))]
    Ping { source: bollard::errors::Error },
}
