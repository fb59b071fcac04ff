use crate::clients::{HttpStatusCode, ResourceIdentity, StatusCode};
use snafu::Snafu;

/// The `Result` type returned by `clients`.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type returned by [`ObjectClient`](crate::clients::ObjectClient) implementations.
/// Variants are public so that alternative clients (e.g. test doubles) can report failures in the
/// same terms as the Kubernetes client.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Error initializing the Kubernetes client: {}", source))]
    Initialization { source: kube::Error },

    #[snafu(display("Unable to read kubeconfig: {}", source))]
    ConfigRead {
        source: kube::config::KubeconfigError,
    },

    #[snafu(display("Unable to create client from kubeconfig: {}", source))]
    ClientCreateKubeconfig {
        source: kube::config::KubeconfigError,
    },

    #[snafu(display("Unable to {} {}: {}", method, what, source))]
    KubeApiCall {
        method: String,
        what: String,
        source: kube::Error,
    },

    #[snafu(display("Unable to {} {}: {}", method, what, message))]
    RequestFailed {
        method: String,
        what: String,
        message: String,
    },

    #[snafu(display("Unable to deserialize {}: {}", what, source))]
    Serde {
        what: String,
        source: serde_json::Error,
    },

    #[snafu(display("{} cannot be read as a '{}'", identity, requested))]
    KindMismatch {
        identity: ResourceIdentity,
        requested: String,
    },

    #[snafu(display("Unable to {} a '{}' without a name", method, kind))]
    MissingName { method: String, kind: String },
}

impl HttpStatusCode for Error {
    fn status_code(&self) -> Option<StatusCode> {
        match self {
            Error::KubeApiCall { source, .. } => source.status_code(),
            Error::Initialization { .. }
            | Error::ConfigRead { .. }
            | Error::ClientCreateKubeconfig { .. }
            | Error::RequestFailed { .. }
            | Error::Serde { .. }
            | Error::KindMismatch { .. }
            | Error::MissingName { .. } => None,
        }
    }
}
