/*!

Identity-addressed access to the cluster under test.

!*/

mod error;
mod http_status_code;
mod identity;
mod object_client;

pub use error::{Error, Result};
pub use http_status_code::{AllowNotFound, HttpStatusCode, StatusCode};
pub use identity::ResourceIdentity;
pub use object_client::{K8sObjectClient, ObjectClient, Observable};
