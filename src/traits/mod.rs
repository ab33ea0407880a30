mod control_plane;
mod task_queue;
mod transport;

pub use control_plane::ControlPlane;
pub use task_queue::{Submission, TaskQueue};
pub use transport::{BackendResponse, WorkerTransport};
