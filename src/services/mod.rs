pub mod posters;
pub mod providers;
pub mod provisioning;
pub mod recommendations;

pub use posters::{Delay, PosterResolver, RetryPolicy, TokioDelay};
pub use provisioning::{Provisioner, UploadOutcome};
