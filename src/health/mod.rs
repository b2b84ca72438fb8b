// ABOUTME: Health verification of blue, green, and production endpoints.
// ABOUTME: Exports the prober seam, HTTP implementation, and threshold aggregation.

mod checker;
mod prober;
mod result;

pub use checker::{CheckTarget, EnvironmentHealth, check_environment, meets_threshold};
pub use prober::{HealthProber, HttpProber, join_url};
pub use result::{HealthCheckResult, HealthStatus};
