pub mod clock;
pub mod credentials;
pub mod manager;

pub use clock::{Clock, ManualClock, SystemClock};
pub use credentials::{CredentialService, MockCredentialService};
pub use manager::{SESSION_DURATION, SessionManager};
