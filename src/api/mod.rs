// Backend API modules
pub mod client;
pub mod invites;
pub mod membership;
pub mod users;

// Re-export commonly used items
pub use client::{build_http_client, set_silent, ApiClient, ApiError, Navigator, PendingNavigation};
pub use invites::{create_invite, InviteForm, InviteFormError, InviteRequest, InviteResponse};
pub use membership::{demote, pk_value, promote, transition};
pub use users::{list_cohort, CohortListing};
