pub mod app_state;
pub mod cohort;
pub mod panel_state;
pub mod theme;
pub mod user_record;

pub use app_state::AppState;
pub use cohort::{Action, Cohort};
pub use panel_state::{CohortState, PanelState};
pub use theme::{Theme, THEME_KEY};
pub use user_record::UserRecord;
