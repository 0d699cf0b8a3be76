pub mod state;
pub mod view;

pub use state::{DashboardError, DashboardState, EditMode, EditSession, FieldEdit};
pub use view::{CampaignView, DashboardView};
