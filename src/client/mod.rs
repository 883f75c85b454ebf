//! Browser assistant - the generic API caller, panel logic and its HTTP surface

pub mod api_client;
pub mod assistant;
pub mod server;

pub use api_client::{ApiClient, ApiError, ApiOutcome};
pub use assistant::{plan, run_panel, Panel, PanelPlan, PanelRequest, PanelResponse, ServiceChoice};
pub use server::{create_client_router, ClientState};
