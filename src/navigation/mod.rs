//! Navigation core: routing and overlay-aware history.
//!
//! This layer is independent of any rendering strategy. It talks to the
//! platform only through the [`History`] trait.
//!
//! # Modules
//!
//! - [`history`]: History trait and an in-process implementation
//! - [`pattern`]: Route pattern compilation and query parsing
//! - [`modal`]: Overlay/back-button coordinator
//! - [`router`]: First-match router with link interception
//!
//! # Flow
//!
//! ```text
//! click on <a data-link> ─▶ Router::navigate ─▶ History::push_state ─▶ handler
//! popstate ─▶ Router::handle_pop_state ─▶ ModalHistory::on_browser_back
//!                                            ├─ Handled    → stop (overlays close)
//!                                            └─ NotHandled → resolve location
//! ```

pub mod history;
pub mod modal;
pub mod pattern;
pub mod router;

pub use history::{History, HistoryState, MemoryHistory, PopStateEvent};
pub use modal::{CloseAllOverlays, ModalHistory, ModalState, PopDisposition};
pub use pattern::{parse_query, split_location, Params, RoutePattern};
pub use router::{Navigation, RouteHandler, Router};
