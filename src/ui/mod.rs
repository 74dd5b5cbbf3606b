//! User interface layer built on a virtual UI tree.
//!
//! Views describe their markup as [`Node`] trees instead of mutating a live
//! document. The host adapter (browser glue, the shell binary, tests) reads the
//! attached tree from the [`Surface`].
//!
//! # Architecture
//!
//! ```text
//! route handler → ViewManager::render → View::render → Surface
//!                                     → View::mount  → API → Surface::patch_if_live
//! ```
//!
//! # Modules
//!
//! - [`node`]: Element and text nodes, lookup by id, HTML serialization
//! - [`surface`]: The root container shared by the view manager and views
//! - [`view`]: View trait, liveness tokens, and the view manager
//! - [`overlay`]: Stacked overlays wired to the modal-history coordinator
//! - [`toast`]: Bounded queue of user-facing notifications
//! - [`views`]: The page-level views of the client

pub mod node;
pub mod overlay;
pub mod surface;
pub mod toast;
pub mod view;
pub mod views;

pub use node::{link, Element, Node, LINK_ATTR};
pub use overlay::{Overlay, OverlayKind, OverlayStack};
pub use surface::Surface;
pub use toast::{Toast, ToastLevel, Toasts};
pub use view::{MountContext, SharedViews, View, ViewManager, ViewToken};
