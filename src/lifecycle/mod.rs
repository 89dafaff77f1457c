//! Cache lifecycle: configuration, stage tracking, the derived cache and
//! the read-only views consumers query it through.

pub mod config;
pub mod derived;
pub mod geometry_view;
pub mod stage;
pub mod view;

pub use config::MeshConfig;
pub use derived::DerivedCache;
pub use geometry_view::{GeometryView, Mode};
pub use stage::{Stage, StageState};
pub use view::{ConnectivityView, CornerView, MeshView, SideView, WedgeView};
