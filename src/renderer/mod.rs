//! Rendering module
//!
//! `shapes` builds a display list from a simulation snapshot; `canvas` draws
//! it with the browser's 2D context. `chart` animates the backdrop.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod chart;
pub mod shapes;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;
pub use chart::PriceChart;
pub use shapes::{Color, DrawCmd, FrameStyle, build_frame, css_color, palette};
