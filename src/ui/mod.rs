//! 终端界面：键盘事件（event）、ratatui 渲染（render）、主循环（app）

pub mod app;
pub mod event;
pub mod render;

pub use app::run_app;
pub use event::{map_key, EventHandler, InputState};
pub use render::draw;
