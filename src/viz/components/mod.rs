pub mod help;
pub mod log;
pub mod plot;
pub mod world;

use crossterm::event::Event;
pub use self::log::Logs;
pub use plot::Plots;
use ratatui::widgets::WidgetRef;
pub use world::World;

/// A tab of the TUI that can react to key presses
pub trait Component: WidgetRef {
    /// **Returns** whether the event was consumed
    fn handle_ui_event(&mut self, event: &Event) -> bool;
}
