/**
 * Shared Types Module
 *
 * View states for the egui app.
 */

/// Current app view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppView {
    /// Ask for the display name shown to other participants
    #[default]
    Name,
    /// Create a document or join one by id
    Home,
    /// Editing an open document
    Editor,
}
