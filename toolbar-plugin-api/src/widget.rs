//! Toolkit-independent widget handles

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Icon shown for widgets that don't pick one.
pub const DEFAULT_ICON: &str = "application-x-executable";

/// Something the host can place on the toolbar.
///
/// The host decides how to draw it; `render` is the plain-text form used by
/// the headless shell.
pub trait Widget: Send + Sync {
    /// Label shown on the toolbar button
    fn title(&self) -> String;

    /// Theme icon name
    fn icon(&self) -> String {
        DEFAULT_ICON.to_string()
    }

    /// Hover text
    fn tooltip(&self) -> String {
        String::new()
    }

    /// Text rendering of the widget's current contents
    fn render(&self) -> String {
        self.title()
    }
}

/// Opaque, cheaply cloneable reference to a plugin's widget.
///
/// Two handles are equal only when they point at the same widget.
#[derive(Clone)]
pub struct UiHandle(Arc<dyn Widget>);

impl UiHandle {
    pub fn new<W: Widget + 'static>(widget: W) -> Self {
        Self(Arc::new(widget))
    }

    pub fn from_arc(widget: Arc<dyn Widget>) -> Self {
        Self(widget)
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl Deref for UiHandle {
    type Target = dyn Widget;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl PartialEq for UiHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for UiHandle {}

impl fmt::Debug for UiHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiHandle")
            .field("title", &self.0.title())
            .field("icon", &self.0.icon())
            .finish()
    }
}

/// Static text widget: a title, an icon and a few lines of body text.
#[derive(Debug, Clone)]
pub struct TextWidget {
    title: String,
    icon: String,
    tooltip: String,
    lines: Vec<String>,
}

impl TextWidget {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            icon: DEFAULT_ICON.to_string(),
            tooltip: String::new(),
            lines: Vec::new(),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = tooltip.into();
        self
    }

    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }
}

impl Widget for TextWidget {
    fn title(&self) -> String {
        self.title.clone()
    }

    fn icon(&self) -> String {
        self.icon.clone()
    }

    fn tooltip(&self) -> String {
        self.tooltip.clone()
    }

    fn render(&self) -> String {
        let mut out = format!("[{}] {}", self.icon, self.title);
        for line in &self.lines {
            out.push_str("\n    ");
            out.push_str(line);
        }
        out
    }
}
