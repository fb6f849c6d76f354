//! Input and focus vocabulary shared by the widgets.
//!
//! Hosts translate DOM (or terminal) events into these types and apply the
//! returned [`FocusRequest`]s after rendering.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    ArrowDown,
    ArrowUp,
    Tab,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub shift: bool,
}

impl KeyEvent {
    pub fn plain(key: Key) -> Self {
        Self { key, shift: false }
    }

    pub fn shifted(key: Key) -> Self {
        Self { key, shift: true }
    }
}

/// Where a pointer press landed relative to a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// The select trigger button.
    Trigger,
    /// The open options panel or anything inside it.
    Panel,
    /// The dialog backdrop element itself, not a descendant.
    Backdrop,
    /// A descendant of the dialog content.
    Content,
    Outside,
}

/// Focus the host should move to once the current render has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusRequest {
    #[default]
    Unchanged,
    Trigger,
    Option(usize),
    Descendant(usize),
}

/// Whether the host should suppress the browser default for the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handled {
    pub prevent_default: bool,
    pub focus: FocusRequest,
}

impl Handled {
    pub fn ignored() -> Self {
        Self {
            prevent_default: false,
            focus: FocusRequest::Unchanged,
        }
    }

    pub fn consumed(focus: FocusRequest) -> Self {
        Self {
            prevent_default: true,
            focus,
        }
    }
}
