//! Modal dialog shell: page scroll lock, initial focus, Tab containment and
//! the close affordances. The open flag belongs to the host.

use crate::presentation::events::{FocusRequest, Handled, Key, KeyEvent, PointerTarget};
use crate::presentation::scroll_lock::{ScrollLock, ScrollLockGuard};

/// Kind of a rendered descendant, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Link,
    Button,
    Input,
    Select,
    Textarea,
    /// An open options panel (`role="listbox"`).
    Listbox,
    /// Any element with a non-negative `tabindex`.
    Tabbable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogElement {
    pub kind: ElementKind,
    pub disabled: bool,
}

impl DialogElement {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            disabled: false,
        }
    }

    pub fn disabled(kind: ElementKind) -> Self {
        Self {
            kind,
            disabled: true,
        }
    }

    fn in_tab_ring(&self) -> bool {
        match self.kind {
            ElementKind::Button => !self.disabled,
            ElementKind::Listbox => false,
            _ => true,
        }
    }

    fn takes_initial_focus(&self) -> bool {
        !self.disabled
            && matches!(
                self.kind,
                ElementKind::Input
                    | ElementKind::Listbox
                    | ElementKind::Textarea
                    | ElementKind::Button
            )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogResponse {
    pub handled: Handled,
    pub close: bool,
}

impl DialogResponse {
    fn ignored() -> Self {
        Self {
            handled: Handled::ignored(),
            close: false,
        }
    }

    fn focus(focus: FocusRequest) -> Self {
        Self {
            handled: Handled::consumed(focus),
            close: false,
        }
    }

    fn close() -> Self {
        Self {
            handled: Handled::ignored(),
            close: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogView {
    pub role: &'static str,
    pub aria_modal: &'static str,
    pub aria_labelledby: String,
}

#[derive(Debug)]
pub struct DialogShell {
    title_id: String,
    scroll_lock: ScrollLock,
    guard: Option<ScrollLockGuard>,
    elements: Vec<DialogElement>,
    focus_pending: bool,
}

impl DialogShell {
    pub fn new(title_id: impl Into<String>, scroll_lock: ScrollLock) -> Self {
        Self {
            title_id: title_id.into(),
            scroll_lock,
            guard: None,
            elements: Vec::new(),
            focus_pending: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.guard.is_some()
    }

    pub fn scroll_lock(&self) -> &ScrollLock {
        &self.scroll_lock
    }

    /// Follows the host's open flag. `elements` is the rendered content in
    /// document order and is refreshed on every call.
    pub fn sync_open(&mut self, open: bool, elements: Vec<DialogElement>) {
        self.elements = elements;
        match (open, self.guard.is_some()) {
            (true, false) => {
                self.guard = Some(self.scroll_lock.acquire());
                self.focus_pending = true;
            }
            (false, true) => {
                self.guard = None;
                self.focus_pending = false;
            }
            _ => {}
        }
    }

    pub fn set_elements(&mut self, elements: Vec<DialogElement>) {
        self.elements = elements;
    }

    /// Resolves the focus deferred by opening. Later renders leave focus alone.
    pub fn after_render(&mut self) -> FocusRequest {
        if !std::mem::take(&mut self.focus_pending) {
            return FocusRequest::Unchanged;
        }
        self.elements
            .iter()
            .position(DialogElement::takes_initial_focus)
            .map(FocusRequest::Descendant)
            .unwrap_or_default()
    }

    /// `focused` is the index of the focused element within the rendered list.
    pub fn handle_key(&self, event: KeyEvent, focused: Option<usize>) -> DialogResponse {
        if !self.is_open() {
            return DialogResponse::ignored();
        }
        match event.key {
            Key::Escape => DialogResponse::close(),
            Key::Tab => self.wrap_tab(event.shift, focused),
            _ => DialogResponse::ignored(),
        }
    }

    fn wrap_tab(&self, backwards: bool, focused: Option<usize>) -> DialogResponse {
        let ring: Vec<usize> = self
            .elements
            .iter()
            .enumerate()
            .filter(|(_, element)| element.in_tab_ring())
            .map(|(index, _)| index)
            .collect();
        let (Some(&first), Some(&last)) = (ring.first(), ring.last()) else {
            return DialogResponse::ignored();
        };
        match focused {
            Some(index) if backwards && index == first => {
                DialogResponse::focus(FocusRequest::Descendant(last))
            }
            Some(index) if !backwards && index == last => {
                DialogResponse::focus(FocusRequest::Descendant(first))
            }
            _ => DialogResponse::ignored(),
        }
    }

    /// Returns true when the press should close the dialog.
    pub fn pointer_down(&self, target: PointerTarget) -> bool {
        self.is_open() && target == PointerTarget::Backdrop
    }

    pub fn view(&self) -> DialogView {
        DialogView {
            role: "dialog",
            aria_modal: "true",
            aria_labelledby: self.title_id.clone(),
        }
    }
}
