//! Custom single-select popover with listbox semantics.
//!
//! The widget is generic over [`SelectOption`] and does not own the selected
//! value; the caller passes it in and receives changes through a callback.

use crate::domain::models::SelectOption;
use crate::presentation::events::{FocusRequest, Handled, Key, KeyEvent, PointerTarget};

pub const DEFAULT_PLACEHOLDER: &str = "Select…";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectState {
    name: String,
    options: Vec<SelectOption>,
    placeholder: String,
    open: bool,
    active: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerView {
    pub text: String,
    pub is_placeholder: bool,
    pub aria_haspopup: &'static str,
    pub aria_expanded: bool,
    pub aria_controls: String,
    pub has_error: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub index: usize,
    pub label: String,
    pub value: String,
    pub role: &'static str,
    pub aria_selected: bool,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListboxView {
    pub id: String,
    pub role: &'static str,
    pub options: Vec<OptionView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectView {
    pub trigger: TriggerView,
    pub listbox: Option<ListboxView>,
}

impl SelectState {
    pub fn new(name: impl Into<String>, options: Vec<SelectOption>, selected: &str) -> Self {
        let active = position_of(&options, selected).unwrap_or(0);
        Self {
            name: name.into(),
            options,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            open: false,
            active,
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn active_index(&self) -> Option<usize> {
        (!self.options.is_empty()).then_some(self.active)
    }

    pub fn listbox_id(&self) -> String {
        format!("{}-listbox", self.name)
    }

    /// Replaces the options, keeping the active index on the selection when
    /// it survived and inside bounds otherwise.
    pub fn set_options(&mut self, options: Vec<SelectOption>, selected: &str) {
        self.active = position_of(&options, selected)
            .unwrap_or_else(|| self.active.min(options.len().saturating_sub(1)));
        self.options = options;
    }

    pub fn label_for(&self, value: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|option| option.value == value)
            .map(|option| option.label.as_str())
    }

    pub fn open(&mut self, selected: &str) -> FocusRequest {
        if let Some(index) = position_of(&self.options, selected) {
            self.active = index;
        }
        self.open = true;
        self.active_index()
            .map(FocusRequest::Option)
            .unwrap_or_default()
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn toggle(&mut self, selected: &str) -> FocusRequest {
        if self.open {
            self.close();
            FocusRequest::Unchanged
        } else {
            self.open(selected)
        }
    }

    /// Keyboard handling for the open panel. Closed panels ignore keys.
    pub fn handle_key(&mut self, event: KeyEvent, on_change: impl FnOnce(&str)) -> Handled {
        if !self.open {
            return Handled::ignored();
        }
        match event.key {
            Key::Enter => match self.select_at(self.active, on_change) {
                FocusRequest::Unchanged => Handled::ignored(),
                focus => Handled::consumed(focus),
            },
            Key::Escape => {
                self.close();
                Handled::consumed(FocusRequest::Trigger)
            }
            Key::ArrowDown if !self.options.is_empty() => {
                self.active = (self.active + 1).min(self.options.len() - 1);
                Handled::consumed(FocusRequest::Option(self.active))
            }
            Key::ArrowUp if !self.options.is_empty() => {
                self.active = self.active.saturating_sub(1);
                Handled::consumed(FocusRequest::Option(self.active))
            }
            _ => Handled::ignored(),
        }
    }

    /// Selects by index (pointer or Enter). Out-of-range indexes do nothing.
    pub fn select_at(&mut self, index: usize, on_change: impl FnOnce(&str)) -> FocusRequest {
        let Some(option) = self.options.get(index) else {
            return FocusRequest::Unchanged;
        };
        on_change(&option.value);
        self.active = index;
        self.open = false;
        FocusRequest::Trigger
    }

    /// Closes on presses outside the trigger and panel. Returns whether it closed.
    pub fn pointer_down(&mut self, target: PointerTarget) -> bool {
        if !self.open || matches!(target, PointerTarget::Trigger | PointerTarget::Panel) {
            return false;
        }
        self.close();
        true
    }

    pub fn view(&self, selected: &str, has_error: bool) -> SelectView {
        let label = self.label_for(selected);
        let trigger = TriggerView {
            text: label.unwrap_or(&self.placeholder).to_string(),
            is_placeholder: label.is_none(),
            aria_haspopup: "listbox",
            aria_expanded: self.open,
            aria_controls: self.listbox_id(),
            has_error,
        };
        let listbox = self.open.then(|| ListboxView {
            id: self.listbox_id(),
            role: "listbox",
            options: self
                .options
                .iter()
                .enumerate()
                .map(|(index, option)| OptionView {
                    index,
                    label: option.label.clone(),
                    value: option.value.clone(),
                    role: "option",
                    aria_selected: option.value == selected,
                    active: index == self.active,
                })
                .collect(),
        });
        SelectView { trigger, listbox }
    }
}

fn position_of(options: &[SelectOption], value: &str) -> Option<usize> {
    options.iter().position(|option| option.value == value)
}
