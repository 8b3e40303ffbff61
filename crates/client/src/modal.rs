//! Overlay primitives. They only track open/closed and translate input into
//! close or confirm requests; the owner decides what happens next.

/// Keys an overlay reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    Other(char),
}

/// What the owner of an overlay is asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAction {
    None,
    RequestClose,
    Confirm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal {
    title: String,
    open: bool,
}

impl Modal {
    /// A closed modal with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            open: false,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Escape asks to close; keys are ignored while closed.
    pub fn on_key(&self, key: Key) -> ModalAction {
        match (self.open, key) {
            (true, Key::Escape) => ModalAction::RequestClose,
            _ => ModalAction::None,
        }
    }

    /// Clicking the backdrop asks to close.
    pub fn on_overlay_click(&self) -> ModalAction {
        if self.open {
            ModalAction::RequestClose
        } else {
            ModalAction::None
        }
    }
}

/// Styling of the confirm button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Danger,
    Primary,
}

/// A modal asking a yes/no question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmModal {
    modal: Modal,
    message: String,
    confirm_text: String,
    cancel_text: String,
    tone: Tone,
}

impl ConfirmModal {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            modal: Modal::new(title),
            message: message.into(),
            confirm_text: "Confirm".to_string(),
            cancel_text: "Cancel".to_string(),
            tone: Tone::default(),
        }
    }

    pub fn confirm_text(mut self, text: impl Into<String>) -> Self {
        self.confirm_text = text.into();
        self
    }

    pub fn cancel_text(mut self, text: impl Into<String>) -> Self {
        self.cancel_text = text.into();
        self
    }

    pub fn tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn labels(&self) -> (&str, &str) {
        (&self.confirm_text, &self.cancel_text)
    }

    pub fn current_tone(&self) -> Tone {
        self.tone
    }

    pub fn open(&mut self) {
        self.modal.open();
    }

    pub fn close(&mut self) {
        self.modal.close();
    }

    pub fn is_open(&self) -> bool {
        self.modal.is_open()
    }

    pub fn on_key(&self, key: Key) -> ModalAction {
        self.modal.on_key(key)
    }

    pub fn on_overlay_click(&self) -> ModalAction {
        self.modal.on_overlay_click()
    }

    pub fn on_confirm_click(&self) -> ModalAction {
        if self.is_open() {
            ModalAction::Confirm
        } else {
            ModalAction::None
        }
    }

    pub fn on_cancel_click(&self) -> ModalAction {
        if self.is_open() {
            ModalAction::RequestClose
        } else {
            ModalAction::None
        }
    }
}
