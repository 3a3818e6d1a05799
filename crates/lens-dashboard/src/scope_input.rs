//! The scope input box: type a label, tab to complete, enter to add.

use crate::dashboard::LensDashboard;
use crate::keys::KeyInput;

impl LensDashboard<'_> {
    pub fn open_scope_input(&mut self) {
        self.scope_input = Some(String::new());
        self.refresh_scroll();
    }

    pub fn close_scope_input(&mut self) {
        if self.scope_input.take().is_some() {
            self.refresh_scroll();
        }
    }

    #[must_use]
    pub const fn is_scope_input_open(&self) -> bool {
        self.scope_input.is_some()
    }

    /// Text typed so far; empty when the box is closed.
    #[must_use]
    pub fn scope_input_text(&self) -> &str {
        self.scope_input.as_deref().unwrap_or("")
    }

    /// Route one key to the open input box. Returns whether the key was
    /// consumed and a status message.
    pub fn handle_scope_input_key(&mut self, key: &KeyInput) -> (bool, String) {
        let Some(text) = self.scope_input.as_mut() else {
            return (false, String::new());
        };
        match key {
            KeyInput::Esc => {
                self.close_scope_input();
                (true, "Scope input cancelled".into())
            }
            KeyInput::Enter => {
                let typed = text.trim().to_string();
                if typed.is_empty() {
                    self.close_scope_input();
                    return (true, String::new());
                }
                self.submit_scope_label(&typed)
            }
            KeyInput::Backspace | KeyInput::Ctrl('h') => {
                text.pop();
                (true, String::new())
            }
            KeyInput::Tab => {
                if !text.is_empty() {
                    let prefix = text.to_lowercase();
                    if let Some(label) = self
                        .available_scope_labels()
                        .into_iter()
                        .find(|l| l.to_lowercase().starts_with(&prefix))
                    {
                        self.scope_input = Some(label);
                    }
                }
                (true, String::new())
            }
            KeyInput::Char(c) if c.is_ascii() && !c.is_ascii_control() => {
                text.push(*c);
                (true, String::new())
            }
            _ => (false, String::new()),
        }
    }

    fn submit_scope_label(&mut self, typed: &str) -> (bool, String) {
        // First case-insensitive match in catalog order, keeping its case.
        let found = self
            .catalog
            .issues()
            .iter()
            .flat_map(|issue| issue.labels.iter())
            .find(|l| l.eq_ignore_ascii_case(typed))
            .cloned();
        let Some(label) = found else {
            if let Some(text) = self.scope_input.as_mut() {
                text.clear();
            }
            return (true, format!("Label '{typed}' not found"));
        };
        self.close_scope_input();
        if self.scope_labels().contains(&label) {
            return (true, format!("'{label}' already in scope"));
        }
        self.add_scope_label(&label);
        (true, format!("Added '{label}' to scope ({} mode)", self.scope_mode().keyword()))
    }
}
