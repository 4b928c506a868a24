//! Inline button markup

use serde::{Deserialize, Serialize};

/// One inline button. `data` is echoed back when the button is pressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub text: String,
    pub data: String,
}

impl Button {
    pub fn new(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            data: data.into(),
        }
    }
}

/// Rows of inline buttons
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markup {
    pub rows: Vec<Vec<Button>>,
}

impl Markup {
    /// Single row of buttons
    pub fn row(buttons: Vec<Button>) -> Self {
        Self { rows: vec![buttons] }
    }

    pub fn with_row(mut self, buttons: Vec<Button>) -> Self {
        self.rows.push(buttons);
        self
    }

    /// All buttons, row by row
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }

    /// Whether a button carries this callback data
    pub fn contains(&self, data: &str) -> bool {
        self.buttons().any(|b| b.data == data)
    }
}
