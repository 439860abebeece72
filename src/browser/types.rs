//! Render request types.

use url::Url;

/// What to render and how to tell when it is ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub url: Url,
    /// Poll for this selector before reading markup.
    pub ready_selector: Option<String>,
    /// Click performed after the page is ready.
    pub interaction: Option<Interaction>,
}

impl RenderRequest {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            ready_selector: None,
            interaction: None,
        }
    }

    pub fn wait_for(mut self, selector: impl Into<String>) -> Self {
        self.ready_selector = Some(selector.into());
        self
    }

    pub fn interact(mut self, interaction: Interaction) -> Self {
        self.interaction = Some(interaction);
        self
    }
}

/// A click on `click`, optionally followed by a wait for `reveal`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    pub click: String,
    pub reveal: Option<String>,
}

impl Interaction {
    pub fn new(click: impl Into<String>) -> Self {
        Self {
            click: click.into(),
            reveal: None,
        }
    }

    pub fn reveal(mut self, selector: impl Into<String>) -> Self {
        self.reveal = Some(selector.into());
        self
    }
}
