use url::Url;

/// Load state of a single subject image.
///
/// `Failed` is permanent for the lifetime of the question: once an image
/// fails it is excluded from the displayed set and never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageState {
    Pending,
    Displayed,
    Failed,
}

/// One image URL of a question together with its load state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSlot {
    url: Url,
    state: ImageState,
}

impl ImageSlot {
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn state(&self) -> ImageState {
        self.state
    }
}

/// Question-level render outcome: one slot per image URL, in received order.
///
/// Derived state only; losing images degrades the presentation but never
/// invalidates the question or blocks option selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuestionRender {
    slots: Vec<ImageSlot>,
}

impl QuestionRender {
    #[must_use]
    pub fn new(urls: &[Url]) -> Self {
        Self {
            slots: urls
                .iter()
                .map(|url| ImageSlot {
                    url: url.clone(),
                    state: ImageState::Pending,
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn slots(&self) -> &[ImageSlot] {
        &self.slots
    }

    /// Mark the slot at `index` as displayed.
    ///
    /// Returns false when the index is out of range or the slot has already
    /// settled; only `Pending` slots transition.
    pub fn mark_displayed(&mut self, index: usize) -> bool {
        self.settle(index, ImageState::Displayed)
    }

    /// Mark the slot at `index` as failed. Same transition rules as
    /// [`QuestionRender::mark_displayed`].
    pub fn mark_failed(&mut self, index: usize) -> bool {
        self.settle(index, ImageState::Failed)
    }

    fn settle(&mut self, index: usize, state: ImageState) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) if slot.state == ImageState::Pending => {
                slot.state = state;
                true
            }
            _ => false,
        }
    }

    /// URLs currently visible, in received order.
    pub fn displayed(&self) -> impl Iterator<Item = &Url> {
        self.slots
            .iter()
            .filter(|slot| slot.state == ImageState::Displayed)
            .map(ImageSlot::url)
    }

    #[must_use]
    pub fn displayed_count(&self) -> usize {
        self.displayed().count()
    }

    /// True once no slot is still pending.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.slots
            .iter()
            .all(|slot| slot.state != ImageState::Pending)
    }

    /// True when the question has no images to show: either it came with
    /// zero URLs, or every image ultimately failed. A neutral state, not
    /// an error.
    #[must_use]
    pub fn needs_placeholder(&self) -> bool {
        self.slots.is_empty()
            || self
                .slots
                .iter()
                .all(|slot| slot.state == ImageState::Failed)
    }
}
