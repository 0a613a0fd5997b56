use gitstory_core::{LabelConfig, Rect, RefLabel, Vec2};
use gitstory_events::LabelStyle;

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLabel {
    pub label: RefLabel,
    pub bounds: Rect,
}

impl PlacedLabel {
    pub fn text(&self) -> &str {
        self.label.text()
    }

    pub fn style(&self) -> LabelStyle {
        match self.label {
            RefLabel::Head => LabelStyle::Head,
            RefLabel::Branch(_) => LabelStyle::Branch,
            RefLabel::Tag(_) => LabelStyle::Tag,
        }
    }
}

/// Sizes commit captions and stacks ref labels above them.
#[derive(Debug, Clone)]
pub struct RefLabelStacker {
    config: LabelConfig,
}

impl RefLabelStacker {
    pub fn new(config: LabelConfig) -> Self {
        Self { config }
    }

    pub fn text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.config.char_width
    }

    /// Box of the short commit id, just above the node.
    pub fn commit_id_bounds(&self, center: Vec2, radius: f32, short_id: &str) -> Rect {
        let node = Rect::from_center_size(center, Vec2::new(radius * 2.0, radius * 2.0));
        node.stacked_above(
            Vec2::new(self.text_width(short_id), self.config.text_height),
            self.config.label_gap,
        )
    }

    /// Box of the wrapped message, just below the node.
    pub fn message_bounds(&self, center: Vec2, radius: f32, message: &str) -> Rect {
        let node = Rect::from_center_size(center, Vec2::new(radius * 2.0, radius * 2.0));
        let widest = message.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        let lines = message.lines().count().max(1);
        node.stacked_below(
            Vec2::new(
                widest as f32 * self.config.char_width,
                lines as f32 * self.config.text_height,
            ),
            self.config.label_gap,
        )
    }

    /// Stack HEAD, then up to `max_branches` branches, then up to `max_tags`
    /// tags above `anchor`, each resting on the one before it.
    pub fn stack<'a>(
        &self,
        anchor: Rect,
        is_head: bool,
        branches: impl IntoIterator<Item = &'a str>,
        tags: impl IntoIterator<Item = &'a str>,
        max_branches: usize,
        max_tags: usize,
    ) -> Vec<PlacedLabel> {
        let labels = is_head
            .then_some(RefLabel::Head)
            .into_iter()
            .chain(
                branches
                    .into_iter()
                    .take(max_branches)
                    .map(|name| RefLabel::Branch(name.to_string())),
            )
            .chain(
                tags.into_iter()
                    .take(max_tags)
                    .map(|name| RefLabel::Tag(name.to_string())),
            );

        let mut below = anchor;
        let mut placed = Vec::new();
        for label in labels {
            let width = match &label {
                RefLabel::Head => self.config.head_width,
                other => self.text_width(other.text()) + self.config.ref_padding,
            };
            let bounds = below.stacked_above(
                Vec2::new(width, self.config.ref_height),
                self.config.label_gap,
            );
            below = bounds;
            placed.push(PlacedLabel { label, bounds });
        }
        placed
    }
}

/// Caption text for a commit message: the first `message_chars` characters
/// with newlines flattened, wrapped into fixed-width lines and capped.
pub fn wrap_message(message: &str, config: &LabelConfig) -> String {
    let flattened: Vec<char> = message
        .chars()
        .take(config.message_chars)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect();

    let wrapped = flattened
        .chunks(config.message_line_width.max(1))
        .map(|line| line.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n");

    wrapped.chars().take(config.message_max_chars).collect()
}
