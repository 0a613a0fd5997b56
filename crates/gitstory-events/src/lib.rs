use crossbeam_channel::{Receiver, Sender, unbounded};
use gitstory_core::{CommitId, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod edge;

pub use edge::{CubicBezier, EdgeGeometry};

/// Handle of one drawn element, unique within an [`EventLog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStyle {
    /// Zero or one parent.
    Commit,
    /// More than one parent.
    Merge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelStyle {
    CommitId,
    Message,
    Head,
    Branch,
    Tag,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CameraMove {
    /// Remember the current frame so it can be restored later.
    Save,
    /// Center the frame on a point.
    Pan { to: Vec2 },
    /// Multiply the frame size.
    Scale { factor: f32 },
    /// Resize the frame to a width, keeping its aspect ratio.
    ZoomWidth { width: f32 },
    /// Resize the frame to a height, keeping its aspect ratio.
    ZoomHeight { height: f32 },
    Restore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    NodeDraw {
        element: ElementId,
        commit: CommitId,
        center: Vec2,
        radius: f32,
        style: NodeStyle,
    },
    EdgeDraw {
        element: ElementId,
        from: CommitId,
        to: CommitId,
        geometry: EdgeGeometry,
    },
    LabelDraw {
        element: ElementId,
        commit: Option<CommitId>,
        text: String,
        bounds: Rect,
        style: LabelStyle,
    },
    CameraMove(CameraMove),
    FadeGroup {
        elements: Vec<ElementId>,
    },
}

impl Event {
    pub fn element(&self) -> Option<ElementId> {
        match self {
            Event::NodeDraw { element, .. }
            | Event::EdgeDraw { element, .. }
            | Event::LabelDraw { element, .. } => Some(*element),
            Event::CameraMove(_) | Event::FadeGroup { .. } => None,
        }
    }
}

/// Ordered, append-only record of everything a renderer has to play back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
    next_element: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a fresh element handle for a draw event about to be pushed.
    pub fn allocate(&mut self) -> ElementId {
        let id = ElementId(self.next_element);
        self.next_element += 1;
        id
    }

    pub fn push(&mut self, event: Event) {
        tracing::trace!(?event, "event");
        self.events.push(event);
    }

    pub fn camera(&mut self, movement: CameraMove) {
        self.push(Event::CameraMove(movement));
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// Publish every event, in order, onto a bus.
    pub fn publish_to(&self, bus: &EventBus) {
        for event in &self.events {
            bus.publish(event.clone());
        }
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[derive(Clone)]
pub struct EventBus {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }

    /// Dispatch all pending events to a listener, in publish order.
    pub fn dispatch_to<L: EventListener>(&self, listener: &mut L) {
        while let Ok(event) = self.rx.try_recv() {
            listener.handle_event(&event);
        }
    }
}

/// Implemented by renderers and sinks that consume the choreography.
pub trait EventListener {
    fn handle_event(&mut self, event: &Event);
}
