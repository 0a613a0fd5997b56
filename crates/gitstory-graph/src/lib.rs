pub mod bookends;
pub mod camera;
pub mod choreography;
pub mod edge_router;
pub mod error;
pub mod labels;
pub mod layout;

pub use camera::CameraPlanner;
pub use choreography::{
    Choreographer, Choreography, ChoreographyStats, VisitState, choreograph,
};
pub use edge_router::{EdgeRouter, OrientedRect};
pub use error::StoryError;
pub use labels::{PlacedLabel, RefLabelStacker, wrap_message};
pub use layout::{GridCell, LayoutEngine, LayoutState, PlacedNode, Placement};

use gitstory_core::StoryConfig;
use gitstory_history::{HistoryProvider, HistoryWindow, WindowOptions};

/// Validate `config`, read the history window and refs from `provider`, and
/// choreograph the story. All provider I/O happens before layout starts.
pub fn tell_story<P>(provider: &P, config: &StoryConfig) -> Result<Choreography, StoryError>
where
    P: HistoryProvider + ?Sized,
{
    config.validate()?;
    let window = HistoryWindow::build(provider, &WindowOptions::from_config(config))?;
    let refs = provider.refs()?;
    tracing::debug!(
        "refs: head={:?}, {} branches, {} tags",
        refs.head,
        refs.branches.len(),
        refs.tags.len()
    );
    Ok(choreograph(&window, &refs, config))
}
