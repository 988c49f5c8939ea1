//! Ownership of the rendered graph.
//!
//! A [`GraphConsumer`] turns a [`RenderPlan`] into a live graph. The
//! [`RenderSession`] owns at most one such graph and always unmounts the
//! current one before mounting the next, so two graphs never coexist.

use log::{debug, error};
use thiserror::Error;

use crate::view::RenderPlan;

/// Failure of a graph consumer to mount a plan.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Rendering surface is unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to lay out graph: {0}")]
    Layout(String),

    #[error("Failed to render graph: {0}")]
    Render(String),
}

/// Something that draws render plans.
pub trait GraphConsumer {
    /// Handle to a mounted graph.
    type Graph;

    /// Builds a graph for `plan`.
    fn mount(&mut self, plan: &RenderPlan) -> Result<Self::Graph, SurfaceError>;

    /// Tears down `graph` and releases everything it holds.
    fn unmount(&mut self, graph: Self::Graph);
}

/// Owns the single rendered graph of a consumer.
///
/// Dropping the session unmounts the graph.
pub struct RenderSession<C: GraphConsumer> {
    consumer: C,
    mounted: Option<C::Graph>,
}

impl<C: GraphConsumer> RenderSession<C> {
    pub fn new(consumer: C) -> Self {
        Self {
            consumer,
            mounted: None,
        }
    }

    /// Replaces the current graph with one built from `plan`.
    ///
    /// The previous graph is unmounted first, even if mounting the new one
    /// fails; in that case the session is left empty and stays usable.
    ///
    /// # Errors
    ///
    /// Returns the consumer's [`SurfaceError`].
    pub fn render(&mut self, plan: &RenderPlan) -> Result<&C::Graph, SurfaceError> {
        self.clear();

        match self.consumer.mount(plan) {
            Ok(graph) => {
                debug!(element_count = plan.elements().len(); "Mounted graph");
                let graph: &C::Graph = self.mounted.insert(graph);
                Ok(graph)
            }
            Err(err) => {
                error!(err:err; "Failed to mount graph");
                Err(err)
            }
        }
    }

    /// Unmounts the current graph, if any.
    pub fn clear(&mut self) {
        if let Some(graph) = self.mounted.take() {
            self.consumer.unmount(graph);
            debug!("Unmounted graph");
        }
    }

    /// Returns the mounted graph.
    pub fn graph(&self) -> Option<&C::Graph> {
        self.mounted.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn consumer(&self) -> &C {
        &self.consumer
    }
}

impl<C: GraphConsumer> Drop for RenderSession<C> {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use hierview_core::design::{Design, Instance};

    use super::*;
    use crate::{config::AppConfig, view::ViewMode, view::ViewSpec};

    /// Counts live graphs and fails on demand.
    #[derive(Default)]
    struct Recorder {
        live: usize,
        max_live: usize,
        mounts: usize,
        unmounts: usize,
        fail_next: bool,
    }

    impl GraphConsumer for Recorder {
        type Graph = usize;

        fn mount(&mut self, plan: &RenderPlan) -> Result<usize, SurfaceError> {
            if std::mem::take(&mut self.fail_next) {
                return Err(SurfaceError::Unavailable("no canvas".to_string()));
            }
            self.live += 1;
            self.max_live = self.max_live.max(self.live);
            self.mounts += 1;
            Ok(plan.elements().len())
        }

        fn unmount(&mut self, _graph: usize) {
            self.live -= 1;
            self.unmounts += 1;
        }
    }

    fn plan() -> RenderPlan {
        let design = Design::new([Instance::new("cpu0", "CPU")]);
        ViewSpec::for_mode(ViewMode::Tree, &AppConfig::default())
            .unwrap()
            .plan(Some(&design))
    }

    #[test]
    fn test_render_replaces_previous_graph() {
        let mut session = RenderSession::new(Recorder::default());
        session.render(&plan()).unwrap();
        session.render(&plan()).unwrap();

        assert_eq!(session.consumer().mounts, 2);
        assert_eq!(session.consumer().unmounts, 1);
        assert_eq!(session.consumer().max_live, 1);
        assert_eq!(session.graph(), Some(&1));
    }

    #[test]
    fn test_mount_failure_leaves_session_usable() {
        let mut session = RenderSession::new(Recorder::default());
        session.render(&plan()).unwrap();

        session.consumer.fail_next = true;
        assert!(session.render(&plan()).is_err());
        assert!(!session.is_mounted());
        assert_eq!(session.consumer().live, 0);

        session.render(&plan()).unwrap();
        assert!(session.is_mounted());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut session = RenderSession::new(Recorder::default());
        session.render(&plan()).unwrap();
        session.clear();
        session.clear();

        assert_eq!(session.consumer().unmounts, 1);
        assert!(session.graph().is_none());
    }
}
