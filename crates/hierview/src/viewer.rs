//! Stateful front door tying loads, view modes and rendering together.

use log::{debug, info};

use hierview_core::design::Design;

use crate::{
    config::AppConfig,
    error::ViewError,
    load::{DesignStore, LoadStatus, LoadTicket},
    session::{GraphConsumer, RenderSession},
    view::{FitTarget, Tap, ViewMode, ViewSpec, ViewState},
};

/// Keeps the current design, view mode and rendered graph consistent.
///
/// Every design replacement and every mode change discards the rendered
/// graph and builds a new one from scratch.
///
/// # Examples
///
/// ```
/// use hierview::{
///     Viewer, config::AppConfig, export::JsonSurface, load::parse_design_json,
///     view::ViewMode,
/// };
///
/// let mut viewer = Viewer::new(AppConfig::default(), JsonSurface::new()).unwrap();
///
/// let ticket = viewer.begin_load();
/// let design = parse_design_json(r#"{"top_instances": [{"instance_name": "cpu0", "module_type": "CPU"}]}"#);
/// viewer.finish_load(ticket, design).unwrap();
/// assert!(viewer.rendered().is_some());
///
/// viewer.set_view_mode(ViewMode::Nested).unwrap();
/// assert_eq!(viewer.state().plan().unwrap().mode(), ViewMode::Nested);
/// ```
pub struct Viewer<C: GraphConsumer> {
    config: AppConfig,
    store: DesignStore,
    spec: ViewSpec,
    state: ViewState,
    session: RenderSession<C>,
}

impl<C: GraphConsumer> Viewer<C> {
    /// Creates a viewer showing nothing, in the configured default mode.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Config`] if the style configuration is invalid.
    pub fn new(config: AppConfig, consumer: C) -> Result<Self, ViewError> {
        let spec = ViewSpec::for_mode(config.view().default_mode(), &config)?;
        Ok(Self {
            config,
            store: DesignStore::new(),
            spec,
            state: ViewState::Empty,
            session: RenderSession::new(consumer),
        })
    }

    /// Starts a load; the view shows [`ViewState::Loading`] until the latest
    /// load finishes.
    pub fn begin_load(&mut self) -> LoadTicket {
        let ticket = self.store.begin_load();
        self.session.clear();
        self.state = ViewState::Loading;
        ticket
    }

    /// Finishes a load and re-renders if it was the latest one.
    ///
    /// # Errors
    ///
    /// Returns an error if the new view cannot be rendered. The load itself
    /// is recorded regardless.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Option<Design>, ViewError>,
    ) -> Result<LoadStatus, ViewError> {
        let status = self.store.complete(ticket, result);
        if status != LoadStatus::Superseded {
            self.refresh()?;
        }
        Ok(status)
    }

    /// Switches the view mode and rebuilds the view.
    ///
    /// # Errors
    ///
    /// Returns an error if the new view cannot be rendered.
    pub fn set_view_mode(&mut self, mode: ViewMode) -> Result<(), ViewError> {
        if mode == self.spec.mode() {
            return Ok(());
        }

        info!(from = self.spec.mode().as_str(), to = mode.as_str(); "Switching view mode");
        self.session.clear();
        self.spec = ViewSpec::for_mode(mode, &self.config)?;
        self.refresh()
    }

    pub fn mode(&self) -> ViewMode {
        self.spec.mode()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn design(&self) -> Option<&Design> {
        self.store.design()
    }

    /// Number of times the design has been replaced.
    pub fn revision(&self) -> u64 {
        self.store.revision()
    }

    /// Returns the currently mounted graph.
    pub fn rendered(&self) -> Option<&C::Graph> {
        self.session.graph()
    }

    pub fn consumer(&self) -> &C {
        self.session.consumer()
    }

    /// Maps a tap on the rendered graph to a viewport change.
    pub fn on_tap(&self, tap: Tap) -> Option<FitTarget> {
        self.state.plan().and_then(|plan| plan.on_tap(tap))
    }

    fn refresh(&mut self) -> Result<(), ViewError> {
        self.session.clear();

        if self.store.is_loading() {
            self.state = ViewState::Loading;
            return Ok(());
        }

        let design = self.store.design().filter(|design| !design.is_empty());
        if design.is_none() {
            debug!("Nothing to render");
            self.state = ViewState::Empty;
            return Ok(());
        }

        let plan = self.spec.plan(design);
        let rendered = self.session.render(&plan).map(|_| ());
        self.state = ViewState::Ready(plan);
        rendered.map_err(ViewError::from)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use hierview_core::design::Instance;

    use super::*;
    use crate::{session::SurfaceError, view::RenderPlan};

    /// Log of mounts shared with the test body.
    #[derive(Default)]
    struct Log {
        live: usize,
        max_live: usize,
        mounted_modes: Vec<ViewMode>,
    }

    struct Probe(Rc<RefCell<Log>>);

    impl GraphConsumer for Probe {
        type Graph = ViewMode;

        fn mount(&mut self, plan: &RenderPlan) -> Result<ViewMode, SurfaceError> {
            let mut log = self.0.borrow_mut();
            log.live += 1;
            log.max_live = log.max_live.max(log.live);
            log.mounted_modes.push(plan.mode());
            Ok(plan.mode())
        }

        fn unmount(&mut self, _graph: ViewMode) {
            self.0.borrow_mut().live -= 1;
        }
    }

    fn viewer() -> (Viewer<Probe>, Rc<RefCell<Log>>) {
        let log = Rc::new(RefCell::new(Log::default()));
        let viewer = Viewer::new(AppConfig::default(), Probe(Rc::clone(&log))).unwrap();
        (viewer, log)
    }

    fn design() -> Design {
        Design::new([Instance::new("cpu0", "CPU").with_child(Instance::new("alu0", "ALU"))])
    }

    #[test]
    fn test_load_renders_design() {
        let (mut viewer, log) = viewer();
        assert!(matches!(viewer.state(), ViewState::Empty));

        let ticket = viewer.begin_load();
        assert!(matches!(viewer.state(), ViewState::Loading));

        let status = viewer.finish_load(ticket, Ok(Some(design()))).unwrap();
        assert_eq!(status, LoadStatus::Replaced);
        assert_eq!(viewer.rendered(), Some(&ViewMode::Tree));
        assert_eq!(viewer.state().plan().unwrap().node_count(), 2);
        assert_eq!(log.borrow().live, 1);
    }

    #[test]
    fn test_mode_switch_rebuilds_graph() {
        let (mut viewer, log) = viewer();
        let ticket = viewer.begin_load();
        viewer.finish_load(ticket, Ok(Some(design()))).unwrap();

        viewer.set_view_mode(ViewMode::Nested).unwrap();
        viewer.set_view_mode(ViewMode::Nested).unwrap();
        viewer.set_view_mode(ViewMode::Tree).unwrap();

        let log = log.borrow();
        assert_eq!(
            log.mounted_modes,
            [ViewMode::Tree, ViewMode::Nested, ViewMode::Tree]
        );
        assert_eq!(log.max_live, 1);
    }

    #[test]
    fn test_stale_load_does_not_render() {
        let (mut viewer, log) = viewer();
        let first = viewer.begin_load();
        let second = viewer.begin_load();

        let status = viewer.finish_load(first, Ok(Some(design()))).unwrap();
        assert_eq!(status, LoadStatus::Superseded);
        assert!(matches!(viewer.state(), ViewState::Loading));
        assert!(log.borrow().mounted_modes.is_empty());

        viewer.finish_load(second, Ok(None)).unwrap();
        assert!(matches!(viewer.state(), ViewState::Empty));
    }

    #[test]
    fn test_empty_design_clears_graph() {
        let (mut viewer, log) = viewer();
        let ticket = viewer.begin_load();
        viewer.finish_load(ticket, Ok(Some(design()))).unwrap();

        let ticket = viewer.begin_load();
        viewer.finish_load(ticket, Ok(Some(Design::default()))).unwrap();

        assert!(matches!(viewer.state(), ViewState::Empty));
        assert!(viewer.rendered().is_none());
        assert_eq!(log.borrow().live, 0);
    }

    #[test]
    fn test_drop_unmounts() {
        let (mut viewer, log) = viewer();
        let ticket = viewer.begin_load();
        viewer.finish_load(ticket, Ok(Some(design()))).unwrap();
        assert_eq!(log.borrow().live, 1);

        drop(viewer);
        assert_eq!(log.borrow().live, 0);
    }
}
