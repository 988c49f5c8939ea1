//! Design loading with last-writer-wins semantics.
//!
//! A load is started with [`DesignStore::begin_load`], which hands out a
//! [`LoadTicket`], and finished with [`DesignStore::complete`]. Starting a
//! new load supersedes every earlier ticket, so a slow result that arrives
//! after a newer request is dropped instead of overwriting fresher data.

use log::{debug, error, info, warn};
use serde::Deserialize;

use hierview_core::design::{Design, DesignRecord};

use crate::error::ViewError;

/// Parses the parser's JSON output.
///
/// A JSON `null` document yields `Ok(None)`, meaning no design is loaded.
/// Missing fields are defaulted; unknown fields are ignored. Nesting depth is
/// not limited: the stack grows on the heap as deeper instances are read.
///
/// # Errors
///
/// Returns [`ViewError::Design`] if `source` is not valid JSON of the
/// expected shape.
///
/// # Examples
///
/// ```
/// use hierview::load::parse_design_json;
///
/// let design = parse_design_json(r#"{"top_instances": [{"instance_name": "cpu0"}]}"#)
///     .unwrap()
///     .unwrap();
/// assert_eq!(design.top_instances()[0].module_type(), "");
///
/// assert!(parse_design_json("null").unwrap().is_none());
/// ```
pub fn parse_design_json(source: &str) -> Result<Option<Design>, ViewError> {
    let design_error = |err: serde_json::Error| ViewError::new_design_error(err, source);

    let mut deserializer = serde_json::Deserializer::from_str(source);
    deserializer.disable_recursion_limit();
    let record = Option::<DesignRecord>::deserialize(serde_stacker::Deserializer::new(
        &mut deserializer,
    ))
    .map_err(design_error)?;
    deserializer.end().map_err(design_error)?;

    let design = record.map(Design::from);

    debug!(
        loaded = design.is_some(),
        instance_count = design.as_ref().map_or(0, Design::instance_count);
        "Parsed design document"
    );
    Ok(design)
}

/// Handle identifying one load request.
///
/// Tickets are neither `Clone` nor `Copy`: each request completes at most
/// once.
#[derive(Debug, PartialEq, Eq)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

/// Outcome of [`DesignStore::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// The design was replaced.
    Replaced,

    /// The request finished without a design (for example a dismissed file
    /// dialog); the current design is kept.
    Cancelled,

    /// The request failed; the current design is kept.
    Failed,

    /// A newer request was started after this one; the result was dropped.
    Superseded,
}

/// Holds the current design and tracks outstanding loads.
#[derive(Debug, Default)]
pub struct DesignStore {
    design: Option<Design>,
    latest: u64,
    loading: bool,
    revision: u64,
}

impl DesignStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a load, superseding any outstanding one.
    pub fn begin_load(&mut self) -> LoadTicket {
        if self.loading {
            debug!(superseded = self.latest; "Superseding outstanding load");
        }
        self.latest += 1;
        self.loading = true;
        LoadTicket(self.latest)
    }

    /// Finishes the load identified by `ticket`.
    pub fn complete(
        &mut self,
        ticket: LoadTicket,
        result: Result<Option<Design>, ViewError>,
    ) -> LoadStatus {
        if ticket.0 != self.latest {
            warn!(
                ticket = ticket.0,
                latest = self.latest;
                "Ignoring result of a superseded load"
            );
            return LoadStatus::Superseded;
        }

        self.loading = false;
        match result {
            Ok(Some(design)) => {
                self.revision += 1;
                info!(
                    revision = self.revision,
                    top_count = design.top_instances().len(),
                    instance_count = design.instance_count();
                    "Design loaded"
                );
                self.design = Some(design);
                LoadStatus::Replaced
            }
            Ok(None) => {
                debug!("Load finished without a design");
                LoadStatus::Cancelled
            }
            Err(err) => {
                error!(err:err; "Failed to load design");
                LoadStatus::Failed
            }
        }
    }

    pub fn design(&self) -> Option<&Design> {
        self.design.as_ref()
    }

    /// `true` while the latest request is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Number of times the design has been replaced.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
