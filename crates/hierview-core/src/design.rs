//! Design tree model.
//!
//! A [`Design`] is the forest of module instances produced by an external HDL
//! parser. The parser's output is loosely shaped (fields may be missing or
//! `null`), so it is first captured as a [`DesignRecord`] and then normalized
//! into a [`Design`] in a single step. Everything downstream works on the
//! normalized form and never has to check for absent fields.
//!
//! # Wire format
//!
//! ```json
//! {
//!   "top_instances": [
//!     {
//!       "instance_name": "cpu0",
//!       "module_type": "CPU",
//!       "children": [
//!         { "instance_name": "alu0", "module_type": "ALU", "children": [] }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! camelCase spellings (`topInstances`, `instanceName`, `moduleType`) are
//! accepted as aliases.

use log::trace;
use serde::{Deserialize, Serialize};

/// One occurrence of a module type within the design hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Instance {
    instance_name: String,
    module_type: String,
    children: Vec<Instance>,
}

impl Instance {
    /// Creates a leaf instance.
    pub fn new(instance_name: impl Into<String>, module_type: impl Into<String>) -> Self {
        Self {
            instance_name: instance_name.into(),
            module_type: module_type.into(),
            children: Vec::new(),
        }
    }

    /// Appends a child instance, builder style.
    ///
    /// # Examples
    ///
    /// ```
    /// use hierview_core::design::Instance;
    ///
    /// let cpu = Instance::new("cpu0", "CPU").with_child(Instance::new("alu0", "ALU"));
    /// assert_eq!(cpu.children().len(), 1);
    /// ```
    pub fn with_child(mut self, child: Instance) -> Self {
        self.children.push(child);
        self
    }

    /// Replaces the children, builder style.
    pub fn with_children(mut self, children: impl IntoIterator<Item = Instance>) -> Self {
        self.children = children.into_iter().collect();
        self
    }

    /// Name of this instance, unique among its siblings.
    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    /// Module type realized by this instance.
    pub fn module_type(&self) -> &str {
        &self.module_type
    }

    /// Child instances in declaration order.
    pub fn children(&self) -> &[Instance] {
        &self.children
    }

    /// Returns the number of instances in this subtree, including `self`.
    pub fn subtree_size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(instance) = stack.pop() {
            count += 1;
            stack.extend(instance.children.iter());
        }
        count
    }
}

impl Drop for Instance {
    // Drop the subtree level by level; the derived glue would recurse once
    // per hierarchy level.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut child) = pending.pop() {
            pending.append(&mut child.children);
        }
    }
}

/// A forest of top-level instances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Design {
    top_instances: Vec<Instance>,
}

impl Design {
    /// Creates a design from its top-level instances.
    pub fn new(top_instances: impl IntoIterator<Item = Instance>) -> Self {
        Self {
            top_instances: top_instances.into_iter().collect(),
        }
    }

    /// Top-level instances in input order.
    pub fn top_instances(&self) -> &[Instance] {
        &self.top_instances
    }

    /// Returns `true` when the design has no top-level instances.
    pub fn is_empty(&self) -> bool {
        self.top_instances.is_empty()
    }

    /// Returns the total number of instances reachable from the top instances.
    pub fn instance_count(&self) -> usize {
        self.top_instances.iter().map(Instance::subtree_size).sum()
    }

    /// Returns the depth of the deepest instance (top instances are depth 1).
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack: Vec<(&Instance, usize)> =
            self.top_instances.iter().map(|top| (top, 1)).collect();
        while let Some((instance, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            stack.extend(instance.children.iter().map(|child| (child, depth + 1)));
        }
        max_depth
    }
}

/// Loosely-shaped design as received from the parser.
///
/// Every field is optional; [`Design::from`] substitutes empty defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DesignRecord {
    #[serde(default, alias = "topInstances")]
    top_instances: Option<Vec<InstanceRecord>>,
}

/// Loosely-shaped instance as received from the parser.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstanceRecord {
    #[serde(default, alias = "instanceName")]
    instance_name: Option<String>,

    #[serde(default, alias = "moduleType")]
    module_type: Option<String>,

    #[serde(default)]
    children: Option<Vec<InstanceRecord>>,
}

impl Drop for InstanceRecord {
    // Partially read documents are dropped by the deserializer, at any depth.
    fn drop(&mut self) {
        let mut pending = self.children.take().unwrap_or_default();
        while let Some(mut child) = pending.pop() {
            pending.extend(child.children.take().unwrap_or_default());
        }
    }
}

impl From<DesignRecord> for Design {
    fn from(record: DesignRecord) -> Self {
        let top_instances = record.top_instances.unwrap_or_default();
        trace!(top_count = top_instances.len(); "Normalizing design record");
        Design::new(top_instances.into_iter().map(Instance::from))
    }
}

impl From<InstanceRecord> for Instance {
    /// Normalizes a record subtree without recursion, so arbitrarily deep
    /// hierarchies cannot exhaust the stack.
    fn from(record: InstanceRecord) -> Self {
        // Each frame holds a partially built instance and the records of its
        // children still waiting to be converted, in reverse order.
        struct Frame {
            instance: Instance,
            pending: Vec<InstanceRecord>,
        }

        fn open(mut record: InstanceRecord) -> Frame {
            let mut pending = record.children.take().unwrap_or_default();
            pending.reverse();
            Frame {
                instance: Instance {
                    instance_name: record.instance_name.take().unwrap_or_default(),
                    module_type: record.module_type.take().unwrap_or_default(),
                    children: Vec::with_capacity(pending.len()),
                },
                pending,
            }
        }

        let mut stack = vec![open(record)];
        loop {
            let next = stack.last_mut().and_then(|frame| frame.pending.pop());
            match next {
                Some(child) => stack.push(open(child)),
                None => {
                    let Some(done) = stack.pop() else {
                        unreachable!("normalization stack is never empty here");
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.instance.children.push(done.instance),
                        None => return done.instance,
                    }
                }
            }
        }
    }
}
