//! The resolved activity graph.

use std::fmt;

use loom_types::{Condition, Parameter, TypeRef, Value, leaf_name};

/// Whether an iterator runs a fixed number of times or once per element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IterationStyle {
    Times,
    Each,
}

impl IterationStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            IterationStyle::Times => "times",
            IterationStyle::Each => "each",
        }
    }
}

impl fmt::Display for IterationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Desired state of a resource: its declared type and the normalized state value.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub resource_type: TypeRef,
    pub value: Value,
}

/// A node of the resolved activity graph. Immutable once resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    /// Fully qualified, `::` separated name.
    pub name: String,
    pub when: Condition,
    pub input: Vec<Parameter>,
    pub output: Vec<Parameter>,
    pub kind: ActivityKind,
}

/// Variant specific payload of a resolved activity.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityKind {
    Action {
        interface: Option<String>,
    },
    Resource {
        state: State,
    },
    Workflow {
        activities: Vec<Activity>,
    },
    Iterator {
        style: IterationStyle,
        /// Normalized iteration source: a count, a collection, or a parameter.
        over: Value,
        variables: Vec<Parameter>,
        /// The body applied once per iteration; it shares the iterator's name.
        producer: Box<Activity>,
        /// Name of the collected output.
        into: String,
    },
}

impl Activity {
    /// The last segment of the qualified name.
    pub fn leaf_name(&self) -> &str {
        leaf_name(&self.name)
    }

    /// The definition style this activity is published under.
    pub fn style(&self) -> &'static str {
        match self.kind {
            ActivityKind::Action { .. } => "action",
            ActivityKind::Resource { .. } => "resource",
            ActivityKind::Workflow { .. } => "workflow",
            ActivityKind::Iterator { .. } => "iterator",
        }
    }

    /// Direct children of a workflow; empty for every other kind.
    pub fn children(&self) -> &[Activity] {
        match &self.kind {
            ActivityKind::Workflow { activities } => activities,
            _ => &[],
        }
    }

    pub fn state(&self) -> Option<&State> {
        match &self.kind {
            ActivityKind::Resource { state } => Some(state),
            _ => None,
        }
    }

    /// Visits this activity and its nested workflow children, children before parents.
    ///
    /// An iterator's producer is part of the iterator and is not visited on its own.
    pub fn walk_post_order<'a>(&'a self, visit: &mut dyn FnMut(&'a Activity)) {
        for child in self.children() {
            child.walk_post_order(visit);
        }
        visit(self);
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.style(), self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(name: &str) -> Activity {
        Activity {
            name: name.to_string(),
            when: Condition::Always,
            input: Vec::new(),
            output: Vec::new(),
            kind: ActivityKind::Action { interface: None },
        }
    }

    #[test]
    fn post_order_visits_children_first() {
        let workflow = Activity {
            name: "Test".into(),
            when: Condition::Always,
            input: Vec::new(),
            output: Vec::new(),
            kind: ActivityKind::Workflow {
                activities: vec![action("Test::A"), action("Test::B")],
            },
        };
        let mut names = Vec::new();
        workflow.walk_post_order(&mut |activity| names.push(activity.name.as_str()));
        assert_eq!(names, vec!["Test::A", "Test::B", "Test"]);
        assert_eq!(workflow.children().len(), 2);
        assert_eq!(workflow.children()[1].leaf_name(), "B");
        assert_eq!(workflow.to_string(), "workflow Test");
    }
}
