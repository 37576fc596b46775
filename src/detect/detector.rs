//! Detectors and the base document queries.

use crate::core::Result;
use crate::env::{Document, Query};
use std::sync::Arc;

type DetectFn = dyn Fn(&dyn Document) -> Result<bool> + Send + Sync;

/// A predicate over the host document deciding auto-activation.
///
/// Stateless; evaluation may fail, in which case callers decide how to
/// treat the error (combinators and the auto-detect pass count it as false).
#[derive(Clone)]
pub struct Detector(Arc<DetectFn>);

impl Detector {
    /// Wrap a predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&dyn Document) -> Result<bool> + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    /// A detector asking the document a single query.
    pub fn query(query: Query) -> Self {
        Self::new(move |doc| doc.query(&query))
    }

    /// Evaluate against a document.
    pub fn evaluate(&self, document: &dyn Document) -> Result<bool> {
        (self.0)(document)
    }

    /// Evaluate, counting a failure as `false`.
    pub fn matches(&self, document: &dyn Document) -> bool {
        self.evaluate(document).unwrap_or(false)
    }
}

impl std::fmt::Debug for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Detector")
    }
}

fn owned<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

/// Elements with any of the classes.
pub fn has_class<I, S>(classes: I) -> Detector
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Detector::query(Query::Class(owned(classes)))
}

/// Elements with any of the ids.
pub fn has_id<I, S>(ids: I) -> Detector
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Detector::query(Query::Id(owned(ids)))
}

/// Elements matching a selector.
pub fn has_selector(selector: &str) -> Detector {
    Detector::query(Query::Selector(selector.to_string()))
}

/// Elements with a `data-<attr>` attribute.
pub fn has_data_attribute(attr: &str) -> Detector {
    Detector::query(Query::DataAttribute(attr.to_string()))
}

/// Elements whose `onclick` handler mentions `content`.
pub fn has_on_click(content: &str) -> Detector {
    Detector::query(Query::AttributeContains {
        attribute: "onclick".to_string(),
        value: content.to_string(),
    })
}

/// Arbitrary predicate.
pub fn custom<F>(predicate: F) -> Detector
where
    F: Fn(&dyn Document) -> Result<bool> + Send + Sync + 'static,
{
    Detector::new(predicate)
}
