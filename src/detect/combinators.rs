//! Detector combinators.
//!
//! Both short-circuit and treat a failing sub-detector as `false`; the
//! combined detector itself never fails.

use crate::detect::detector::Detector;

/// True if at least one detector matches. Empty set is false.
pub fn any<I>(detectors: I) -> Detector
where
    I: IntoIterator<Item = Detector>,
{
    let detectors: Vec<Detector> = detectors.into_iter().collect();
    Detector::new(move |doc| Ok(detectors.iter().any(|d| d.matches(doc))))
}

/// True if every detector matches. Empty set is true.
pub fn all<I>(detectors: I) -> Detector
where
    I: IntoIterator<Item = Detector>,
{
    let detectors: Vec<Detector> = detectors.into_iter().collect();
    Detector::new(move |doc| Ok(detectors.iter().all(|d| d.matches(doc))))
}
