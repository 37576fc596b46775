//! Auto-detect pass.

use crate::loader::scheduler::{LoadReport, PluginLoader};
use tracing::warn;

impl PluginLoader {
    /// Load every plugin whose detector currently matches the document.
    ///
    /// Returns `None` when auto-detection is disabled. A detector that fails
    /// is logged and skipped; the rest of the scan continues.
    pub async fn auto_detect(&self) -> Option<LoadReport> {
        let debug = self.config().debug;
        if !self.config().auto_detect {
            return None;
        }
        diag!(debug, "Auto-detection started");

        let document = self.environment().document.clone();
        let mut matched = Vec::new();
        for (name, detector) in self.detectors() {
            match detector.evaluate(document.as_ref()) {
                Ok(true) => matched.push(name),
                Ok(false) => {}
                Err(error) => warn!(plugin = %name, error = %error, "Detector failed"),
            }
        }

        let report = if matched.is_empty() {
            LoadReport::default()
        } else {
            diag!(debug, detected = ?matched, "Plugins detected");
            self.load_multiple(&matched).await
        };

        diag!(
            debug,
            loaded = report.successful.len(),
            failed = report.failed.len(),
            "Auto-detection complete"
        );
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::{BoxError, Error, Module};
    use crate::detect::{custom, has_class};
    use crate::env::{Element, Environment, StaticDocument};
    use crate::loader::{LoaderConfig, PluginLoader};
    use crate::plugin::PluginDefinition;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counted(calls: &Arc<AtomicUsize>) -> PluginDefinition {
        let calls = calls.clone();
        PluginDefinition::new().with_loader(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, BoxError>(Module::new(())) }
        })
    }

    #[tokio::test]
    async fn test_detected_plugins_load_with_dependencies() {
        let loader = PluginLoader::default();
        let x_calls = Arc::new(AtomicUsize::new(0));
        let y_calls = Arc::new(AtomicUsize::new(0));
        loader
            .register("x", counted(&x_calls).with_detector(custom(|_| Ok(true))))
            .unwrap()
            .register(
                "y",
                counted(&y_calls)
                    .with_dependency("x")
                    .with_detector(custom(|_| Ok(true))),
            )
            .unwrap();

        let report = loader.auto_detect().await.unwrap();

        assert_eq!(report.successful, vec!["x", "y"]);
        assert!(loader.is_loaded("x"));
        assert!(loader.is_loaded("y"));
        assert_eq!(x_calls.load(Ordering::SeqCst), 1);
        assert_eq!(y_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_document_driven_detection() {
        let document = Arc::new(
            StaticDocument::new().with_elements([Element::new().with_class("carousel")]),
        );
        let loader = PluginLoader::with_environment(
            LoaderConfig::default(),
            Environment::with_document(document),
        );
        let calls = Arc::new(AtomicUsize::new(0));
        loader
            .register("carousel", counted(&calls).with_detector(has_class(["carousel"])))
            .unwrap()
            .register("map", counted(&calls).with_detector(has_class(["map"])))
            .unwrap()
            .register("manual", counted(&calls))
            .unwrap();

        let report = loader.auto_detect().await.unwrap();
        assert_eq!(report.successful, vec!["carousel"]);
        assert!(!loader.is_loaded("map"));
        assert!(!loader.is_loaded("manual"));
    }

    #[tokio::test]
    async fn test_failing_detector_is_isolated() {
        let loader = PluginLoader::default();
        let calls = Arc::new(AtomicUsize::new(0));
        loader
            .register(
                "broken",
                counted(&calls).with_detector(custom(|_| Err(Error::Detection("boom".into())))),
            )
            .unwrap()
            .register("fine", counted(&calls).with_detector(custom(|_| Ok(true))))
            .unwrap();

        let report = loader.auto_detect().await.unwrap();
        assert_eq!(report.successful, vec!["fine"]);
        assert!(report.failed.is_empty());
        assert!(!loader.is_loaded("broken"));
    }

    #[tokio::test]
    async fn test_disabled() {
        let loader = PluginLoader::new(LoaderConfig::default().with_auto_detect(false));
        let calls = Arc::new(AtomicUsize::new(0));
        loader
            .register("x", counted(&calls).with_detector(custom(|_| Ok(true))))
            .unwrap();

        assert!(loader.auto_detect().await.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_nothing_detected() {
        let loader = PluginLoader::default();
        let calls = Arc::new(AtomicUsize::new(0));
        loader
            .register("x", counted(&calls).with_detector(custom(|_| Ok(false))))
            .unwrap();

        let report = loader.auto_detect().await.unwrap();
        assert!(report.successful.is_empty());
        assert!(report.results.is_empty());
    }
}
