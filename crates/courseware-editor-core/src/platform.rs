//! Editing surface abstraction.
//!
//! The adapter never talks to a UI toolkit directly. A `SurfaceHost` creates
//! one `EditorSurface` per anchor, and the surface reports readiness
//! asynchronously. Browser or native hosts implement these traits; the
//! `HeadlessHost` here backs server-side use and tests.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashSet;
use miette::Diagnostic;
use smol_str::SmolStr;

/// Error type for surface construction and teardown.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum SurfaceError {
    #[error("no mount point with id `{0}`")]
    #[diagnostic(
        code(courseware::surface::anchor_missing),
        help("the embedding screen must render the anchor element before mounting")
    )]
    AnchorMissing(SmolStr),

    #[error("editing surface failed to become ready: {0}")]
    #[diagnostic(code(courseware::surface::not_ready))]
    NotReady(String),

    #[error("editing surface teardown failed: {0}")]
    #[diagnostic(code(courseware::surface::teardown))]
    Teardown(String),
}

/// One live editing surface bound to an anchor.
pub trait EditorSurface: Send {
    /// Resolves once the surface accepts input.
    ///
    /// May be awaited more than once; after the first success it must resolve
    /// immediately.
    fn ready(&mut self) -> impl Future<Output = Result<(), SurfaceError>> + Send;

    /// Release the surface and everything it holds.
    fn destroy(&mut self) -> Result<(), SurfaceError>;
}

/// Creates editing surfaces for anchors.
pub trait SurfaceHost {
    type Surface: EditorSurface;

    fn create(&self, anchor: &str) -> Result<Self::Surface, SurfaceError>;
}

/// A host without a UI: anchors are just registered names.
#[derive(Debug, Clone, Default)]
pub struct HeadlessHost {
    anchors: Arc<DashSet<SmolStr>>,
    live: Arc<AtomicUsize>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_anchors<I, S>(anchors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        let host = Self::new();
        for anchor in anchors {
            host.add_anchor(anchor);
        }
        host
    }

    pub fn add_anchor(&self, anchor: impl Into<SmolStr>) {
        self.anchors.insert(anchor.into());
    }

    pub fn remove_anchor(&self, anchor: &str) {
        self.anchors.remove(anchor);
    }

    /// Number of surfaces created and not yet destroyed.
    pub fn live_surfaces(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl SurfaceHost for HeadlessHost {
    type Surface = HeadlessSurface;

    fn create(&self, anchor: &str) -> Result<HeadlessSurface, SurfaceError> {
        if !self.anchors.contains(anchor) {
            return Err(SurfaceError::AnchorMissing(SmolStr::new(anchor)));
        }
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(HeadlessSurface {
            live: Some(self.live.clone()),
        })
    }
}

#[derive(Debug)]
pub struct HeadlessSurface {
    live: Option<Arc<AtomicUsize>>,
}

impl EditorSurface for HeadlessSurface {
    async fn ready(&mut self) -> Result<(), SurfaceError> {
        if self.live.is_some() {
            Ok(())
        } else {
            Err(SurfaceError::NotReady("surface already destroyed".into()))
        }
    }

    fn destroy(&mut self) -> Result<(), SurfaceError> {
        match self.live.take() {
            Some(live) => {
                live.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            }
            None => Err(SurfaceError::Teardown("surface already destroyed".into())),
        }
    }
}

impl Drop for HeadlessSurface {
    fn drop(&mut self) {
        if let Some(live) = self.live.take() {
            live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}
