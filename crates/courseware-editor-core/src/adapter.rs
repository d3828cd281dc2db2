//! The block editor adapter.
//!
//! Owns at most one editing session per instance, mounted into an anchor.
//! Holds one handler per block, emits the current document to `on_change`
//! after every edit and once more on teardown, and mediates uploads for
//! image/video/audio blocks.

use std::sync::Arc;

use courseware_common::url::absolutize_upload_url;
use courseware_common::{AdapterConfig, Block, BlockDocument, SmolStr, UploadEndpoints};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::handler::{BlockHandler, BlockView, MountFlag};
use crate::platform::{EditorSurface, SurfaceError, SurfaceHost};
use crate::registry::SessionRegistry;
use crate::tools::{self, ComparisonEdit, ToolHandler, ToolSpec};
use crate::upload::{MediaKind, UploadFile, UploadRequest, UploadResponse, Uploader};

/// Called with the full document after each change and on teardown.
pub type ChangeCallback = Box<dyn FnMut(&BlockDocument) + Send>;

/// Lifecycle of an adapter's editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Uninitialized,
    /// Surface created, readiness not settled yet
    Constructing,
    Ready,
    TearingDown,
    Closed,
}

/// Outcome of [`EditorAdapter::mount`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountOutcome {
    Mounted,
    /// This adapter, or another one sharing the registry, already owns a session
    AlreadyMounted,
    Failed(SurfaceError),
}

/// Per-mount settings.
#[derive(Default)]
pub struct MountConfig {
    pub on_change: Option<ChangeCallback>,
    /// Overrides the adapter's configured upload endpoints
    pub upload_endpoints: Option<UploadEndpoints>,
}

impl MountConfig {
    pub fn new(on_change: impl FnMut(&BlockDocument) + Send + 'static) -> Self {
        Self {
            on_change: Some(Box::new(on_change)),
            upload_endpoints: None,
        }
    }

    pub fn with_upload_endpoints(mut self, endpoints: UploadEndpoints) -> Self {
        self.upload_endpoints = Some(endpoints);
        self
    }
}

/// An edit coming from the editing UI.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockEdit {
    /// Insert a block; an index past the end appends.
    Insert { index: usize, block: Block },
    Remove { index: usize },
    /// Replace a block's data, keeping its type and id.
    Replace { index: usize, data: Value },
    Comparison { index: usize, edit: ComparisonEdit },
    /// URL typed into an image/video/audio block
    MediaUrl { index: usize, url: String },
    ImageCaption { index: usize, caption: String },
    /// URL pasted into a social embed block
    EmbedUrl { index: usize, url: String },
    /// Reopen a social embed's URL input
    EmbedEdit { index: usize },
}

struct Slot {
    /// Stable for the lifetime of the slot, unlike its index
    key: u64,
    id: Option<SmolStr>,
    extra: Map<String, Value>,
    handler: ToolHandler,
    mounted: MountFlag,
}

struct Session<S> {
    anchor: SmolStr,
    surface: S,
    on_change: Option<ChangeCallback>,
    endpoints: UploadEndpoints,
}

/// An upload that has been started but not sent yet.
///
/// Running it does not borrow the adapter, so the session may be torn down
/// while the request is in flight.
pub struct UploadTask<U> {
    uploader: Arc<U>,
    request: UploadRequest,
    slot: u64,
    mounted: MountFlag,
}

impl<U: Uploader> UploadTask<U> {
    pub fn kind(&self) -> MediaKind {
        self.request.kind
    }

    pub async fn run(self) -> CompletedUpload {
        let file_name = self.request.file.name.clone();
        let response = self.uploader.upload_by_file(self.request).await;
        CompletedUpload {
            slot: self.slot,
            mounted: self.mounted,
            file_name,
            response,
        }
    }
}

/// Result of an [`UploadTask`], to be handed back to [`EditorAdapter::finish_upload`].
#[derive(Debug, Clone)]
pub struct CompletedUpload {
    slot: u64,
    mounted: MountFlag,
    file_name: String,
    pub response: UploadResponse,
}

pub struct EditorAdapter<H: SurfaceHost, U> {
    host: H,
    uploader: Arc<U>,
    registry: SessionRegistry,
    config: AdapterConfig,
    state: AdapterState,
    session: Option<Session<H::Surface>>,
    slots: Vec<Slot>,
    /// Top-level document fields other than `blocks`
    doc_extra: Map<String, Value>,
    next_key: u64,
}

impl<H: SurfaceHost, U: Uploader> EditorAdapter<H, U> {
    pub fn new(host: H, uploader: Arc<U>, registry: SessionRegistry, config: AdapterConfig) -> Self {
        Self {
            host,
            uploader,
            registry,
            config,
            state: AdapterState::Uninitialized,
            session: None,
            slots: Vec::new(),
            doc_extra: Map::new(),
            next_key: 0,
        }
    }

    pub fn state(&self) -> AdapterState {
        self.state
    }

    pub fn anchor(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.anchor.as_str())
    }

    /// Tools registered with every session.
    pub fn catalog(&self) -> Vec<ToolSpec> {
        tools::catalog()
    }

    /// Create the editing session in `anchor`.
    ///
    /// If this future is dropped before readiness settles the adapter stays
    /// `Constructing`; `unmount` then finishes waiting before it tears down.
    pub async fn mount(
        &mut self,
        anchor: &str,
        initial: Option<BlockDocument>,
        config: MountConfig,
    ) -> MountOutcome {
        match self.state {
            AdapterState::Uninitialized | AdapterState::Closed => {}
            state => {
                debug!(anchor, ?state, "editor already mounted, ignoring mount");
                return MountOutcome::AlreadyMounted;
            }
        }

        if !self.registry.claim(anchor) {
            warn!(anchor, "anchor already owned by a live editor session");
            return MountOutcome::AlreadyMounted;
        }

        let surface = match self.host.create(anchor) {
            Ok(surface) => surface,
            Err(e) => {
                warn!(anchor, error = %e, "failed to create editing surface");
                self.registry.release(anchor);
                self.state = AdapterState::Uninitialized;
                return MountOutcome::Failed(e);
            }
        };

        self.load(initial.unwrap_or_default());
        self.session = Some(Session {
            anchor: SmolStr::new(anchor),
            surface,
            on_change: config.on_change,
            endpoints: config
                .upload_endpoints
                .unwrap_or_else(|| self.config.upload.clone()),
        });
        self.state = AdapterState::Constructing;

        let ready = match self.session.as_mut() {
            Some(session) => session.surface.ready().await,
            None => Ok(()),
        };
        if let Err(e) = ready {
            warn!(anchor, error = %e, "editing surface never became ready");
            if let Some(mut session) = self.session.take()
                && let Err(err) = session.surface.destroy()
            {
                debug!(anchor, error = %err, "surface teardown after failed construction");
            }
            self.release_slots();
            self.registry.release(anchor);
            self.state = AdapterState::Uninitialized;
            return MountOutcome::Failed(e);
        }

        self.state = AdapterState::Ready;
        debug!(anchor, blocks = self.slots.len(), "editor mounted");
        MountOutcome::Mounted
    }

    /// Tear the session down.
    ///
    /// Emits the final document, destroys the surface and releases the anchor.
    /// Surface errors are logged and swallowed; the adapter always ends up
    /// `Closed`.
    pub async fn unmount(&mut self) {
        match self.state {
            AdapterState::Uninitialized | AdapterState::Closed | AdapterState::TearingDown => {
                return;
            }
            AdapterState::Constructing => {
                if let Some(session) = self.session.as_mut()
                    && let Err(e) = session.surface.ready().await
                {
                    debug!(anchor = %session.anchor, error = %e, "surface readiness failed during teardown");
                }
            }
            AdapterState::Ready => {}
        }

        self.state = AdapterState::TearingDown;
        self.emit_change();
        self.release_slots();

        if let Some(mut session) = self.session.take() {
            if let Err(e) = session.surface.destroy() {
                warn!(anchor = %session.anchor, error = %e, "editing surface teardown failed");
            }
            self.registry.release(&session.anchor);
            debug!(anchor = %session.anchor, "editor unmounted");
        }
        self.state = AdapterState::Closed;
    }

    fn load(&mut self, document: BlockDocument) {
        self.release_slots();
        self.doc_extra = document.extra;
        for block in document.blocks {
            let slot = self.slot_for(block);
            self.slots.push(slot);
        }
    }

    fn slot_for(&mut self, block: Block) -> Slot {
        let key = self.next_key;
        self.next_key += 1;
        Slot {
            key,
            handler: ToolHandler::for_block(&block),
            id: block.id,
            extra: block.extra,
            mounted: MountFlag::new(),
        }
    }

    fn release_slots(&mut self) {
        for slot in self.slots.drain(..) {
            slot.mounted.unmount();
        }
    }

    /// The current document, as every handler saves it.
    pub fn document(&self) -> BlockDocument {
        BlockDocument {
            blocks: self
                .slots
                .iter()
                .map(|slot| Block {
                    id: slot.id.clone(),
                    block_type: slot.handler.block_type(),
                    data: slot.handler.save(),
                    extra: slot.extra.clone(),
                })
                .collect(),
            extra: self.doc_extra.clone(),
        }
    }

    pub fn views(&self) -> Vec<BlockView> {
        self.slots.iter().map(|slot| slot.handler.render()).collect()
    }

    /// Indices of blocks whose handler reports their saved data as invalid.
    pub fn invalid_blocks(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.handler.validate(&slot.handler.save()))
            .map(|(index, _)| index)
            .collect()
    }

    fn emit_change(&mut self) {
        let document = self.document();
        if let Some(on_change) = self
            .session
            .as_mut()
            .and_then(|session| session.on_change.as_mut())
        {
            on_change(&document);
        }
    }

    /// Apply an edit. Returns whether anything changed.
    pub fn apply(&mut self, edit: BlockEdit) -> bool {
        if self.state != AdapterState::Ready {
            debug!(state = ?self.state, "editor not ready, ignoring edit");
            return false;
        }
        let changed = match edit {
            BlockEdit::Insert { index, block } => {
                let slot = self.slot_for(block);
                let index = index.min(self.slots.len());
                self.slots.insert(index, slot);
                true
            }
            BlockEdit::Remove { index } => {
                if index < self.slots.len() {
                    self.slots.remove(index).mounted.unmount();
                    true
                } else {
                    false
                }
            }
            BlockEdit::Replace { index, data } => match self.slots.get_mut(index) {
                Some(Slot {
                    handler: ToolHandler::Text(tool),
                    ..
                }) => {
                    tool.set_data(data);
                    true
                }
                Some(slot) => {
                    let block = Block::new(slot.handler.block_type(), data);
                    slot.handler = ToolHandler::for_block(&block);
                    true
                }
                None => false,
            },
            BlockEdit::Comparison { index, edit } => match self.handler_mut(index) {
                Some(ToolHandler::Comparison(tool)) => tool.apply(edit),
                _ => false,
            },
            BlockEdit::MediaUrl { index, url } => match self.handler_mut(index) {
                Some(ToolHandler::Image(tool)) => tool.set_url(&url),
                Some(ToolHandler::Media(tool)) => tool.set_url(&url),
                _ => false,
            },
            BlockEdit::ImageCaption { index, caption } => match self.handler_mut(index) {
                Some(ToolHandler::Image(tool)) => {
                    tool.set_caption(caption);
                    true
                }
                _ => false,
            },
            BlockEdit::EmbedUrl { index, url } => match self.handler_mut(index) {
                Some(ToolHandler::Social(tool)) => {
                    tool.set_url(&url);
                    true
                }
                _ => false,
            },
            BlockEdit::EmbedEdit { index } => match self.handler_mut(index) {
                Some(ToolHandler::Social(tool)) => {
                    tool.edit();
                    true
                }
                _ => false,
            },
        };
        if changed {
            self.emit_change();
        }
        changed
    }

    fn handler_mut(&mut self, index: usize) -> Option<&mut ToolHandler> {
        self.slots.get_mut(index).map(|slot| &mut slot.handler)
    }

    /// Start uploading `file` into the block at `index`.
    ///
    /// Returns `None` if the session isn't ready or the block has no file picker.
    pub fn start_upload(&self, index: usize, file: UploadFile) -> Option<UploadTask<U>> {
        if self.state != AdapterState::Ready {
            return None;
        }
        let session = self.session.as_ref()?;
        let slot = self.slots.get(index)?;
        let kind = slot.handler.media_kind()?;
        Some(UploadTask {
            uploader: self.uploader.clone(),
            request: UploadRequest {
                kind,
                endpoint: kind.endpoint(&session.endpoints).to_string(),
                file,
            },
            slot: slot.key,
            mounted: slot.mounted.clone(),
        })
    }

    /// Apply a finished upload to its block.
    ///
    /// Ignored if the block or the session went away while the upload was in
    /// flight. A failed upload leaves the block as it was. Server-relative
    /// URLs are made absolute against the media base; a video or audio URL
    /// that is still not absolute counts as a failed upload.
    pub fn finish_upload(&mut self, done: CompletedUpload) -> bool {
        if !done.mounted.is_mounted() || self.state != AdapterState::Ready {
            debug!("upload finished after its block was unmounted, ignoring");
            return false;
        }
        let Some(slot) = self.slots.iter_mut().find(|slot| slot.key == done.slot) else {
            return false;
        };

        let name = done
            .response
            .file_name()
            .map(str::to_owned)
            .unwrap_or(done.file_name);
        let url = match done.response.into_url() {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "upload failed, block left unchanged");
                return false;
            }
        };
        let url = absolutize_upload_url(&self.config.media_base_url, &url);
        if !slot.handler.apply_upload(url.clone(), Some(name)) {
            warn!(%url, "upload result rejected, block left unchanged");
            return false;
        }
        self.emit_change();
        true
    }

    /// Upload `file` into the block at `index` and apply the result.
    pub async fn upload(&mut self, index: usize, file: UploadFile) -> bool {
        let Some(task) = self.start_upload(index, file) else {
            return false;
        };
        let done = task.run().await;
        self.finish_upload(done)
    }
}
