//! Image loading and resource URL lifecycle.
//!
//! Loading is split around the asynchronous decode:
//!
//! 1. [`ImageLoader::begin_load`] checks the media type, asks the host for a
//!    temporary resource URL and hands back a [`LoadTicket`].
//! 2. The host decodes from the ticket's URL.
//! 3. [`ImageLoader::complete_load`] or [`ImageLoader::fail_load`] consumes
//!    the ticket.
//!
//! Each ticket carries a sequence number. Only the most recent request may
//! install its image; a decode that completes after a newer load was started
//! is discarded. Resource URLs are moved, never cloned, from the host into a
//! ticket, then into a [`LoadedImage`], then back to the host for release,
//! so every URL is released exactly once.

use log::{debug, warn};
use thiserror::Error;

use crate::decode::is_image_media_type;
use crate::surface::BitmapSource;

/// Errors that can occur while loading an image.
#[derive(Debug, Error, PartialEq)]
pub enum LoadError {
    /// The selected file is not declared as an image.
    #[error("Please choose an image file (got \"{0}\")")]
    InvalidMediaType(String),

    /// The host could not create a resource URL for the file.
    #[error("Cannot open the selected file: {0}")]
    ResourceUnavailable(String),

    /// The file was accepted but could not be decoded.
    #[error("The selected image could not be decoded: {0}")]
    DecodeFailed(String),
}

/// Provenance of a loaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// File name as reported by the picker.
    pub name: String,
    /// Declared media type, e.g. `image/png`.
    pub media_type: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
        }
    }
}

/// Platform services for making files addressable during decode.
pub trait ResourceHost {
    /// Platform file handle.
    type File: ?Sized;
    /// Temporary resource URL. Released by moving it back into [`revoke_url`](Self::revoke_url).
    type Url;

    /// Name and media type of a file.
    fn describe(&self, file: &Self::File) -> SourceFile;

    /// Allocate a resource URL for `file`.
    fn create_url(&mut self, file: &Self::File) -> Result<Self::Url, LoadError>;

    /// Release a resource URL.
    fn revoke_url(&mut self, url: Self::Url);
}

/// An in-flight load. Must be passed back to the loader exactly once.
#[derive(Debug)]
#[must_use = "a ticket owns a resource URL and must be completed or failed"]
pub struct LoadTicket<U> {
    sequence: u64,
    url: U,
    source: SourceFile,
}

impl<U> LoadTicket<U> {
    /// The URL the host should decode from.
    pub fn url(&self) -> &U {
        &self.url
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn source(&self) -> &SourceFile {
        &self.source
    }
}

/// The current image: decoded bitmap plus the resource URL backing it.
#[derive(Debug)]
pub struct LoadedImage<B, U> {
    bitmap: B,
    url: U,
    source: SourceFile,
}

impl<B, U> LoadedImage<B, U> {
    pub fn bitmap(&self) -> &B {
        &self.bitmap
    }

    pub fn url(&self) -> &U {
        &self.url
    }

    pub fn source(&self) -> &SourceFile {
        &self.source
    }
}

/// Result of handing a decoded bitmap back to the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The image is now current; any previous image was released.
    Installed,
    /// A newer load was started meanwhile; this image was dropped.
    Superseded,
}

/// Owns the current image and the resource host.
pub struct ImageLoader<H: ResourceHost, B> {
    host: H,
    current: Option<LoadedImage<B, H::Url>>,
    latest: u64,
}

impl<H: ResourceHost, B: BitmapSource> ImageLoader<H, B> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            current: None,
            latest: 0,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn current(&self) -> Option<&LoadedImage<B, H::Url>> {
        self.current.as_ref()
    }

    pub fn bitmap(&self) -> Option<&B> {
        self.current.as_ref().map(LoadedImage::bitmap)
    }

    pub fn has_image(&self) -> bool {
        self.current.is_some()
    }

    /// Validate `file` and allocate its resource URL.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::InvalidMediaType` if the file is not an image.
    /// The current image is left untouched in that case.
    pub fn begin_load(&mut self, file: &H::File) -> Result<LoadTicket<H::Url>, LoadError> {
        let source = self.host.describe(file);
        if !is_image_media_type(&source.media_type) {
            warn!(
                "Rejected \"{}\": media type {:?} is not an image",
                source.name, source.media_type
            );
            return Err(LoadError::InvalidMediaType(source.media_type));
        }

        let url = self.host.create_url(file)?;
        self.latest += 1;
        debug!("Load #{} started for \"{}\"", self.latest, source.name);

        Ok(LoadTicket {
            sequence: self.latest,
            url,
            source,
        })
    }

    /// Install a decoded bitmap if its ticket is the most recent request.
    pub fn complete_load(&mut self, ticket: LoadTicket<H::Url>, bitmap: B) -> LoadOutcome {
        if ticket.sequence != self.latest {
            debug!(
                "Load #{} superseded by #{}, discarding",
                ticket.sequence, self.latest
            );
            self.host.revoke_url(ticket.url);
            return LoadOutcome::Superseded;
        }

        if let Some(previous) = self.current.take() {
            self.host.revoke_url(previous.url);
        }

        let (width, height) = bitmap.dimensions();
        debug!(
            "Load #{} installed \"{}\" ({}x{})",
            ticket.sequence, ticket.source.name, width, height
        );
        self.current = Some(LoadedImage {
            bitmap,
            url: ticket.url,
            source: ticket.source,
        });
        LoadOutcome::Installed
    }

    /// Release a ticket whose decode failed. The current image is kept.
    ///
    /// Returns the error to report, or `None` if a newer load was started
    /// meanwhile and the failure no longer concerns the user.
    pub fn fail_load(
        &mut self,
        ticket: LoadTicket<H::Url>,
        reason: impl Into<String>,
    ) -> Option<LoadError> {
        let reason = reason.into();
        self.host.revoke_url(ticket.url);
        if ticket.sequence != self.latest {
            debug!(
                "Load #{} superseded by #{}, ignoring failure: {}",
                ticket.sequence, self.latest, reason
            );
            return None;
        }

        warn!(
            "Load #{} of \"{}\" failed: {}",
            ticket.sequence, ticket.source.name, reason
        );
        Some(LoadError::DecodeFailed(reason))
    }

    /// Release the current image and invalidate in-flight loads.
    pub fn discard(&mut self) {
        self.latest += 1;
        if let Some(current) = self.current.take() {
            debug!("Releasing \"{}\"", current.source.name);
            self.host.revoke_url(current.url);
        }
    }
}

impl<H: ResourceHost, B> Drop for ImageLoader<H, B> {
    fn drop(&mut self) {
        if let Some(current) = self.current.take() {
            self.host.revoke_url(current.url);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory resource host that records every URL it hands out.

    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::rc::Rc;

    use super::*;

    /// URL handle, not `Clone`.
    #[derive(Debug, PartialEq, Eq)]
    pub struct FakeUrl(pub u32);

    #[derive(Debug, Default)]
    pub struct Ledger {
        pub next: u32,
        pub live: BTreeSet<u32>,
        pub revoked: Vec<u32>,
    }

    /// Host whose ledger stays inspectable after the loader takes ownership.
    #[derive(Debug, Default, Clone)]
    pub struct FakeHost {
        pub ledger: Rc<RefCell<Ledger>>,
    }

    impl ResourceHost for FakeHost {
        type File = SourceFile;
        type Url = FakeUrl;

        fn describe(&self, file: &SourceFile) -> SourceFile {
            file.clone()
        }

        fn create_url(&mut self, _file: &SourceFile) -> Result<FakeUrl, LoadError> {
            let mut ledger = self.ledger.borrow_mut();
            ledger.next += 1;
            let id = ledger.next;
            ledger.live.insert(id);
            Ok(FakeUrl(id))
        }

        fn revoke_url(&mut self, url: FakeUrl) {
            let mut ledger = self.ledger.borrow_mut();
            assert!(ledger.live.remove(&url.0), "URL {} released twice", url.0);
            ledger.revoked.push(url.0);
        }
    }

    pub fn png(name: &str) -> SourceFile {
        SourceFile::new(name, "image/png")
    }
}
