//! Fault tolerant loading

use super::document_builder::DocumentBuilder;
use super::section_reader::SectionAssembler;
use super::{load_strict, tagger, DxfReaderConfiguration};
use crate::document::CadDocument;
use crate::error::{DxfError, Result};
use crate::notification::{NotificationCollection, NotificationType};

/// States of the [`RecoveryLoader`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    /// Parsing with the strict pipeline
    Strict,
    /// The strict parse failed, repairing with the tolerant pipeline
    Recovering,
    /// No valid document could be produced
    Failed,
    /// A document was produced
    Loaded,
}

/// Loads a document with the strict pipeline and falls back to a tolerant
/// second pass when the stream turns out to be broken.
///
/// The tolerant pass reads raw tags, compiles every record on its own and
/// drops the records that cannot be decoded, so one broken entity costs
/// only that entity. Every fix is recorded as a `Repair` notification.
pub struct RecoveryLoader<'a> {
    data: &'a [u8],
    config: DxfReaderConfiguration,
    state: LoaderState,
    notifications: NotificationCollection,
}

impl<'a> RecoveryLoader<'a> {
    pub fn new(data: &'a [u8], config: DxfReaderConfiguration) -> Self {
        Self {
            data,
            config,
            state: LoaderState::Strict,
            notifications: NotificationCollection::new(),
        }
    }

    pub fn state(&self) -> LoaderState {
        self.state
    }

    /// Notifications of the last [`RecoveryLoader::load`]
    pub fn notifications(&self) -> &NotificationCollection {
        &self.notifications
    }

    /// Load the document.
    ///
    /// Fails with `RecoveryFailed` when the repaired stream still holds no
    /// usable document: no sections at all, a section whose every tag was
    /// unreadable, or an ENTITIES section none of whose records could be
    /// loaded.
    pub fn load(&mut self) -> Result<CadDocument> {
        self.state = LoaderState::Strict;
        self.notifications = NotificationCollection::new();

        match load_strict(self.data, &self.config) {
            Ok(doc) => {
                self.notifications.extend(doc.notifications.clone());
                self.state = LoaderState::Loaded;
                return Ok(doc);
            }
            Err(err) if err.is_structural() => {
                tracing::warn!(%err, "strict load failed, recovering");
                self.notifications
                    .notify(NotificationType::Warning, format!("strict load failed: {}", err));
                self.state = LoaderState::Recovering;
            }
            Err(err) => {
                self.state = LoaderState::Failed;
                return Err(err);
            }
        }

        match self.recover() {
            Ok(doc) => {
                self.state = LoaderState::Loaded;
                tracing::info!(
                    repairs = self.notifications.of_type(NotificationType::Repair).len(),
                    "recovered document"
                );
                Ok(doc)
            }
            Err(err) => {
                self.state = LoaderState::Failed;
                Err(err)
            }
        }
    }

    fn recover(&mut self) -> Result<CadDocument> {
        let info = super::dxf_info(self.data)?;
        let encoding = self.config.encoding.unwrap_or(info.encoding);
        let reader = tagger(self.data, self.config.preserve_comments, encoding)?;

        let mut assembler = SectionAssembler::new(true);
        let sections = assembler.assemble(reader)?;
        for message in assembler.into_repairs() {
            self.notifications.notify(NotificationType::Repair, message);
        }
        if sections.is_empty() {
            self.notifications
                .notify(NotificationType::Failure, "no sections found");
            return Err(self.failed());
        }
        let unreadable: Vec<String> = sections.unreadable().map(|s| s.name.clone()).collect();
        if !unreadable.is_empty() {
            for name in unreadable {
                self.notifications.notify(
                    NotificationType::Failure,
                    format!("no readable content left in section {}", name),
                );
            }
            return Err(self.failed());
        }

        let (mut doc, stats) = match DocumentBuilder::new(true, encoding).build(sections) {
            Ok(built) => built,
            Err(err) => {
                self.notifications
                    .notify(NotificationType::Failure, err.to_string());
                return Err(self.failed());
            }
        };
        self.notifications.extend(std::mem::take(&mut doc.notifications));
        if stats.entity_records > 0 && stats.entities_loaded == 0 {
            self.notifications.notify(
                NotificationType::Failure,
                format!("none of {} ENTITIES records could be loaded", stats.entity_records),
            );
            return Err(self.failed());
        }
        doc.notifications = self.notifications.clone();
        Ok(doc)
    }

    fn failed(&self) -> DxfError {
        DxfError::RecoveryFailed {
            actions: self.notifications.messages(NotificationType::Repair),
            failures: self.notifications.messages(NotificationType::Failure),
        }
    }
}
