//! Page orchestration
//!
//! Wires the Upload Controller, the relay client and the Result Renderer to
//! one [`Surface`]. Each identification shows the pending message, then the
//! rendered outcome, replacing the results region both times.

use tracing::{debug, info};

use crate::asset::ImageAsset;
use crate::collection;
use crate::error::ClientResult;
use crate::render::{render_outcome, ResultView};
use crate::transport::{RelayClient, RelayReply};
use crate::upload::{IdentificationRequest, SubmitRejection, UploadSession, SELECT_IMAGE_FIRST};
use crate::view::{Region, Surface};

pub struct PlantPalApp<S> {
    session: UploadSession,
    relay: RelayClient,
    surface: S,
    max_matches: usize,
    results: ResultView,
}

impl<S: Surface> PlantPalApp<S> {
    pub fn new(session: UploadSession, relay: RelayClient, surface: S, max_matches: usize) -> Self {
        let mut app = Self {
            session,
            relay,
            surface,
            max_matches,
            results: ResultView::Empty,
        };
        app.show_upload();
        app.show_results(ResultView::Empty);
        app
    }

    pub fn select_file(&mut self, file: Option<ImageAsset>) {
        self.session.on_file_selected(file);
        self.show_upload();
    }

    /// Submit the selected image and render the reply
    pub async fn identify(&mut self) -> &ResultView {
        if let Some(request) = self.begin_identify() {
            let outcome = self.relay.identify(request).await;
            self.finish_identify(outcome);
        }
        &self.results
    }

    /// Start a submission; `None` when nothing should be sent
    ///
    /// Without a selection the user is told to pick an image. A submit while
    /// another request is in flight is ignored.
    pub fn begin_identify(&mut self) -> Option<IdentificationRequest> {
        match self.session.on_submit() {
            Ok(request) => {
                info!(
                    file_name = request.image().file_name(),
                    bytes = request.image().len(),
                    "Identification submitted"
                );
                self.show_upload();
                self.show_results(ResultView::pending());
                Some(request)
            }
            Err(SubmitRejection::NoImage) => {
                self.show_results(ResultView::error(SELECT_IMAGE_FIRST));
                None
            }
            Err(SubmitRejection::InFlight) => {
                debug!("Submit ignored: request already in flight");
                None
            }
        }
    }

    /// Render the outcome of the in-flight request and re-enable submit
    pub fn finish_identify(&mut self, outcome: ClientResult<RelayReply>) {
        self.session.complete();
        self.show_upload();
        let view = render_outcome(&outcome, self.max_matches);
        self.show_results(view);
    }

    /// Trigger "Add to collection" on the card with `rank`
    pub fn add_to_collection(&mut self, rank: usize) -> Option<String> {
        let card = self.results.cards().iter().find(|card| card.rank == rank)?;
        let notice = collection::add_to_collection(&card.action);
        self.surface.replace(Region::Notice, &notice);
        Some(notice)
    }

    pub fn results(&self) -> &ResultView {
        &self.results
    }

    pub fn session(&self) -> &UploadSession {
        &self.session
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    fn show_upload(&mut self) {
        self.surface.replace(Region::Upload, &self.session.view());
    }

    fn show_results(&mut self, view: ResultView) {
        self.surface.replace(Region::Results, &view);
        self.results = view;
    }
}
