use super::AppContext;
use crate::cache::ListCache;
use crate::error::Result;
use crate::media::{AssetRole, Blob, MediaReference, PreviewRegistry};
use crate::models::Entity;
use crate::submission::{SubmissionOrchestrator, SubmissionState, SubmitMode, SubmitOutcome};
use crate::transform::to_wire;
use crate::validation::Validator;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;

/// One open create or update form.
pub struct FormSession<T: Entity> {
    draft: T,
    mode: SubmitMode,
    previews: Arc<PreviewRegistry>,
    orchestrator: SubmissionOrchestrator,
    cache: Arc<ListCache>,
}

impl<T: Entity> FormSession<T> {
    /// Starts an empty create form.
    pub fn create(ctx: &AppContext) -> Self {
        FormSession {
            draft: T::default(),
            mode: SubmitMode::Create,
            previews: PreviewRegistry::new(),
            orchestrator: ctx.orchestrator(),
            cache: ctx.cache.clone(),
        }
    }

    /// Loads an existing entry into an update form.
    pub async fn open_update(ctx: &AppContext, id: &str) -> Result<Self> {
        let full = ctx.api.fetch_full(T::COLLECTION, id).await?;
        let previews = PreviewRegistry::new();
        let draft = T::hydrate(serde_json::from_value(full)?, &previews)?;
        tracing::info!("Opened {} {} for editing", T::COLLECTION.singular(), id);

        let baseline = baseline_of(&draft);
        Ok(FormSession {
            draft,
            mode: SubmitMode::Update {
                id: id.to_string(),
                baseline,
            },
            previews,
            orchestrator: ctx.orchestrator(),
            cache: ctx.cache.clone(),
        })
    }

    pub fn draft(&self) -> &T {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut T {
        &mut self.draft
    }

    pub fn mode(&self) -> &SubmitMode {
        &self.mode
    }

    pub fn previews(&self) -> &Arc<PreviewRegistry> {
        &self.previews
    }

    /// Wraps a freshly picked file as a pending reference with a live preview.
    pub fn attach(&self, blob: Blob, role: AssetRole) -> MediaReference {
        MediaReference::pending(self.previews.attach(blob), role)
    }

    /// Swaps in a whole draft, returning the previous one.
    pub fn replace_draft(&mut self, draft: T) -> T {
        std::mem::replace(&mut self.draft, draft)
    }

    /// Replaces the draft with one built from a full representation.
    ///
    /// Entries of the form `{"file": "<path>"}` become pending assets.
    pub fn load_full(&mut self, full: Value) -> Result<T> {
        let draft = T::hydrate(serde_json::from_value(full)?, &self.previews)?;
        Ok(self.replace_draft(draft))
    }

    /// Submits the draft. A successful write drops the collection's cached
    /// list pages before returning.
    pub async fn submit(&mut self, validator: &dyn Validator<T>) -> SubmitOutcome {
        let outcome = self
            .orchestrator
            .submit(&mut self.draft, &self.mode, validator)
            .await;

        if matches!(outcome, SubmitOutcome::Succeeded(_)) {
            self.cache.invalidate(T::COLLECTION);
        }
        if let (SubmitOutcome::Succeeded(_), SubmitMode::Update { baseline, .. }) =
            (&outcome, &mut self.mode)
        {
            *baseline = baseline_of(&self.draft);
        }
        outcome
    }

    pub fn state(&self) -> SubmissionState {
        self.orchestrator.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.orchestrator.subscribe()
    }
}

fn baseline_of<T: Entity>(draft: &T) -> Option<Value> {
    match to_wire(draft) {
        Ok(baseline) => Some(baseline),
        Err(e) => {
            tracing::warn!("No update baseline, full payload will be sent: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ListQuery, Page};
    use crate::commands::first_page;
    use crate::config::Config;
    use crate::media::MediaSlot;
    use crate::models::{BlogDraft, Collection, ItineraryDraft, MediaTree, Section};
    use crate::pipeline::UploadMode;
    use crate::testing::{valid_blog, MockContentApi, MockGateway};
    use crate::validation::SchemaRules;
    use crate::DashboardError;
    use serde_json::json;

    fn context(api: Arc<MockContentApi>, gateway: Arc<MockGateway>) -> AppContext {
        AppContext::with_clients(Config::default(), api, gateway)
    }

    fn remote_blog() -> Value {
        json!({
            "id": "b1",
            "title": "Into the Mara",
            "author": "Wanjiru",
            "content": "A week among the herds of the Maasai Mara.",
            "image_public_id": "cover",
            "image_url": "https://cdn.test/cover.png",
            "sections": [{
                "title": "Day one",
                "content": "Landed at Wilson airport and drove south.",
                "image": null
            }]
        })
    }

    #[tokio::test]
    async fn test_create_form_uploads_attached_cover() {
        let api = Arc::new(MockContentApi::new());
        let gateway = Arc::new(MockGateway::new());
        let ctx = context(api.clone(), gateway.clone());
        let mut session = FormSession::<BlogDraft>::create(&ctx);

        let cover = session.attach(Blob::memory("cover.jpg", vec![0xff, 0xd8]), AssetRole::Cover);
        assert!(cover.display_url().starts_with("blob:"));
        let draft = session.draft_mut();
        draft.title = "Into the Mara".to_string();
        draft.author = "Wanjiru".to_string();
        draft.content = "A week among the herds of the Maasai Mara.".to_string();
        draft.cover_image.set(cover);
        draft.sections.append(Section {
            title: "Day one".to_string(),
            content: "Landed at Wilson airport and drove south.".to_string(),
            image: MediaSlot::Empty,
        });

        let outcome = session.submit(&SchemaRules).await;

        assert!(matches!(outcome, SubmitOutcome::Succeeded(_)));
        assert_eq!(session.state(), SubmissionState::Succeeded);
        assert_eq!(gateway.calls()[0].mode, UploadMode::Single);
        assert_eq!(session.draft().pending_count(), 0);
        assert_eq!(session.previews().live_count(), 0);
    }

    #[tokio::test]
    async fn test_open_update_hydrates_and_sends_diff() {
        let api = Arc::new(MockContentApi::new().with_full("b1", remote_blog()));
        let ctx = context(api.clone(), Arc::new(MockGateway::new()));

        let mut session = FormSession::<BlogDraft>::open_update(&ctx, "b1").await.unwrap();
        let expected = valid_blog();
        let draft = session.draft();
        assert_eq!(draft.title, expected.title);
        assert_eq!(draft.cover_image, expected.cover_image);
        assert_eq!(draft.sections.len(), 1);
        assert!(draft.sections.get(0).unwrap().image.is_empty());

        session.draft_mut().author = "Amani".to_string();
        let outcome = session.submit(&SchemaRules).await;
        assert!(matches!(outcome, SubmitOutcome::Succeeded(_)));

        let update = api.calls().into_iter().find(|call| call.method == "update").unwrap();
        assert_eq!(update.id.as_deref(), Some("b1"));
        assert_eq!(update.payload, Some(json!({"author": "Amani"})));

        let SubmitMode::Update { baseline, .. } = session.mode() else {
            panic!("expected update mode");
        };
        assert_eq!(baseline.as_ref().unwrap()["author"], json!("Amani"));
    }

    #[tokio::test]
    async fn test_successful_submit_refreshes_listing() {
        let api = Arc::new(MockContentApi::new().with_items(vec![json!({"id": "b0"})]));
        let ctx = context(api.clone(), Arc::new(MockGateway::new()));

        first_page(&ctx, Collection::Blogs).await.unwrap();
        let mut session = FormSession::<BlogDraft>::create(&ctx);
        session.replace_draft(valid_blog());
        let outcome = session.submit(&SchemaRules).await;
        assert!(matches!(outcome, SubmitOutcome::Succeeded(_)));
        first_page(&ctx, Collection::Blogs).await.unwrap();

        assert_eq!(api.count("list"), 2);
    }

    #[tokio::test]
    async fn test_rejected_submit_keeps_listing_cached() {
        let api = Arc::new(MockContentApi::new().rejecting(400, Some("Title already exists")));
        let ctx = context(api.clone(), Arc::new(MockGateway::new()));
        ctx.cache.insert(
            Collection::Blogs,
            ListQuery::first_page(10),
            Page {
                items: vec![],
                total: 0,
                pages: 0,
                current_page: 1,
                page_size: None,
            },
        );

        let mut session = FormSession::<BlogDraft>::create(&ctx);
        session.replace_draft(valid_blog());
        let outcome = session.submit(&SchemaRules).await;

        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        assert_eq!(ctx.cache.len(), 1);
    }

    #[tokio::test]
    async fn test_open_update_missing_entry() {
        let ctx = context(Arc::new(MockContentApi::new()), Arc::new(MockGateway::new()));
        let result = FormSession::<ItineraryDraft>::open_update(&ctx, "nope").await;
        assert!(matches!(result, Err(DashboardError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_load_full_marks_local_files_pending() {
        let ctx = context(Arc::new(MockContentApi::new()), Arc::new(MockGateway::new()));
        let mut session = FormSession::<BlogDraft>::create(&ctx);

        let mut full = remote_blog();
        full["image"] = json!({"file": "/tmp/cover.png"});
        session.load_full(full).unwrap();

        assert!(session.draft().cover_image.is_pending());
        assert_eq!(session.previews().live_count(), 1);

        session.replace_draft(BlogDraft::default());
        assert_eq!(session.previews().live_count(), 0);
    }
}
