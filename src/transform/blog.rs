use super::wire::{BlogFull, BlogPayload, SectionPayload};
use super::{hydrate_slot, loose_pair, slot_payload};
use crate::error::Result;
use crate::media::{AssetRole, PreviewRegistry};
use crate::models::{BlogDraft, Collection, Entity, FieldArray, MediaPath, Section};
use std::sync::Arc;

impl Entity for BlogDraft {
    const COLLECTION: Collection = Collection::Blogs;

    type Payload = BlogPayload;
    type Full = BlogFull;

    fn to_payload(&self) -> Result<BlogPayload> {
        let root = MediaPath::root();
        let sections = self
            .sections
            .iter()
            .enumerate()
            .map(|(i, section)| -> Result<SectionPayload> {
                Ok(SectionPayload {
                    title: section.title.clone(),
                    content: section.content.clone(),
                    image: slot_payload(
                        &section.image,
                        &root.field("sections").index(i).field("image"),
                    )?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(BlogPayload {
            title: self.title.clone(),
            content: self.content.clone(),
            author: self.author.clone(),
            image: slot_payload(&self.cover_image, &root.field("cover_image"))?,
            sections,
        })
    }

    fn hydrate(full: BlogFull, previews: &Arc<PreviewRegistry>) -> Result<Self> {
        let sections = full.sections.into_iter().map(|section| Section {
            title: section.title,
            content: section.content,
            image: hydrate_slot(
                loose_pair(section.image, section.image_public_id, section.image_url),
                AssetRole::Cover,
                previews,
            ),
        });

        Ok(BlogDraft {
            title: full.title,
            author: full.author,
            content: full.content,
            cover_image: hydrate_slot(
                loose_pair(full.image, full.image_public_id, full.image_url),
                AssetRole::Cover,
                previews,
            ),
            sections: FieldArray::from_values(sections),
        })
    }
}
