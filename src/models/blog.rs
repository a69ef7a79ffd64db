use super::{ArrayItem, FieldArray, MediaField, MediaPath, MediaTree, SlotMut, SlotRef};
use crate::media::MediaSlot;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Section {
    pub title: String,
    pub content: String,
    pub image: MediaSlot,
}

impl ArrayItem for Section {}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlogDraft {
    pub title: String,
    pub author: String,
    pub content: String,
    pub cover_image: MediaSlot,
    pub sections: FieldArray<Section>,
}

impl MediaTree for BlogDraft {
    fn media_fields(&self) -> Vec<MediaField<SlotRef<'_>>> {
        let root = MediaPath::root();
        let mut fields = vec![MediaField {
            path: root.field("cover_image"),
            slot: SlotRef::Single(&self.cover_image),
        }];
        for (i, section) in self.sections.iter().enumerate() {
            fields.push(MediaField {
                path: root.field("sections").index(i).field("image"),
                slot: SlotRef::Single(&section.image),
            });
        }
        fields
    }

    fn media_fields_mut(&mut self) -> Vec<MediaField<SlotMut<'_>>> {
        let root = MediaPath::root();
        let Self {
            cover_image,
            sections,
            ..
        } = self;
        let mut fields = vec![MediaField {
            path: root.field("cover_image"),
            slot: SlotMut::Single(cover_image),
        }];
        for (i, section) in sections.iter_mut().enumerate() {
            fields.push(MediaField {
                path: root.field("sections").index(i).field("image"),
                slot: SlotMut::Single(&mut section.image),
            });
        }
        fields
    }
}
