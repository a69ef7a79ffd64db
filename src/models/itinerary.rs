use super::{ArrayItem, FieldArray, MediaField, MediaPath, MediaTree, SlotMut, SlotRef};
use crate::media::{MediaReference, MediaSlot};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Hotel {
    pub name: String,
    pub url: String,
    pub images: Vec<MediaReference>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Day {
    /// Kept at `position + 1` by the field array. Payloads number days by
    /// position, so edits to this field are not sent.
    pub index: u32,
    pub title: String,
    pub details: String,
    pub images: Vec<MediaReference>,
    pub hotel: Hotel,
}

impl ArrayItem for Day {
    fn renumber(&mut self, position: usize) {
        self.index = position as u32 + 1;
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItineraryDraft {
    pub title: String,
    pub overview: String,
    pub duration: u32,
    pub price: f64,
    pub discount: u8,
    pub arrival_city: String,
    pub departure_city: String,
    pub location: String,
    pub accommodation: String,
    pub map: MediaSlot,
    pub gallery_images: Vec<MediaReference>,
    pub tags: Vec<String>,
    pub cost_inclusive: Vec<String>,
    pub cost_exclusive: Vec<String>,
    pub days: FieldArray<Day>,
}

fn day_path(position: usize) -> MediaPath {
    MediaPath::root().field("days").index(position)
}

impl MediaTree for ItineraryDraft {
    fn media_fields(&self) -> Vec<MediaField<SlotRef<'_>>> {
        let root = MediaPath::root();
        let mut fields = vec![
            MediaField {
                path: root.field("map"),
                slot: SlotRef::Single(&self.map),
            },
            MediaField {
                path: root.field("gallery_images"),
                slot: SlotRef::List(&self.gallery_images),
            },
        ];
        for (i, day) in self.days.iter().enumerate() {
            fields.push(MediaField {
                path: day_path(i).field("images"),
                slot: SlotRef::List(&day.images),
            });
            fields.push(MediaField {
                path: day_path(i).field("hotel").field("images"),
                slot: SlotRef::List(&day.hotel.images),
            });
        }
        fields
    }

    fn media_fields_mut(&mut self) -> Vec<MediaField<SlotMut<'_>>> {
        let root = MediaPath::root();
        let Self {
            map,
            gallery_images,
            days,
            ..
        } = self;
        let mut fields = vec![
            MediaField {
                path: root.field("map"),
                slot: SlotMut::Single(map),
            },
            MediaField {
                path: root.field("gallery_images"),
                slot: SlotMut::List(gallery_images),
            },
        ];
        for (i, day) in days.iter_mut().enumerate() {
            let Day { images, hotel, .. } = day;
            fields.push(MediaField {
                path: day_path(i).field("images"),
                slot: SlotMut::List(images),
            });
            fields.push(MediaField {
                path: day_path(i).field("hotel").field("images"),
                slot: SlotMut::List(&mut hotel.images),
            });
        }
        fields
    }
}
