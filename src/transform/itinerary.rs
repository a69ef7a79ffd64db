use super::wire::{DayPayload, HotelPayload, ItineraryFull, ItineraryPayload};
use super::{hydrate_list, hydrate_slot, items_payload, list_payload, slot_payload};
use crate::error::Result;
use crate::media::{AssetRole, PreviewRegistry};
use crate::models::{Collection, Day, Entity, FieldArray, Hotel, ItineraryDraft, MediaPath};
use std::sync::Arc;

impl Entity for ItineraryDraft {
    const COLLECTION: Collection = Collection::Itineraries;

    type Payload = ItineraryPayload;
    type Full = ItineraryFull;

    fn to_payload(&self) -> Result<ItineraryPayload> {
        let root = MediaPath::root();
        let days = self
            .days
            .iter()
            .enumerate()
            .map(|(i, day)| -> Result<DayPayload> {
                let day_path = root.field("days").index(i);
                Ok(DayPayload {
                    day_number: i as u32 + 1,
                    title: day.title.clone(),
                    details: day.details.clone(),
                    images: list_payload(&day.images, &day_path.field("images"))?,
                    hotel_detail: HotelPayload {
                        name: day.hotel.name.clone(),
                        url: day.hotel.url.clone(),
                        images: list_payload(
                            &day.hotel.images,
                            &day_path.field("hotel").field("images"),
                        )?,
                    },
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ItineraryPayload {
            title: self.title.clone(),
            overview: self.overview.clone(),
            duration: self.duration,
            price: self.price,
            discount: self.discount,
            arrival_city: self.arrival_city.clone(),
            departure_city: self.departure_city.clone(),
            location: self.location.clone(),
            accommodation: self.accommodation.clone(),
            map: slot_payload(&self.map, &root.field("map"))?,
            images: list_payload(&self.gallery_images, &root.field("gallery_images"))?,
            tags: items_payload(&self.tags),
            cost_inclusive: items_payload(&self.cost_inclusive),
            cost_exclusive: items_payload(&self.cost_exclusive),
            days,
        })
    }

    fn hydrate(full: ItineraryFull, previews: &Arc<PreviewRegistry>) -> Result<Self> {
        let days = full.days.into_iter().enumerate().map(|(i, day)| {
            if day.day_number.is_some_and(|number| number as usize != i + 1) {
                tracing::debug!(
                    "Renumbering day {:?} to {} while hydrating",
                    day.day_number,
                    i + 1
                );
            }
            Day {
                index: 0,
                title: day.title,
                details: day.details,
                images: hydrate_list(day.images, AssetRole::Gallery, previews),
                hotel: Hotel {
                    name: day.hotel_detail.name,
                    url: day.hotel_detail.url,
                    images: hydrate_list(day.hotel_detail.images, AssetRole::Gallery, previews),
                },
            }
        });

        Ok(ItineraryDraft {
            title: full.title,
            overview: full.overview,
            duration: full.duration,
            price: full.price,
            discount: full.discount,
            arrival_city: full.arrival_city,
            departure_city: full.departure_city,
            location: full.location,
            accommodation: full.accommodation,
            map: hydrate_slot(full.map, AssetRole::Map, previews),
            gallery_images: hydrate_list(full.images, AssetRole::Gallery, previews),
            tags: full.tags.into_texts(),
            cost_inclusive: full.cost_inclusive.into_iter().map(|c| c.into_text()).collect(),
            cost_exclusive: full.cost_exclusive.into_iter().map(|c| c.into_text()).collect(),
            days: FieldArray::from_values(days),
        })
    }
}
