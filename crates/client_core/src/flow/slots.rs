use crate::{
    image_ref::ImageRef,
    transform::{Nudge, Orientation, TransformConvention, TransformRange, TransformState},
};

#[derive(Debug, Clone, PartialEq)]
pub struct ImageSlot {
    pub image: Option<ImageRef>,
    pub transform: TransformState,
    pub orientation: Orientation,
}

/// Fixed set of upload slots for multi-image and film strip layouts.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSlots {
    slots: Vec<ImageSlot>,
    current: usize,
    range: TransformRange,
}

impl ImageSlots {
    pub fn new(count: usize, range: TransformRange) -> Self {
        let slot = ImageSlot {
            image: None,
            transform: range.reset(),
            orientation: Orientation::Unknown,
        };
        Self {
            slots: vec![slot; count.max(1)],
            current: 0,
            range,
        }
    }

    /// Rebuilds slots from a payload: images fill slots in order, transforms
    /// are clamped into the slot range.
    pub fn restore(
        count: usize,
        range: TransformRange,
        images: &[ImageRef],
        transforms: &[TransformState],
    ) -> Self {
        let mut slots = Self::new(count, range);
        for (slot, image) in slots.slots.iter_mut().zip(images) {
            slot.image = Some(image.clone());
        }
        for (slot, transform) in slots.slots.iter_mut().zip(transforms) {
            slot.transform = range.clamp(*transform);
        }
        slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn range(&self) -> TransformRange {
        self.range
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &ImageSlot {
        &self.slots[self.current]
    }

    pub fn get(&self, index: usize) -> Option<&ImageSlot> {
        self.slots.get(index)
    }

    pub fn select(&mut self, index: usize) -> bool {
        if index < self.slots.len() {
            self.current = index;
            true
        } else {
            false
        }
    }

    pub fn select_next(&mut self) {
        self.current = (self.current + 1).min(self.slots.len() - 1);
    }

    pub fn select_previous(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    /// Places an image in the selected slot with a fresh transform.
    pub fn fill_current(&mut self, image: ImageRef, orientation: Orientation) {
        let reset = self.range.reset();
        let slot = &mut self.slots[self.current];
        slot.image = Some(image);
        slot.orientation = orientation;
        slot.transform = reset;
    }

    pub fn clear(&mut self, index: usize) -> bool {
        let reset = self.range.reset();
        match self.slots.get_mut(index) {
            Some(slot) => {
                slot.image = None;
                slot.orientation = Orientation::Unknown;
                slot.transform = reset;
                true
            }
            None => false,
        }
    }

    pub fn clear_all(&mut self) {
        for index in 0..self.slots.len() {
            self.clear(index);
        }
        self.current = 0;
    }

    pub fn nudge_current(&mut self, nudge: Nudge) {
        let range = self.range;
        let slot = &mut self.slots[self.current];
        if slot.image.is_none() {
            return;
        }
        slot.transform = match range.convention {
            TransformConvention::Absolute => {
                range.nudge_oriented(slot.transform, nudge, slot.orientation)
            }
            TransformConvention::Centered => range.nudge(slot.transform, nudge),
        };
    }

    pub fn reset_current(&mut self) {
        self.slots[self.current].transform = self.range.reset();
    }

    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.image.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.filled_count() == self.slots.len()
    }

    /// Filled images in slot order.
    pub fn images(&self) -> Vec<ImageRef> {
        self.slots
            .iter()
            .filter_map(|slot| slot.image.clone())
            .collect()
    }

    pub fn transforms(&self) -> Vec<TransformState> {
        self.slots.iter().map(|slot| slot.transform).collect()
    }
}

#[cfg(test)]
#[path = "tests/slots_tests.rs"]
mod tests;
