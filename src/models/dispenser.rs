// SPDX-License-Identifier: MIT
// Copyright 2026 The Serena Care Authors

//! Pill dispenser model: a device with a fixed ring of compartments.

use serde::{Deserialize, Serialize};

/// Number of compartments on a dispenser.
pub const SLOT_COUNT: usize = 14;

/// Response of `GET /device/by_senior/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceResponse {
    #[serde(default, deserialize_with = "super::id::optional")]
    pub id: Option<String>,
    #[serde(default)]
    pub dispenser: Option<DispenserPayload>,
}

/// Dispenser part of the device response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DispenserPayload {
    #[serde(default)]
    pub compartments: Vec<Compartment>,
}

/// One compartment as sent by the backend. Every field may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Compartment {
    #[serde(default, deserialize_with = "super::id::optional", alias = "id")]
    pub compartment_id: Option<String>,
    #[serde(default, deserialize_with = "super::id::optional")]
    pub medication_id: Option<String>,
    #[serde(default)]
    pub medication_name: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
}

/// Body of `PUT /compartment/{id}`.
///
/// An empty `medication_id` with quantity 0 clears the compartment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompartmentUpdate {
    pub medication_id: String,
    pub quantity: u32,
}

impl CompartmentUpdate {
    pub fn clear() -> Self {
        Self {
            medication_id: String::new(),
            quantity: 0,
        }
    }
}

/// A slot on the dispenser ring, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    /// Position on the ring, 1-based
    pub position: usize,
    /// Backend compartment ID; `None` if the device did not report one
    pub compartment_id: Option<String>,
    /// Bound medication, empty when unbound
    pub medication_id: String,
    pub medication_name: String,
    pub quantity: u32,
}

impl Slot {
    fn empty(position: usize) -> Self {
        Self {
            position,
            compartment_id: None,
            medication_id: String::new(),
            medication_name: String::new(),
            quantity: 0,
        }
    }

    fn from_compartment(position: usize, c: &Compartment) -> Self {
        Self {
            position,
            compartment_id: c.compartment_id.clone(),
            medication_id: c.medication_id.clone().unwrap_or_default(),
            medication_name: c.medication_name.clone().unwrap_or_default(),
            quantity: c.quantity.unwrap_or(0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.medication_id.is_empty()
    }

    /// Apply a successful compartment update locally.
    pub fn apply(&mut self, update: &CompartmentUpdate, medication_name: &str) {
        if update.medication_id.is_empty() {
            self.medication_id.clear();
            self.medication_name.clear();
            self.quantity = 0;
        } else {
            self.medication_id = update.medication_id.clone();
            self.medication_name = medication_name.to_string();
            self.quantity = update.quantity;
        }
    }
}

/// The full ring of `SLOT_COUNT` slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dispenser {
    slots: Vec<Slot>,
}

impl Default for Dispenser {
    fn default() -> Self {
        Self {
            slots: (1..=SLOT_COUNT).map(Slot::empty).collect(),
        }
    }
}

impl Dispenser {
    /// Build the ring from the device response, in compartment order.
    ///
    /// Missing compartments become empty slots without a compartment ID;
    /// extra compartments beyond `SLOT_COUNT` are ignored.
    pub fn from_device(device: &DeviceResponse) -> Self {
        let compartments = device
            .dispenser
            .as_ref()
            .map(|d| d.compartments.as_slice())
            .unwrap_or_default();

        let slots = (0..SLOT_COUNT)
            .map(|i| match compartments.get(i) {
                Some(c) => Slot::from_compartment(i + 1, c),
                None => Slot::empty(i + 1),
            })
            .collect();

        Self { slots }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Slot at a 1-based position.
    pub fn slot(&self, position: usize) -> Option<&Slot> {
        position
            .checked_sub(1)
            .and_then(|index| self.slots.get(index))
    }

    pub fn slot_mut(&mut self, position: usize) -> Option<&mut Slot> {
        position
            .checked_sub(1)
            .and_then(|index| self.slots.get_mut(index))
    }

    /// Number of slots with a medication bound.
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_empty()).count()
    }
}
