//! Ordered catalogue of model input columns.
//!
//! The slot order is the column order the scaler and model were fit on. Nothing
//! in the artifacts records it, so a reordering here silently corrupts every
//! prediction.

use crate::error::SchemaError;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagGroup {
    Airline,
    Origin,
    Destination,
}

impl FlagGroup {
    pub fn prefix(self) -> &'static str {
        match self {
            FlagGroup::Airline => "Airline_",
            FlagGroup::Origin => "Origin_",
            FlagGroup::Destination => "Destination_",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlotKind {
    /// Whole hour of the day, 0..=23.
    Hour,
    /// Departure delay in minutes; bound comes from config.
    DelayMinutes,
    /// One-hot member of a group. Absent means 0.
    Flag { group: FlagGroup, label: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSlot {
    /// Column name as the model saw it during training.
    pub column: String,
    /// snake_case / underscore name accepted from callers.
    pub friendly: String,
    pub aliases: Vec<String>,
    pub kind: SlotKind,
}

impl FeatureSlot {
    pub fn numeric(column: &str, friendly: &str, aliases: &[&str], kind: SlotKind) -> Self {
        Self {
            column: column.to_string(),
            friendly: friendly.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            kind,
        }
    }

    pub fn flag(group: FlagGroup, label: &str) -> Self {
        let column = format!("{}{}", group.prefix(), label);
        let friendly = column.replace(' ', "_");
        Self {
            column,
            friendly,
            aliases: Vec::new(),
            kind: SlotKind::Flag {
                group,
                label: label.to_string(),
            },
        }
    }

    /// Request names in lookup priority: model column first, then friendly, then extra aliases.
    pub fn request_names(&self) -> impl Iterator<Item = &str> {
        let friendly = (self.friendly != self.column).then_some(self.friendly.as_str());
        std::iter::once(self.column.as_str())
            .chain(friendly)
            .chain(self.aliases.iter().map(String::as_str))
    }

    /// Name used in error messages.
    pub fn display_name(&self) -> &str {
        &self.friendly
    }

    pub fn group(&self) -> Option<FlagGroup> {
        match &self.kind {
            SlotKind::Flag { group, .. } => Some(*group),
            _ => None,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match &self.kind {
            SlotKind::Flag { label, .. } => Some(label),
            _ => None,
        }
    }
}

const AIRLINES: [&str; 9] = [
    "Airlink",
    "EgyptAir",
    "Ethiopian Airlines",
    "FlySafair",
    "Kenya Airways",
    "Royal Air Maroc",
    "RwandAir",
    "South African Airways",
    "Tunisair",
];

// CAI Cairo, CMN Casablanca, CPT Cape Town, DSS Dakar, JNB Johannesburg,
// KGL Kigali, LOS Lagos, NBO Nairobi, TUN Tunis
const AIRPORTS: [&str; 9] = ["CAI", "CMN", "CPT", "DSS", "JNB", "KGL", "LOS", "NBO", "TUN"];

#[derive(Debug, Clone)]
pub struct FeatureSchema {
    slots: Vec<FeatureSlot>,
}

impl FeatureSchema {
    pub fn new(slots: Vec<FeatureSlot>) -> Result<Self, SchemaError> {
        if slots.is_empty() {
            return Err(SchemaError::Empty);
        }
        let mut seen = HashSet::new();
        for slot in &slots {
            for name in slot.request_names() {
                if !seen.insert(name.to_string()) {
                    return Err(SchemaError::DuplicateName(name.to_string()));
                }
            }
        }
        Ok(Self { slots })
    }

    /// Columns of the African routes delay model, in training order.
    pub fn african_routes() -> Self {
        let mut slots = vec![
            FeatureSlot::numeric("ScheduledHour", "scheduled_hour", &["scheduled_time"], SlotKind::Hour),
            FeatureSlot::numeric("ActualHour", "actual_hour", &["actual_time"], SlotKind::Hour),
            FeatureSlot::numeric("DepartureDelta", "departure_delay_minutes", &[], SlotKind::DelayMinutes),
        ];
        slots.extend(AIRLINES.iter().map(|a| FeatureSlot::flag(FlagGroup::Airline, a)));
        slots.extend(AIRPORTS.iter().map(|a| FeatureSlot::flag(FlagGroup::Origin, a)));
        slots.extend(AIRPORTS.iter().map(|a| FeatureSlot::flag(FlagGroup::Destination, a)));

        Self { slots }
    }

    pub fn slots(&self) -> &[FeatureSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.column.as_str())
    }

    /// Member labels of one group, in declared order.
    pub fn group_labels(&self, group: FlagGroup) -> impl Iterator<Item = &str> {
        self.slots
            .iter()
            .filter(move |s| s.group() == Some(group))
            .filter_map(FeatureSlot::label)
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::african_routes()
    }
}
