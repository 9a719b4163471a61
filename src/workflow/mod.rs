// Marine cargo workflow: vocabulary and transition table

use serde::{Deserialize, Serialize};

/// Serialize by wire name; deserialize through `parse` so unknown names fail.
macro_rules! wire_name_serde {
    ($ty:ty) => {
        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let name = <String as serde::Deserialize>::deserialize(deserializer)?;
                <$ty>::parse(&name).map_err(serde::de::Error::custom)
            }
        }
    };
}

pub mod events;
pub mod states;
pub mod table;

pub use events::WorkflowEvent;
pub use states::WorkflowState;
pub use table::{
    transition, RuleConflict, TableError, TableReport, Transition, TransitionRule,
    TransitionTable, REFERENCE_RULES,
};

/// Parties taking part in a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum Participant {
    Importer,
    Exporter,
    Insurer,
    Shipper,
    Surveyor,
}

impl Participant {
    pub(crate) fn from_wire_prefix(name: &str) -> Option<Self> {
        let prefix = name.split('_').next()?;
        match prefix {
            "Imp" | "Importer" => Some(Participant::Importer),
            "Exp" => Some(Participant::Exporter),
            "InsCo" => Some(Participant::Insurer),
            "Shipper" => Some(Participant::Shipper),
            "Surveyor" | "Sureveyor" => Some(Participant::Surveyor),
            _ => None,
        }
    }
}
