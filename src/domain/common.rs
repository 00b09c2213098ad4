use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifies entities that expose a stable backend identifier.
pub trait Identifiable {
    fn id(&self) -> &str;
}

/// Supplies a presentation-ready label for UI or logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Error returned when parsing one of the wire enums from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} `{}`", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:tt {
            $($variant:ident => $wire:tt, $label:tt;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Value sent to and received from the backend.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }

            /// Human-readable label.
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let normalized = value.trim().to_ascii_lowercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.as_str() == normalized)
                    .ok_or_else(|| UnknownVariant {
                        kind: $kind,
                        value: value.to_string(),
                    })
            }
        }
    };
}

wire_enum! {
    /// Role of a signed-in user.
    UserRole, "role" {
        Admin => "admin", "Administrator";
        Staff => "staff", "Staff";
        Student => "student", "Student";
        Teacher => "teacher", "Teacher";
    }
}

wire_enum! {
    /// Lifecycle status of a student account.
    StudentStatus, "student status" {
        Active => "active", "Active";
        Inactive => "inactive", "Inactive";
        Suspended => "suspended", "Suspended";
    }
}

wire_enum! {
    /// Lifecycle status of a classroom.
    ClassroomStatus, "classroom status" {
        Active => "active", "Active";
        Inactive => "inactive", "Inactive";
        Completed => "completed", "Completed";
        Cancelled => "cancelled", "Cancelled";
    }
}

wire_enum! {
    /// Placement level a student enters with.
    InputLevel, "input level" {
        Beginner => "beginner", "Beginner";
        Elementary => "elementary", "Elementary";
        Intermediate => "intermediate", "Intermediate";
        Advanced => "advanced", "Advanced";
    }
}

wire_enum! {
    Weekday, "weekday" {
        Monday => "monday", "Monday";
        Tuesday => "tuesday", "Tuesday";
        Wednesday => "wednesday", "Wednesday";
        Thursday => "thursday", "Thursday";
        Friday => "friday", "Friday";
        Saturday => "saturday", "Saturday";
        Sunday => "sunday", "Sunday";
    }
}

/// Cuts an ISO timestamp such as `2024-09-01T00:00:00` down to its date part.
pub fn date_part(value: &str) -> &str {
    value.split('T').next().unwrap_or(value)
}
