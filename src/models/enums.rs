use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(AnalysisStatus {
    Ok => "ok",
    Repaired => "repaired",
    DegradedDefault => "degraded_default",
    Unavailable => "unavailable",
});

str_enum!(ContactChannel {
    Email => "email",
    Sms => "sms",
});

str_enum!(AlertStatus {
    Sent => "sent",
    Failed => "failed",
    SkippedNoConsent => "skipped_no_consent",
    SkippedNoContacts => "skipped_no_contacts",
    SkippedRateLimit => "skipped_rate_limit",
});

// ---------------------------------------------------------------------------
// RiskLevel
// ---------------------------------------------------------------------------

/// Ordered severity classification driving alerting.
///
/// The derived `Ord` follows declaration order — `Low < Moderate < High <
/// Critical` — which is what the never-downgrade `max` in scoring relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Parse a model-supplied risk level leniently.
    ///
    /// Case-insensitive; accepts "medium" as an alias for moderate (models
    /// often use the two interchangeably). Unknown values yield `None` —
    /// the field is optional and a bad value is simply dropped.
    pub fn parse_lenient(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "moderate" | "medium" => Some(Self::Moderate),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "moderate" => Ok(Self::Moderate),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(DatabaseError::InvalidEnum {
                field: "RiskLevel".into(),
                value: s.into(),
            }),
        }
    }
}
