use std::{fmt, slice::Iter};

/// Fixed catalog of the muscle groups a workout can be attributed to.
///
/// The catalog is static configuration, not user data. Every aggregation
/// over muscle groups reports all nine entries, including those without
/// any matching records.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum BodyPart {
    Chest,
    Back,
    Shoulders,
    Biceps,
    Triceps,
    Forearms,
    Abs,
    Legs,
    Calves,
}

impl BodyPart {
    pub fn iter() -> Iter<'static, BodyPart> {
        static BODY_PARTS: [BodyPart; 9] = [
            BodyPart::Chest,
            BodyPart::Back,
            BodyPart::Shoulders,
            BodyPart::Biceps,
            BodyPart::Triceps,
            BodyPart::Forearms,
            BodyPart::Abs,
            BodyPart::Legs,
            BodyPart::Calves,
        ];
        BODY_PARTS.iter()
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            BodyPart::Chest => "Chest",
            BodyPart::Back => "Back",
            BodyPart::Shoulders => "Shoulders",
            BodyPart::Biceps => "Biceps",
            BodyPart::Triceps => "Triceps",
            BodyPart::Forearms => "Forearms",
            BodyPart::Abs => "Abs",
            BodyPart::Legs => "Legs",
            BodyPart::Calves => "Calves",
        }
    }

    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            BodyPart::Chest => "chest",
            BodyPart::Back => "back",
            BodyPart::Shoulders => "shoulders",
            BodyPart::Biceps => "biceps",
            BodyPart::Triceps => "triceps",
            BodyPart::Forearms => "forearms",
            BodyPart::Abs => "abs",
            BodyPart::Legs => "legs",
            BodyPart::Calves => "calves",
        }
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<&str> for BodyPart {
    type Error = BodyPartError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        BodyPart::iter()
            .find(|p| p.name() == value)
            .copied()
            .ok_or_else(|| BodyPartError::Unknown(value.to_string()))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum BodyPartError {
    #[error("Unknown muscle group: {0}")]
    Unknown(String),
}
