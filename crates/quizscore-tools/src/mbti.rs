//! Descriptions of the sixteen MBTI types.

use quizscore_core::engine::Assessment;

const TYPES: [(&str, &str, &str); 16] = [
    (
        "ISTJ",
        "The Inspector",
        "Quiet, thorough, and dependable. Values order, facts, and keeping commitments.",
    ),
    (
        "ISFJ",
        "The Protector",
        "Warm and conscientious. Remembers details about people and works to meet their needs.",
    ),
    (
        "INFJ",
        "The Counselor",
        "Insightful and principled. Seeks meaning and wants to help others grow.",
    ),
    (
        "INTJ",
        "The Mastermind",
        "Independent strategist. Builds long-range plans and holds them to a high standard.",
    ),
    ("ISTP", "The Craftsman", "Calm problem solver. Learns how things work by taking them apart."),
    (
        "ISFP",
        "The Composer",
        "Gentle and observant. Lives by personal values and enjoys the present moment.",
    ),
    (
        "INFP",
        "The Healer",
        "Idealistic and curious. Driven by values and a wish to understand people.",
    ),
    (
        "INTP",
        "The Architect",
        "Analytical and inventive. Looks for the logical principle behind everything.",
    ),
    ("ESTP", "The Dynamo", "Energetic and pragmatic. Acts fast and adapts on the fly."),
    (
        "ESFP",
        "The Performer",
        "Outgoing and spontaneous. Brings energy and fun to the people around them.",
    ),
    (
        "ENFP",
        "The Champion",
        "Enthusiastic and imaginative. Sees possibilities everywhere and inspires others.",
    ),
    ("ENTP", "The Visionary", "Quick and ingenious. Enjoys debate and new challenges."),
    (
        "ESTJ",
        "The Supervisor",
        "Organized and decisive. Makes plans happen and keeps people on track.",
    ),
    (
        "ESFJ",
        "The Provider",
        "Caring and sociable. Creates harmony and takes care of practical needs.",
    ),
    ("ENFJ", "The Teacher", "Charismatic and empathetic. Brings out the best in groups."),
    ("ENTJ", "The Commander", "Bold and strategic. Organizes people and resources toward a goal."),
];

/// Short nickname for a four-letter type code, e.g. "The Architect".
pub fn nickname(code: &str) -> Option<&'static str> {
    lookup(code).map(|(_, nickname, _)| nickname)
}

/// A short description of a four-letter type code. Case-insensitive.
pub fn describe(code: &str) -> Option<&'static str> {
    lookup(code).map(|(_, _, description)| description)
}

/// The type code and description of an MBTI assessment.
pub fn personality(assessment: &Assessment) -> Option<(&str, &'static str)> {
    let code = assessment.type_code.as_deref()?;
    Some((code, describe(code)?))
}

fn lookup(code: &str) -> Option<(&'static str, &'static str, &'static str)> {
    let code = code.trim().to_ascii_uppercase();
    TYPES.iter().copied().find(|(c, _, _)| *c == code)
}
