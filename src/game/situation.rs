use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A difficulty level, gating which situation table is shown.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(into = "String", try_from = "String")]
pub enum Level {
    One,
    Two,
}

/// A situation card and its candidate responses.
#[derive(Clone, Copy, Serialize, Debug)]
pub struct Situation {
    pub label: &'static str,
    pub responses: &'static [Response],
}

/// A candidate response to a situation.
#[derive(Clone, Copy, Serialize, Debug)]
#[serde(untagged)]
pub enum Response {
    Text(&'static str),
    Role {
        role: &'static str,
        skill: &'static str,
        description: &'static str,
    },
}

impl Level {
    pub const ALL: [Level; 2] = [Level::One, Level::Two];

    /// Gets the situations for this level, in display order.
    pub fn situations(self) -> &'static [Situation] {
        match self {
            Level::One => LEVEL_ONE,
            Level::Two => LEVEL_TWO,
        }
    }

    /// Finds the situation with the given label.
    pub fn find_situation(self, label: &str) -> Option<&'static Situation> {
        self.situations().iter().find(|s| s.label == label)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::One => f.write_str("Level 1"),
            Level::Two => f.write_str("Level 2"),
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.to_string() == s)
            .ok_or_else(|| format!("unknown level: {}", s))
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        level.to_string()
    }
}

impl TryFrom<String> for Level {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

const LEVEL_ONE: &[Situation] = &[
    Situation {
        label: "One member of the team appears unmotivated",
        responses: &[Response::Text("Empathy"), Response::Text("Active listening")],
    },
    Situation {
        label: "Two colleagues disagree about a deadline",
        responses: &[Response::Text("Conflict resolution"), Response::Text("Negotiation")],
    },
    Situation {
        label: "A client rejects the proposal at the last minute",
        responses: &[Response::Text("Adaptability"), Response::Text("Stress management")],
    },
    Situation {
        label: "A new hire is struggling to find their place",
        responses: &[Response::Text("Kindness"), Response::Text("Communication")],
    },
];

const LEVEL_TWO: &[Situation] = &[
    Situation {
        label: "The team misses its quarterly objective",
        responses: &[
            Response::Role {
                role: "Manager",
                skill: "Leadership",
                description: "Rally the team around a clear recovery plan.",
            },
            Response::Role {
                role: "Colleague",
                skill: "Empathy",
                description: "Acknowledge the frustration before looking for causes.",
            },
        ],
    },
    Situation {
        label: "A project is handed over with no documentation",
        responses: &[
            Response::Role {
                role: "Developer",
                skill: "Problem solving",
                description: "Break the unknowns down and tackle them one at a time.",
            },
            Response::Role {
                role: "Manager",
                skill: "Organisation",
                description: "Plan time for the handover gaps with the previous owner.",
            },
        ],
    },
    Situation {
        label: "A meeting keeps running over time",
        responses: &[
            Response::Role {
                role: "Facilitator",
                skill: "Time management",
                description: "Set an agenda with timeboxes and hold to it.",
            },
            Response::Role {
                role: "Participant",
                skill: "Assertiveness",
                description: "Politely point out when the discussion drifts.",
            },
        ],
    },
];
