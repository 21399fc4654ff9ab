// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Onboarding questionnaire.
//!
//! Answers are stored as a flat `key: value` text document, one line per
//! question, which the vector index embeds. The answer pools are what the
//! seeding tool draws synthetic answers from.

use serde_json::{Map, Value};

/// Placeholder written for unanswered questions.
pub const UNANSWERED: &str = "N/A";

/// A question key and the answers the client offers for it.
pub struct Question {
    pub key: &'static str,
    pub answers: &'static [&'static str],
}

pub const QUESTIONS: &[Question] = &[
    Question {
        key: "whatBringsYouHere",
        answers: &[
            "Serious Relationship",
            "Casual Dating",
            "Friendship",
            "Exploring",
            "Not Sure Yet",
        ],
    },
    Question {
        key: "idealRelationshipDynamic",
        answers: &[
            "Long-term",
            "Short-term",
            "Open Relationship",
            "Monogamous",
            "Undecided",
        ],
    },
    Question {
        key: "preferredCommunication",
        answers: &[
            "Text-heavy",
            "Calls",
            "In-person",
            "Mixed",
            "Slow to Respond but Thoughtful",
        ],
    },
    Question {
        key: "attachmentStyle",
        answers: &["Secure", "Anxious", "Avoidant", "Not Sure"],
    },
    Question {
        key: "loveLanguage",
        answers: &[
            "Words of Affirmation",
            "Acts of Service",
            "Physical Touch",
            "Quality Time",
            "Gifts",
        ],
    },
    Question {
        key: "weekendActivity",
        answers: &[
            "Outdoors & Active",
            "Socializing",
            "Traveling",
            "Relaxing at Home",
            "Creative Projects",
            "Gaming",
            "Other",
        ],
    },
    Question {
        key: "petsPreference",
        answers: &[
            "Love them & have one",
            "Want one",
            "Allergic",
            "Not a fan",
            "Neutral",
        ],
    },
    Question {
        key: "dailyRoutine",
        answers: &[
            "Early bird",
            "Night owl",
            "Flexible",
            "Always on the go",
            "Chill & spontaneous",
        ],
    },
    Question {
        key: "conflictHandling",
        answers: &[
            "Talk it out immediately",
            "Need space first",
            "Prefer to avoid conflict",
            "Open to learning better ways",
        ],
    },
    Question {
        key: "biggestTurnOff",
        answers: &[
            "Flakiness & ghosting",
            "Poor communication",
            "Lack of ambition",
            "Different political/social values",
            "Bad hygiene",
            "Other",
        ],
    },
    Question {
        key: "wantKids",
        answers: &["Yes", "No", "Maybe", "Open to discussion"],
    },
    Question {
        key: "workLifeBalance",
        answers: &[
            "Ambitious & work-driven",
            "Balanced",
            "Flexible",
            "More laid-back",
            "Still figuring it out",
        ],
    },
    Question {
        key: "biggestDealbreaker",
        answers: &[
            "Trust issues",
            "Lack of ambition",
            "Incompatibility in beliefs",
            "Lack of affection",
            "Different lifestyles",
        ],
    },
    Question {
        key: "successInRelationship",
        answers: &[
            "Growing together",
            "Emotional support",
            "Shared experiences",
            "Passion & chemistry",
            "Other",
        ],
    },
    Question {
        key: "uncompromisableValue",
        answers: &[
            "Honesty",
            "Loyalty",
            "Family",
            "Religion",
            "Career",
            "Personal Freedom",
            "Other",
        ],
    },
    Question {
        key: "funFact",
        answers: &[
            "I can juggle flaming torches",
            "I once hiked 10 miles barefoot",
            "I have a secret talent for beatboxing",
            "I can solve a Rubik's cube in under a minute",
        ],
    },
    Question {
        key: "comfortFood",
        answers: &["Tacos", "Sushi", "Pizza", "Pasta", "Burgers", "Other"],
    },
    Question {
        key: "dreamLife",
        answers: &[
            "Traveling the world",
            "Running my own business",
            "Living in a cabin in the woods",
            "Writing a book",
            "Exploring outer space",
        ],
    },
    Question {
        key: "guiltyPleasure",
        answers: &[
            "Reality TV",
            "Cheesy rom-coms",
            "K-pop",
            "Heavy metal",
            "Old-school cartoons",
        ],
    },
    Question {
        key: "perfectFirstDate",
        answers: &[
            "A sunset picnic by the beach",
            "Exploring a new city together",
            "Cooking a meal together",
            "A spontaneous road trip",
            "Stargazing in the mountains",
        ],
    },
    Question {
        key: "selfImprovement",
        answers: &[
            "Being more patient",
            "Learning a new language",
            "Getting better at setting boundaries",
            "Becoming more confident",
        ],
    },
    Question {
        key: "pastRelationshipLesson",
        answers: &[
            "Communication is everything",
            "Compromise is key",
            "Trust takes time",
            "Love is not enough without respect",
        ],
    },
    Question {
        key: "similarOrChallenge",
        answers: &[
            "Someone similar to me",
            "Someone who challenges me",
            "A mix of both",
        ],
    },
    Question {
        key: "liveAnywhere",
        answers: &[
            "Tokyo for the food and culture",
            "Bali for the beaches and peace",
            "New York for the energy and opportunities",
            "Paris for the romance",
            "Switzerland for the nature and hiking",
        ],
    },
    Question {
        key: "heartWinner",
        answers: &[
            "Remembering small details about me",
            "Making me laugh when I least expect it",
            "Being kind to strangers",
            "Bringing me my favorite snack without asking",
        ],
    },
];

/// Render answers as the text document that gets embedded.
///
/// Lines keep the order of `responses`. Strings are written verbatim, nulls
/// as [`UNANSWERED`], arrays comma-joined without brackets or quotes, anything
/// else as its JSON text.
pub fn render_document(responses: &Map<String, Value>) -> String {
    let mut document = String::new();
    for (key, value) in responses {
        let answer = match value {
            Value::Null => UNANSWERED.to_string(),
            other => answer_text(other),
        };
        document.push_str(key);
        document.push_str(": ");
        document.push_str(&answer);
        document.push('\n');
    }
    document
}

/// Text of one answer. Null array elements are empty and nested arrays
/// flatten into the same list.
fn answer_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().map(answer_text).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn render_document_keeps_submission_order() {
        let responses = json!({
            "wantKids": "Maybe",
            "comfortFood": "Tacos",
            "funFact": null,
            "age": 31,
        });
        let document = render_document(responses.as_object().unwrap());
        assert_eq!(
            document,
            "wantKids: Maybe\ncomfortFood: Tacos\nfunFact: N/A\nage: 31\n"
        );
    }

    #[test]
    fn render_document_joins_multi_select_answers() {
        let responses = json!({
            "hobbies": ["Hiking", "Chess"],
            "pets": [],
            "mixed": ["Dogs", null, 2, ["Cats", true]],
        });
        let document = render_document(responses.as_object().unwrap());
        assert_eq!(
            document,
            "hobbies: Hiking,Chess\npets: \nmixed: Dogs,,2,Cats,true\n"
        );
    }

    #[test]
    fn render_document_of_no_answers_is_empty() {
        assert_eq!(render_document(&Map::new()), "");
    }

    #[test]
    fn every_question_offers_answers() {
        assert_eq!(QUESTIONS.len(), 25);
        for question in QUESTIONS {
            assert!(!question.answers.is_empty(), "{} has no answers", question.key);
        }
    }
}
