//! Built-in fallback vocabularies.
//!
//! These are used when no corpus file is available, and are merged into the
//! corpus when one is. They lean towards common, concrete words since those
//! make good starting points for expansion.

/// Common Hebrew words.
pub const HEBREW: &[&str] = &[
    "שלום", "אהבה", "אדם", "אישה", "ילד", "ילדה", "אב", "אם", "בית", "עיר", "ארץ", "שמש", "ירח",
    "כוכב", "שמים", "ים", "נהר", "הר", "עץ", "פרח", "אבן", "מים", "אש", "רוח", "אור", "חושך",
    "לילה", "יום", "בוקר", "ערב", "שנה", "חודש", "שבוע", "זמן", "ספר", "מכתב", "מילה", "שפה",
    "שיר", "מוזיקה", "תמונה", "צבע", "לבן", "שחור", "אדום", "ירוק", "כחול", "לחם", "חלב", "בשר",
    "דג", "פרי", "תפוח", "ענב", "יין", "שולחן", "כיסא", "דלת", "חלון", "קיר", "דרך", "רחוב",
    "מכונית", "רכבת", "מטוס", "ספינה", "כסף", "עבודה", "משחק", "ספורט", "כדור", "מלחמה", "צבא",
    "חייל", "מלך", "מלכה", "ממשלה", "חוק", "משפט", "שופט", "מדינה", "עם", "אלוהים", "תפילה",
    "חג", "שבת", "מדע", "רופא", "חולה", "בריאות", "גוף", "ראש", "לב", "יד", "רגל", "עין", "פה",
    "כלב", "חתול", "סוס", "פרה", "ציפור", "נחש", "אריה", "חורף", "קיץ", "גשם", "שלג", "ענן",
    "חלום", "זיכרון", "מחשבה", "שמחה", "עצב", "פחד", "כעס", "תקווה", "אמת", "שקר", "חכמה",
];

/// Common English words.
pub const ENGLISH: &[&str] = &[
    "war", "god", "help", "world", "hand", "peace", "love", "house", "city", "country", "sun",
    "moon", "star", "sky", "sea", "river", "mountain", "tree", "flower", "stone", "water", "fire",
    "wind", "light", "night", "day", "year", "time", "book", "letter", "word", "language", "song",
    "music", "picture", "color", "bread", "milk", "meat", "fish", "fruit", "apple", "wine",
    "table", "chair", "door", "window", "road", "street", "car", "train", "plane", "ship",
    "money", "work", "game", "sport", "ball", "army", "king", "queen", "government", "law",
    "state", "science", "doctor", "health", "body", "head", "heart", "eye", "dog", "cat", "horse",
    "bird", "winter", "summer", "rain", "snow", "cloud", "dream", "memory", "thought", "joy",
    "fear", "anger", "hope", "truth", "wisdom",
];

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use super::*;
    use crate::LanguageProfile;

    #[test]
    fn vocabularies_are_acceptable_and_unique() {
        for (profile, words) in [
            (LanguageProfile::hebrew(), HEBREW),
            (LanguageProfile::english(), ENGLISH),
        ] {
            let unique: HashSet<_> = words.iter().collect();
            assert_eq!(unique.len(), words.len(), "{} has duplicates", profile);
            for word in words {
                assert_eq!(profile.canonicalize(word), *word);
                assert!(profile.accepts(word), "{} rejects {}", profile, word);
            }
        }
    }
}
