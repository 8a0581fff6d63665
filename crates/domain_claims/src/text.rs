//! Text signals shared by fraud checks and policy matching
//!
//! Matching works on normalized word tokens: lowercase, common Latin
//! diacritics folded, punctuation dropped. Phrases only match on whole-word
//! boundaries and are ignored when negated within the few preceding words
//! ("not fit to travel", "no history of pre-existing conditions").

/// Narrative phrases asserting the insured could not travel for health reasons
pub const INCAPACITATION_PHRASES: &[&str] = &[
    "hospitalised",
    "hospitalized",
    "hospitalisation",
    "hospitalization",
    "admitted to hospital",
    "admitted to the hospital",
    "emergency surgery",
    "surgery",
    "intensive care",
    "unable to travel",
    "unfit to travel",
    "bedridden",
    "broke my",
    "fracture",
    "fractured",
    "injured",
    "seriously ill",
    "fell ill",
    "diagnosed with",
    "hospitalise",
    "hospitalisee",
];

/// Medical-document phrases asserting the patient is in good health
pub const HEALTHY_PHRASES: &[&str] = &[
    "fit to travel",
    "medically fit",
    "fully fit",
    "in good health",
    "good general health",
    "healthy",
    "no medical condition",
    "no contraindication",
    "no signs of illness",
    "apte a voyager",
    "en bonne sante",
];

const NEGATIONS: &[&str] = &["not", "no", "never", "isnt", "wasnt", "non", "without"];

/// Words placing a state in the past or the future rather than now
const QUALIFIERS: &[&str] = &[
    "previously",
    "formerly",
    "prior",
    "before",
    "until",
    "expected",
    "discharged",
    "once",
    "will",
];

/// How many words before a phrase are searched for a negation
const NEGATION_WINDOW: usize = 3;

/// Lowercases, folds diacritics and replaces punctuation with spaces
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch == '\'' || ch == '’' {
            continue;
        }
        for lower in ch.to_lowercase() {
            match fold(lower) {
                Some(folded) => out.push_str(folded),
                None if lower.is_alphanumeric() => out.push(lower),
                None => out.push(' '),
            }
        }
    }
    out
}

fn fold(ch: char) -> Option<&'static str> {
    let folded = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'ç' => "c",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => "o",
        'ù' | 'ú' | 'û' | 'ü' => "u",
        'ý' | 'ÿ' => "y",
        'ß' => "ss",
        _ => return None,
    };
    Some(folded)
}

/// Splits text into normalized word tokens
pub fn tokens(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Returns the first phrase the text asserts (matched and not negated)
pub fn first_asserted<'p, S: AsRef<str>>(text: &str, phrases: &'p [S]) -> Option<&'p str> {
    asserted(text, phrases).into_iter().next()
}

/// Every phrase the text asserts, in list order
pub fn asserted<'p, S: AsRef<str>>(text: &str, phrases: &'p [S]) -> Vec<&'p str> {
    let words = tokens(text);
    phrases
        .iter()
        .map(|phrase| phrase.as_ref())
        .filter(|phrase| asserts(&words, phrase))
        .collect()
}

/// Returns the first phrase the text asserts as the present state
///
/// Like [`first_asserted`], but "previously healthy" or "expected to be
/// discharged in good health" do not count.
pub fn first_current<'p, S: AsRef<str>>(text: &str, phrases: &'p [S]) -> Option<&'p str> {
    let words = tokens(text);
    phrases
        .iter()
        .map(|phrase| phrase.as_ref())
        .find(|phrase| occurs_unqualified(&words, phrase, &[NEGATIONS, QUALIFIERS]))
}

/// Every phrase the text contains, negated or not, in list order
pub fn mentioned<'p, S: AsRef<str>>(text: &str, phrases: &'p [S]) -> Vec<&'p str> {
    let words = tokens(text);
    phrases
        .iter()
        .map(|phrase| phrase.as_ref())
        .filter(|phrase| find_phrase(&words, phrase).next().is_some())
        .collect()
}

/// Returns true if the text contains the phrase on word boundaries
pub fn mentions(text: &str, phrase: &str) -> bool {
    find_phrase(&tokens(text), phrase).next().is_some()
}

fn asserts(words: &[String], phrase: &str) -> bool {
    occurs_unqualified(words, phrase, &[NEGATIONS])
}

fn occurs_unqualified(words: &[String], phrase: &str, blockers: &[&[&str]]) -> bool {
    find_phrase(words, phrase).any(|start| {
        words[start.saturating_sub(NEGATION_WINDOW)..start]
            .iter()
            .all(|word| !blockers.iter().any(|list| list.contains(&word.as_str())))
    })
}

fn find_phrase<'w>(words: &'w [String], phrase: &str) -> impl Iterator<Item = usize> + 'w {
    let needle = tokens(phrase);
    let width = needle.len();
    let last_start = if width == 0 || width > words.len() {
        0
    } else {
        words.len() - width + 1
    };
    (0..last_start).filter(move |&i| words[i..i + width] == needle[..])
}

/// Compares two personal names tolerant of order, case and initials
///
/// "J. Smith" matches "John Smith"; "Smith" does not match "Smithson";
/// names with no full word in common never match.
pub fn names_match(a: &str, b: &str) -> bool {
    let (full_a, initials_a) = split_name(a);
    let (full_b, initials_b) = split_name(b);
    if full_a.is_empty() || full_b.is_empty() {
        return false;
    }

    let (short_full, short_initials, long_full) = if full_a.len() <= full_b.len() {
        (&full_a, &initials_a, &full_b)
    } else {
        (&full_b, &initials_b, &full_a)
    };

    short_full.iter().all(|word| long_full.contains(word))
        && short_initials
            .iter()
            .all(|initial| long_full.iter().any(|word| word.starts_with(initial.as_str())))
}

fn split_name(name: &str) -> (Vec<String>, Vec<String>) {
    tokens(name).into_iter().partition(|word| word.chars().count() > 1)
}
