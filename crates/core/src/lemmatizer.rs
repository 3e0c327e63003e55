//! Rule-based reduction of English words to a base form.
//!
//! An exception table covers irregular forms; everything else goes through
//! plural stripping or `-ed`/`-ing` removal with the usual spelling repairs
//! (`running` -> `run`, `making` -> `make`, `created` -> `create`).

const IRREGULAR: &[(&str, &str)] = &[
    ("children", "child"),
    ("does", "do"),
    ("echoes", "echo"),
    ("feet", "foot"),
    ("geese", "goose"),
    ("goes", "go"),
    ("heroes", "hero"),
    ("knives", "knife"),
    ("leaves", "leaf"),
    ("lives", "life"),
    ("men", "man"),
    ("mice", "mouse"),
    ("people", "person"),
    ("potatoes", "potato"),
    ("ran", "run"),
    ("taught", "teach"),
    ("teeth", "tooth"),
    ("thought", "think"),
    ("tomatoes", "tomato"),
    ("using", "use"),
    ("went", "go"),
    ("wives", "wife"),
    ("wolves", "wolf"),
    ("women", "woman"),
    ("written", "write"),
    ("wrote", "write"),
];

/// Nouns and adjectives that only look inflected.
const KEEP: &[&str] = &[
    "accounting", "anything", "banking", "billing", "booking", "building", "ceiling",
    "clothing", "evening", "everything", "feeling", "funding", "heading", "housing",
    "hundred", "kindred", "marketing", "meeting", "morning", "naked", "news", "nothing",
    "offering", "painting", "pricing", "sacred", "series", "setting", "shipping",
    "something", "species", "spring", "string", "thing", "training", "wedding", "wicked",
];

/// Nouns whose singular ends in `-ie`, so `-ies` must not become `-y`.
const IE_NOUNS: &[&str] = &[
    "brownie", "calorie", "cookie", "goalie", "movie", "prairie", "rookie", "selfie",
    "smoothie", "zombie",
];

pub fn lemmatize(word: &str) -> String {
    if let Some((_, base)) = IRREGULAR.iter().find(|(form, _)| *form == word) {
        return base.to_string();
    }
    if word.len() <= 3 || KEEP.contains(&word) || !word.is_ascii() {
        return word.to_string();
    }
    if let Some(singular) = singularize(word) {
        return singular;
    }
    strip_verb_suffix(word).unwrap_or_else(|| word.to_string())
}

fn singularize(word: &str) -> Option<String> {
    if let Some(stem) = word.strip_suffix("ies") {
        let ie = &word[..word.len() - 1];
        if IE_NOUNS.contains(&ie) {
            return Some(ie.to_string());
        }
        if word.len() > 4 {
            return Some(format!("{stem}y"));
        }
        return None;
    }
    if let Some(stem) = word.strip_suffix("sses") {
        return Some(format!("{stem}ss"));
    }
    for suffix in ["shes", "ches", "xes", "zzes"] {
        if word.ends_with(suffix) {
            return Some(word[..word.len() - 2].to_string());
        }
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return None;
    }
    word.strip_suffix('s').map(str::to_string)
}

fn strip_verb_suffix(word: &str) -> Option<String> {
    if let Some(stem) = word.strip_suffix("eed") {
        return if measure(stem) > 0 {
            Some(format!("{stem}ee"))
        } else {
            None
        };
    }
    if let Some(stem) = word.strip_suffix("ied") {
        if word.len() > 4 {
            return Some(format!("{stem}y"));
        }
        return None;
    }
    let stem = word
        .strip_suffix("ing")
        .or_else(|| word.strip_suffix("ed"))?;
    if !has_vowel(stem) || ends_consonant_r(stem) {
        return None;
    }
    Some(repair(stem))
}

/// Undoes the spelling changes made when the suffix was attached.
fn repair(stem: &str) -> String {
    if stem.ends_with("at") || stem.ends_with("iz") {
        return format!("{stem}e");
    }
    let b = stem.as_bytes();
    let n = b.len();
    // handl -> handle, settl -> settle, sampl -> sample
    if n >= 2 && b[n - 1] == b'l' && matches!(b[n - 2], b'b' | b'c' | b'd' | b'f' | b'g' | b'k' | b'p' | b't' | b'z') {
        return format!("{stem}e");
    }
    if n >= 2 && b[n - 1] == b[n - 2] && is_consonant(b, n - 1) && !matches!(b[n - 1], b'l' | b's' | b'z') {
        return stem[..n - 1].to_string();
    }
    if measure(stem) == 1 && ends_cvc(b) {
        return format!("{stem}e");
    }
    stem.to_string()
}

/// `hundr`, `sacr`: no English word ends in consonant + `r`.
fn ends_consonant_r(stem: &str) -> bool {
    let b = stem.as_bytes();
    let n = b.len();
    n >= 2 && b[n - 1] == b'r' && b[n - 2] != b'r' && is_consonant(b, n - 2)
}

fn is_consonant(b: &[u8], i: usize) -> bool {
    match b[i] {
        b'a' | b'e' | b'i' | b'o' | b'u' => false,
        b'y' => i == 0 || !is_consonant(b, i - 1),
        _ => true,
    }
}

fn has_vowel(stem: &str) -> bool {
    let b = stem.as_bytes();
    (0..b.len()).any(|i| !is_consonant(b, i))
}

/// Number of vowel-consonant sequences, the `m` in `[C](VC)^m[V]`.
fn measure(stem: &str) -> usize {
    let b = stem.as_bytes();
    let mut m = 0;
    let mut prev_vowel = false;
    for i in 0..b.len() {
        let vowel = !is_consonant(b, i);
        if prev_vowel && !vowel {
            m += 1;
        }
        prev_vowel = vowel;
    }
    m
}

fn ends_cvc(b: &[u8]) -> bool {
    let n = b.len();
    n >= 3
        && is_consonant(b, n - 3)
        && !is_consonant(b, n - 2)
        && is_consonant(b, n - 1)
        && !matches!(b[n - 1], b'w' | b'x' | b'y')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_forms() {
        let cases = [
            ("running", "run"),
            ("reports", "report"),
            ("studies", "study"),
            ("classes", "class"),
            ("boxes", "box"),
            ("matches", "match"),
            ("created", "create"),
            ("organized", "organize"),
            ("stopped", "stop"),
            ("planned", "plan"),
            ("making", "make"),
            ("writing", "write"),
            ("forecasting", "forecast"),
            ("reading", "read"),
            ("falling", "fall"),
            ("studied", "study"),
            ("played", "play"),
            ("agreed", "agree"),
            ("need", "need"),
            ("children", "child"),
    ("does", "do"),
    ("echoes", "echo"),
            ("using", "use"),
            ("goes", "go"),
            ("heroes", "hero"),
            ("movies", "movie"),
            ("settled", "settle"),
            ("handling", "handle"),
            ("troubled", "trouble"),
            ("ordered", "order"),
        ];
        for (word, want) in cases {
            assert_eq!(lemmatize(word), want, "{word}");
        }
    }

    #[test]
    fn leaves_base_forms_alone() {
        for word in [
            "budget", "analysis", "status", "class", "thing", "string", "morning", "red", "tax",
            "hundred", "series", "species", "wedding", "marketing",
        ] {
            assert_eq!(lemmatize(word), word, "{word}");
        }
    }

    #[test]
    fn never_strips_into_consonant_r() {
        assert_eq!(lemmatize("centred"), "centred");
        assert_eq!(lemmatize("entered"), "enter");
    }

    #[test]
    fn measure_counts_vc_pairs() {
        assert_eq!(measure("tr"), 0);
        assert_eq!(measure("tree"), 0);
        assert_eq!(measure("trouble"), 1);
        assert_eq!(measure("oaten"), 2);
    }
}
