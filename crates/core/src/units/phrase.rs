//! Unit phrase tokenizer
//!
//! Turns free-form text such as `"lb/ft2"`, `"kg per m3"` or `"degrees F"`
//! into a flat token stream. Resolving tokens against the alias table is the
//! registry's job; this module only normalizes separators.

/// One lexical element of a unit phrase
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// `/` or the word `per`; every following term has its exponent negated
    Divisor,
    /// A unit term, possibly carrying a prefix, exponent or plural `s`
    Word(String),
}

/// Characters that survive normalization besides ASCII alphanumerics
const KEPT: [char; 5] = ['^', '%', '_', '\'', '"'];

/// Temperature scales that may follow a `deg`/`degree`/`degrees` word
const TEMPERATURE_SCALES: [(&str, char); 7] = [
    ("F", 'F'),
    ("C", 'C'),
    ("K", 'K'),
    ("Fahrenheit", 'F'),
    ("Celsius", 'C'),
    ("Centigrade", 'C'),
    ("Kelvin", 'K'),
];

/// Map superscript digits and signs onto their ASCII forms
fn fold_superscript(c: char) -> Option<char> {
    Some(match c {
        '⁰' => '0',
        '¹' => '1',
        '²' => '2',
        '³' => '3',
        '⁴' => '4',
        '⁻' => '-',
        _ => return None,
    })
}

/// Rewrite every separator to a space and isolate `/` as its own token.
///
/// A `+` or `-` is kept only when a digit follows it, so `m-1` and `s^-2`
/// keep their signed exponents while `lb-ft` splits into two terms.
fn normalize(phrase: &str) -> String {
    let chars: Vec<char> = phrase
        .chars()
        .map(|c| fold_superscript(c).unwrap_or(c))
        .collect();
    let mut out = String::with_capacity(chars.len() + 8);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_alphanumeric() || KEPT.contains(&c) {
            out.push(c);
        } else if c == '/' {
            out.push_str(" / ");
        } else if (c == '-' || c == '+')
            && chars.get(i + 1).is_some_and(char::is_ascii_digit)
        {
            out.push(c);
        } else {
            out.push(' ');
        }
    }
    out
}

/// Split a unit phrase into tokens.
pub(crate) fn tokenize(phrase: &str) -> Vec<Token> {
    let normalized = normalize(phrase);
    let words: Vec<&str> = normalized.split_whitespace().collect();
    let mut tokens = Vec::with_capacity(words.len());

    let mut i = 0;
    while i < words.len() {
        let word = words[i];
        if word == "/" || word.eq_ignore_ascii_case("per") {
            tokens.push(Token::Divisor);
            i += 1;
            continue;
        }

        // "degrees F" is a single temperature term, not angle times Fahrenheit
        if matches!(word, "deg" | "degree" | "degrees" | "Deg" | "Degrees") {
            if let Some(scale) = words.get(i + 1).and_then(|next| {
                TEMPERATURE_SCALES
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(next))
                    .map(|&(_, letter)| letter)
            }) {
                tokens.push(Token::Word(format!("deg{scale}")));
                i += 2;
                continue;
            }
        }

        tokens.push(Token::Word(word.to_string()));
        i += 1;
    }
    tokens
}

/// A word split into its alias stem and signed exponent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WordParts<'a> {
    pub stem: &'a str,
    pub exponent: i32,
}

/// Split the `^exp` or bare trailing signed digits off a word.
///
/// Returns `None` when the exponent text is present but not a valid integer.
pub(crate) fn split_exponent(word: &str) -> Option<WordParts<'_>> {
    if let Some((stem, exp)) = word.split_once('^') {
        let exponent = exp.parse::<i32>().ok()?;
        return Some(WordParts { stem, exponent });
    }

    let digits_start = word
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map_or(word.len(), |(i, _)| i);
    if digits_start == word.len() {
        return Some(WordParts {
            stem: word,
            exponent: 1,
        });
    }

    let mut split = digits_start;
    if split > 0 && matches!(word.as_bytes()[split - 1], b'-' | b'+') {
        split -= 1;
    }
    let exponent = word[split..].parse::<i32>().ok()?;
    Some(WordParts {
        stem: &word[..split],
        exponent,
    })
}

/// Strip a pluralizing `s` when the remaining stem is longer than one character
pub(crate) fn singular(stem: &str) -> Option<&str> {
    let base = stem.strip_suffix('s')?;
    (base.len() > 1).then_some(base)
}
