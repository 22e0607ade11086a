//! Built-in system instructions sent with client-issued requests.
//!
//! The relay server owns its own copy; these are only used when the client
//! talks to the chat-completion endpoint directly.

use generation_provider::Language;

pub const INSTRUCTIONS_EN: &str = r#"Convert the input text (a script, article or similar copy) into rhythm-focused plain text subtitles.

Golden rule: never delete or change any letter or number of the original text. Only line breaks and symbol cleanup are allowed.

Step 1: preprocessing
- Delete all punctuation (for example .,?!;:""''()[]{}), special symbols (for example ~@#$^&*) and emoji. The percent sign % must be kept.
- Collapse runs of spaces into one space and trim every line.
- Delete empty lines.

Step 2: line splitting
- Rhythm first, length second: break where a speaker would naturally pause, such as at conjunctions (and, but, or) or between clauses.
- Aim for roughly 5 to 10 words per line. A short, punchy sentence stays on its own line.
- Keep tight phrases together (for example "artificial intelligence", "state-of-the-art") unless that creates a very long line.

Step 3: output format
- Output only the subtitles: no original text, explanations, comments or code fences.
- Separate lines with a single newline, with no empty lines and no punctuation except %.

Now process the following text:
"#;

pub const INSTRUCTIONS_ZH: &str = r#"Convert the input text (a script, article or similar copy) into rhythm-focused plain text subtitles.

Golden rule: never delete or change any Chinese character, letter or number of the original text. Only line breaks, space handling and symbol cleanup are allowed.

Step 1: preprocessing
1. Mandatory replacements, applied in this order to exact matches only:
   "婚外情" -> "婚W情", "私生子" -> "S生子", "出轨" -> "出G", "小三" -> "小S".
2. Delete all punctuation (for example ，。？！、；：“”《》【】（）), special symbols (for example ·~@#$^&*) and emoji. The percent sign % must be kept.
3. Replace full-width spaces with a half-width space, collapse runs of spaces into one, and trim every line.
4. Delete empty lines.

Step 2: line splitting
- Every remaining half-width space is a mandatory line break.
- Any line longer than 10 Chinese characters must be split, recursively, until every line has at most 10.
- A complete short sentence of 6 characters or fewer is not split further.
- Keep proper nouns, terms and tight collocations together unless the 10 character limit forces a split.
- Breakpoint priority: after logical connectives (因为, 所以, 但是, 而且, 如果, 那么); inside parallel structures (以及, 和, 与, 或, 还, 也); after adverbial phrases of purpose, reason, manner or place; between subject and predicate or verb and object; last resort after particles such as 的, 了, 着, 就, 才, 都, 正, 在.

Step 3: output format
- Output only the subtitles: no original text, explanations, comments or code fences.
- Separate lines with a single newline, with no empty lines and no punctuation except %.
- Use Simplified Chinese only.

Now process the following text:
"#;

#[must_use]
pub fn instructions_for(language: Language) -> &'static str {
    match language {
        Language::En => INSTRUCTIONS_EN,
        Language::Zh => INSTRUCTIONS_ZH,
    }
}
