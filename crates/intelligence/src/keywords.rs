//! Task and skill text tokenization.

/// Lowercased tokens split on non-alphanumerics and on ASCII/non-ASCII
/// boundaries, so `"把PDF转换"` yields `["把", "pdf", "转换"]`.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut current_ascii = true;

    for c in text.chars() {
        if !c.is_alphanumeric() {
            flush(&mut current, &mut tokens);
            continue;
        }
        let ascii = c.is_ascii();
        if !current.is_empty() && ascii != current_ascii {
            flush(&mut current, &mut tokens);
        }
        current_ascii = ascii;
        current.extend(c.to_lowercase());
    }
    flush(&mut current, &mut tokens);
    tokens
}

fn flush(current: &mut String, tokens: &mut Vec<String>) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}

/// Deduplicated keywords in first-seen order, stop words and one-letter
/// ASCII tokens removed.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for token in tokenize(text) {
        if token.is_ascii() && token.len() < 2 {
            continue;
        }
        if is_stop_word(&token) || out.contains(&token) {
            continue;
        }
        out.push(token);
    }
    out
}

/// Equal, or one contains the other when both have at least three characters.
pub fn keyword_matches(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    a.chars().count() >= 3 && b.chars().count() >= 3 && (a.contains(b) || b.contains(a))
}

pub fn is_stop_word(word: &str) -> bool {
    const STOP_WORDS: &[&str] = &[
        "a", "an", "the", "and", "or", "but", "if", "of", "to", "in", "on", "at", "by", "for",
        "with", "from", "into", "onto", "as", "is", "are", "was", "were", "be", "been", "being",
        "it", "its", "this", "that", "these", "those", "i", "me", "my", "we", "our", "you",
        "your", "he", "she", "they", "them", "their", "do", "does", "did", "can", "could",
        "would", "should", "will", "shall", "may", "might", "must", "have", "has", "had", "not",
        "no", "so", "some", "any", "all", "each", "every", "about", "than", "then", "when",
        "where", "what", "which", "who", "how", "why", "please", "want", "need", "help", "using",
        "use", "make", "also", "just", "very", "via", "per", "up", "out", "over",
        "的", "了", "和", "与", "把", "将", "为", "在", "是", "我", "请", "一个",
    ];
    STOP_WORDS.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_on_punctuation_and_case() {
        assert_eq!(
            tokenize("Convert PDF-files, to_images!"),
            vec!["convert", "pdf", "files", "to", "images"]
        );
    }

    #[test]
    fn splits_mixed_scripts() {
        assert_eq!(tokenize("把PDF转换为图片"), vec!["把", "pdf", "转换为图片"]);
    }

    #[test]
    fn keywords_drop_stop_words_and_duplicates() {
        assert_eq!(
            extract_keywords("Convert the PDF to an image, then convert it again"),
            vec!["convert", "pdf", "image", "again"]
        );
    }

    #[test]
    fn keyword_matching_rules() {
        assert!(keyword_matches("pdf", "pdf"));
        assert!(keyword_matches("convert", "converter"));
        assert!(keyword_matches("images", "image"));
        assert!(!keyword_matches("go", "golang"));
        assert!(!keyword_matches("csv", "pdf"));
    }
}
