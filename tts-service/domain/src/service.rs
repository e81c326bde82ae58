const SENTENCE_TERMINATORS: [char; 6] = ['.', '!', '?', '…', ';', '。'];

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Splits `text` into pieces of at most `max_chars` characters for sequential synthesis.
///
/// Sentence boundaries are preferred, then whitespace; a single word longer than
/// `max_chars` is cut on character boundaries. Whitespace runs collapse to one space,
/// and no chunk is ever empty.
pub fn split_text_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in split_sentences(text) {
        let pieces = if char_len(&sentence) <= max_chars {
            vec![sentence]
        } else {
            split_on_whitespace(&sentence, max_chars)
        };

        for piece in pieces {
            if current.is_empty() {
                current = piece;
            } else if char_len(&current) + 1 + char_len(&piece) <= max_chars {
                current.push(' ');
                current.push_str(&piece);
            } else {
                chunks.push(std::mem::replace(&mut current, piece));
            }
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Sentences with normalized whitespace. A terminator only ends a sentence when followed
/// by whitespace or the end of input, so `3.14` stays intact.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut buffer = String::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\n' {
            push_normalized(&mut sentences, &buffer);
            buffer.clear();
            continue;
        }
        buffer.push(ch);
        let at_boundary = chars.peek().map_or(true, |next| next.is_whitespace());
        if SENTENCE_TERMINATORS.contains(&ch) && at_boundary {
            push_normalized(&mut sentences, &buffer);
            buffer.clear();
        }
    }
    push_normalized(&mut sentences, &buffer);
    sentences
}

fn push_normalized(sentences: &mut Vec<String>, raw: &str) {
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if !normalized.is_empty() {
        sentences.push(normalized);
    }
}

fn split_on_whitespace(sentence: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();

    for word in sentence.split_whitespace() {
        if char_len(word) > max_chars {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
            }
            pieces.extend(hard_cut(word, max_chars));
            continue;
        }

        if current.is_empty() {
            current.push_str(word);
        } else if char_len(&current) + 1 + char_len(word) <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            pieces.push(std::mem::replace(&mut current, word.to_string()));
        }
    }

    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

fn hard_cut(word: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars
        .chunks(max_chars)
        .map(|piece| piece.iter().collect())
        .collect()
}
