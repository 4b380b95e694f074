/// Splits document text into word-aligned windows for the extraction model.
///
/// Length is measured in characters, each word counting one extra for its
/// separator. A window is closed as soon as the next word would push the
/// running length past `max_length`; words are never split, so a single
/// word longer than the budget becomes a window of its own.
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    max_length: usize,
}

impl TextChunker {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn chunk(&self, text: &str) -> Vec<String> {
        let mut windows = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut current_length = 0usize;

        for word in text.split_whitespace() {
            let word_length = word.chars().count() + 1;

            if !current.is_empty() && current_length + word_length > self.max_length {
                windows.push(current.join(" "));
                current.clear();
                current_length = 0;
            }

            current.push(word);
            current_length += word_length;
        }

        if !current.is_empty() {
            windows.push(current.join(" "));
        }

        windows
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(512)
    }
}
