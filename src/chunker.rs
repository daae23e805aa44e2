// Word-window text chunking for ingestion.
//
// Pages are split on form feeds (the page separator pdftotext-style
// extractors emit), then each page is windowed into overlapping word
// chunks. The page number rides along so retrieval can cite it.

#[derive(Debug, Clone, PartialEq)]
pub struct ChunkFragment {
    pub text: String,
    pub page_number: usize,
}

pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<ChunkFragment> {
    let chunk_size = chunk_size.max(1);
    let step = chunk_size.saturating_sub(overlap).max(1);

    let mut fragments = Vec::new();
    for (page_idx, page_text) in text.split('\u{c}').enumerate() {
        let words: Vec<&str> = page_text.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }

        let mut start = 0;
        loop {
            let end = (start + chunk_size).min(words.len());
            let chunk = words[start..end].join(" ");
            if !chunk.is_empty() {
                fragments.push(ChunkFragment {
                    text: chunk,
                    page_number: page_idx + 1,
                });
            }
            if end == words.len() {
                break;
            }
            start += step;
        }
    }

    fragments
}
