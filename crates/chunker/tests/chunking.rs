//! End-to-end chunking through the service with the real BPE tokenizer.

use std::sync::Arc;

use smartchunk_chunker::{
    ChunkError, ChunkOptions, ChunkerResources, ChunkingResult, ChunkingService,
    ConfigurationError,
};

fn service() -> ChunkingService {
    ChunkingService::new(Arc::new(ChunkerResources::default()))
}

/// Every chunk is a slice of `text`, in order, with no gaps, and within the
/// buffered limit unless flagged oversized.
fn assert_well_formed(text: &str, result: &ChunkingResult, options: &ChunkOptions) {
    assert_eq!(result.total_chunks, result.chunks.len());
    for (i, chunk) in result.chunks.iter().enumerate() {
        assert_eq!(chunk.chunk_index, i);
        assert_eq!(&text[chunk.start..chunk.end], chunk.text);
        if !chunk.oversized {
            assert!(
                chunk.token_count <= options.buffered_limit(),
                "chunk {i} has {} tokens",
                chunk.token_count
            );
        }
    }
    for pair in result.chunks.windows(2) {
        assert!(pair[0].start < pair[1].start);
        assert!(pair[1].start <= pair[0].end + 1, "gap between chunks");
        assert!(pair[1].overlap_tokens <= options.overlap_tokens());
    }
    if let (Some(first), Some(last)) = (result.chunks.first(), result.chunks.last()) {
        assert_eq!(first.start, 0);
        assert_eq!(last.end, text.len());
    }
}

fn prose() -> String {
    let sentences = [
        "The river rose slowly through the night.",
        "By morning the lower fields were under water.",
        "Farmers moved their animals to the ridge.",
        "Nobody expected the bridge to hold.",
        "It did, although the railings were torn away.",
        "Dr. Alvarez inspected the pillars at noon.",
        "She found cracks but no sign of collapse.",
        "Traffic resumed two days later.",
    ];
    sentences.repeat(6).join(" ")
}

#[test]
fn short_sentences_overlap_between_chunks() {
    let text = "Go now. Stop here. Run fast. Sit down. Eat well.";
    let options = ChunkOptions::new(10, 3).unwrap();
    let result = service().chunk_with(text, &options).unwrap();

    assert!(result.total_chunks > 1);
    assert_well_formed(text, &result, &options);
    assert!(result.chunks[1].overlap_tokens > 0);
    assert!(result.chunks[1].start < result.chunks[0].end);
    assert!(!result.word_fallback);
}

#[test]
fn overlap_not_below_limit_is_rejected() {
    let err = service().chunk("Some text.", 10, 10).unwrap_err();
    assert!(matches!(
        err,
        ChunkError::Configuration(ConfigurationError::OverlapNotBelowLimit {
            overlap: 10,
            limit: 10
        })
    ));
}

#[test]
fn long_sentence_is_split_by_words() {
    let text = format!(
        "{} end.",
        "the quick brown fox jumps over the lazy dog".repeat(40)
    );
    let text = text.replace("dogthe", "dog the");
    let options = ChunkOptions::new(50, 10).unwrap();
    let result = service().chunk_with(&text, &options).unwrap();

    assert!(result.word_fallback);
    assert!(result.total_chunks > 1);
    assert!(result.chunks.iter().all(|c| !c.oversized));
    assert_well_formed(&text, &result, &options);
}

#[test]
fn heading_is_not_repeated_before_a_long_paragraph() {
    let words: Vec<String> = (0..150).map(|i| format!("Word{i}")).collect();
    let text = format!("Introduction. {}.", words.join(" "));
    let options = ChunkOptions::default();
    let result = service().chunk_with(&text, &options).unwrap();

    assert_eq!(result.chunks[0].text, "Introduction.");
    assert!(result.total_chunks > 2);
    assert_eq!(result.chunks[1].overlap_tokens, 0);
    assert_well_formed(&text, &result, &options);
    for pair in result.chunks.windows(2) {
        assert!(pair[0].end < pair[1].end, "chunk contained in its successor");
    }
}

fn long_word() -> String {
    (0..400u64).map(|i| format!("{:x}", i * 7919 + 13)).collect()
}

#[test]
fn long_word_is_kept_whole_by_default() {
    let word = long_word();
    let text = format!("Intro here. {word} Outro here.");
    let options = ChunkOptions::new(20, 5).unwrap();
    let result = service().chunk_with(&text, &options).unwrap();

    let oversized: Vec<_> = result.chunks.iter().filter(|c| c.oversized).collect();
    assert_eq!(oversized.len(), 1);
    assert!(oversized[0].text.contains(&word));
    assert!(oversized[0].token_count > options.buffered_limit());
    assert_well_formed(&text, &result, &options);
}

#[test]
fn long_word_is_split_when_enabled() {
    let word = long_word();
    let options = ChunkOptions::new(20, 5)
        .unwrap()
        .with_split_oversized_words(true);
    let result = service().chunk_with(&word, &options).unwrap();

    assert!(result.total_chunks > 1);
    assert!(result.word_fallback);
    assert!(result.chunks.iter().all(|c| !c.oversized));
    assert_well_formed(&word, &result, &options);
}

#[test]
fn prose_respects_limits_and_covers_input() {
    let text = prose();
    let svc = service();
    let options = ChunkOptions::new(40, 8).unwrap();
    let result = svc.chunk_with(&text, &options).unwrap();

    assert!(result.total_chunks > 3);
    assert_well_formed(&text, &result, &options);
    // Abbreviations do not end a chunk.
    assert!(result.chunks.iter().all(|c| !c.text.ends_with("Dr.")));

    let tokenizer = svc.resources().tokenizer().unwrap();
    for chunk in &result.chunks {
        assert_eq!(chunk.token_count, tokenizer.count(&chunk.text));
    }
    assert_eq!(
        result.total_tokens,
        result.chunks.iter().map(|c| c.token_count).sum::<usize>()
    );
}

#[test]
fn zero_overlap_gives_disjoint_chunks() {
    let text = prose();
    let options = ChunkOptions::new(30, 0).unwrap();
    let result = service().chunk_with(&text, &options).unwrap();

    assert_well_formed(&text, &result, &options);
    for pair in result.chunks.windows(2) {
        assert!(pair[1].start > pair[0].end);
        assert_eq!(pair[1].overlap_tokens, 0);
    }
}

#[test]
fn short_input_is_one_chunk() {
    let result = service().chunk("Hello world.", 100, 20).unwrap();
    assert_eq!(result.texts(), vec!["Hello world."]);
    assert_eq!(result.chunks[0].overlap_tokens, 0);
}

#[test]
fn whitespace_only_is_empty() {
    let result = service().chunk(" \n\n\t ", 100, 20).unwrap();
    assert!(result.is_empty());
}

#[test]
fn html_markup_is_not_counted() {
    let html = "<html><head><style>p { color: red; }</style></head>\
                <body><p>First paragraph.</p><script>var x = 1;</script>\
                <p>Second &amp; last.</p></body></html>";
    let result = service().chunk(html, 100, 20).unwrap();
    assert_eq!(result.texts(), vec!["First paragraph. Second & last."]);
}

#[test]
fn repeated_calls_are_identical() {
    let text = prose();
    let svc = service();
    let a = svc.chunk(&text, 25, 5).unwrap();
    let b = svc.chunk(&text, 25, 5).unwrap();
    assert_eq!(a, b);
}

#[test]
fn concurrent_calls_agree() {
    let text = prose();
    let svc = service();
    let expected = svc.chunk(&text, 25, 5).unwrap();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| svc.chunk(&text, 25, 5).unwrap()))
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    });
}
