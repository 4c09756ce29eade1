use infer::MatcherType;

/// Cheap magic-number check run before handing an upload to the decoder.
pub fn looks_like_image(data: &[u8]) -> bool {
    infer::get(data).is_some_and(|kind| kind.matcher_type() == MatcherType::Image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::sample_png;

    #[test]
    fn recognises_png_and_rejects_text() {
        assert!(looks_like_image(&sample_png(2, 2)));
        assert!(!looks_like_image(b"hello world"));
        assert!(!looks_like_image(&[]));
    }
}
