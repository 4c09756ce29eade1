use once_cell::sync::Lazy;
use regex::Regex;

static RESIZE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^resize,(\d+),(\d+)").expect("resize pattern compiles")
});

static EXTRACT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^extract,(\d+),(\d+),(\d+),(\d+)").expect("extract pattern compiles")
});

/// One transformation step submitted with an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Replaces the final target size. Only the last one submitted takes effect.
    Resize { width: u32, height: u32 },
    /// Crops the working image as soon as it is reached.
    Extract { x: u32, y: u32, width: u32, height: u32 },
}

impl Directive {
    /// Parses a single `process[]` token.
    ///
    /// Tokens that match neither grammar yield `None`. A numeric capture that
    /// overflows `u32` becomes `0`, so an oversized extract fails later as a
    /// zero-sized one.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();

        if let Some(caps) = EXTRACT_PATTERN.captures(token) {
            return Some(Directive::Extract {
                x: number(&caps[1]),
                y: number(&caps[2]),
                width: number(&caps[3]),
                height: number(&caps[4]),
            });
        }

        if let Some(caps) = RESIZE_PATTERN.captures(token) {
            return Some(Directive::Resize {
                width: number(&caps[1]),
                height: number(&caps[2]),
            });
        }

        None
    }

    /// Parses tokens in order, dropping the ones that are not directives.
    pub fn parse_all<I, S>(tokens: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tokens
            .into_iter()
            .filter_map(|token| {
                let token = token.as_ref();
                let parsed = Directive::parse(token);
                if parsed.is_none() {
                    tracing::debug!(token, "ignoring unrecognized directive");
                }
                parsed
            })
            .collect()
    }
}

fn number(capture: &str) -> u32 {
    capture.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_grammars_in_order() {
        let parsed = Directive::parse_all(["resize,50,50", "extract,0,0,10,10", "resize,20,20"]);

        assert_eq!(
            parsed,
            vec![
                Directive::Resize { width: 50, height: 50 },
                Directive::Extract { x: 0, y: 0, width: 10, height: 10 },
                Directive::Resize { width: 20, height: 20 },
            ]
        );
    }

    #[test]
    fn ignores_unrecognized_tokens() {
        let parsed = Directive::parse_all([
            "rotate,90",
            "resize,10",
            "extract,1,2,3",
            "resize,-5,10",
            "",
            "xresize,10,10",
            "resize,30,40",
        ]);

        assert_eq!(parsed, vec![Directive::Resize { width: 30, height: 40 }]);
    }

    #[test]
    fn tolerates_whitespace_and_trailing_text() {
        assert_eq!(
            Directive::parse("  extract,1,2,3,4,extra "),
            Some(Directive::Extract { x: 1, y: 2, width: 3, height: 4 })
        );
    }

    #[test]
    fn overflowing_numbers_default_to_zero() {
        assert_eq!(
            Directive::parse("resize,99999999999,12"),
            Some(Directive::Resize { width: 0, height: 12 })
        );
    }
}
