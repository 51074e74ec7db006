#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub const DEFAULT_LIMIT: i64 = 5;
    pub const DEFAULT_OFFSET: i64 = 0;

    /// Missing, non-numeric and negative values fall back to 5/0.
    pub fn from_query(limit: Option<&str>, offset: Option<&str>) -> Self {
        fn parse(raw: Option<&str>, default: i64) -> i64 {
            raw.and_then(|v| v.trim().parse::<i64>().ok())
                .filter(|v| *v >= 0)
                .unwrap_or(default)
        }

        Self {
            limit: parse(limit, Self::DEFAULT_LIMIT),
            offset: parse(offset, Self::DEFAULT_OFFSET),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            offset: Self::DEFAULT_OFFSET,
        }
    }
}

/// Escapes `%`, `_` and `\\` so user input only ever matches literally inside LIKE.
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_clamps_negative_and_garbage_to_defaults() {
        assert_eq!(Page::from_query(Some("-1"), Some("-9")), Page::default());
        assert_eq!(Page::from_query(Some("ten"), None), Page::default());
        assert_eq!(
            Page::from_query(Some("20"), Some("40")),
            Page { limit: 20, offset: 40 }
        );
    }

    #[test]
    fn sort_defaults_to_descending() {
        assert_eq!(SortOrder::from_query(None), SortOrder::Desc);
        assert_eq!(SortOrder::from_query(Some("sideways")), SortOrder::Desc);
        assert_eq!(SortOrder::from_query(Some("asc")), SortOrder::Asc);
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
