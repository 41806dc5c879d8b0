/// Represents ways to locate a control on the page.
///
/// The host UI's markup is not a stable contract, so most call sites use a
/// [`Selector::Fallback`] chain: candidates are tried strictly in order and
/// the first match wins. Chains for well-known affordances live in
/// [`crate::ui_map::UiMap`] rather than inline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Standard CSS selector.
    Css(String),
    /// Match by rendered text content. `exact` requires full equality after
    /// trimming; otherwise a substring match (the `:contains` idiom).
    Text {
        text: String,
        tag: Option<String>,
        exact: bool,
    },
    /// Raw XPath expression.
    XPath(String),
    /// Ordered fallback chain; first selector that yields a node wins.
    Fallback(Vec<Selector>),
    /// An unparseable selector string, with the reason.
    Invalid(String),
}

impl Selector {
    pub fn text(text: impl Into<String>) -> Self {
        Selector::Text {
            text: text.into(),
            tag: None,
            exact: false,
        }
    }

    pub fn exact_text(text: impl Into<String>, tag: Option<&str>) -> Self {
        Selector::Text {
            text: text.into(),
            tag: tag.map(str::to_string),
            exact: true,
        }
    }

    pub fn fallback<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Selector>,
    {
        Selector::Fallback(candidates.into_iter().map(Into::into).collect())
    }

    /// XPath equivalent for [`Selector::Text`], used by engines that resolve
    /// text matches through `document.evaluate`.
    pub(crate) fn text_xpath(text: &str, tag: Option<&str>, exact: bool) -> String {
        let tag = tag.unwrap_or("*");
        let quoted = xpath_literal(text);
        if exact {
            format!("//{tag}[normalize-space(text()) = {quoted}]")
        } else {
            format!("//{tag}[contains(text(), {quoted})]")
        }
    }
}

/// Quote a string for direct inclusion in an XPath expression. XPath 1.0 has
/// no escape sequence, so strings containing both quote kinds need concat().
fn xpath_literal(s: &str) -> String {
    if !s.contains('\'') {
        format!("'{s}'")
    } else if !s.contains('"') {
        format!("\"{s}\"")
    } else {
        let parts: Vec<String> = s
            .split('\'')
            .map(|p| format!("'{p}'"))
            .collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

impl From<&str> for Selector {
    /// Parse a selector string. `||` separates fallback candidates; the
    /// `text:`, `text=`, and `xpath:` prefixes pick non-CSS strategies;
    /// anything else is treated as CSS.
    fn from(s: &str) -> Self {
        let parts: Vec<&str> = s.split("||").map(str::trim).collect();
        if parts.len() > 1 {
            return Selector::Fallback(parts.into_iter().map(Selector::from).collect());
        }

        let s = s.trim();
        if s.is_empty() {
            return Selector::Invalid("empty selector".to_string());
        }
        if let Some(rest) = s.strip_prefix("text=") {
            return Selector::exact_text(rest, None);
        }
        if let Some(rest) = s.strip_prefix("text:") {
            return Selector::text(rest);
        }
        if let Some(rest) = s.strip_prefix("xpath:") {
            return Selector::XPath(rest.to_string());
        }
        if s.starts_with("//") {
            return Selector::XPath(s.to_string());
        }
        Selector::Css(s.to_string())
    }
}

impl From<String> for Selector {
    fn from(s: String) -> Self {
        Selector::from(s.as_str())
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::Css(c) => write!(f, "{c}"),
            Selector::Text { text, exact, .. } => {
                if *exact {
                    write!(f, "text={text}")
                } else {
                    write!(f, "text:{text}")
                }
            }
            Selector::XPath(x) => write!(f, "xpath:{x}"),
            Selector::Fallback(parts) => {
                let joined: Vec<String> = parts.iter().map(ToString::to_string).collect();
                write!(f, "{}", joined.join(" || "))
            }
            Selector::Invalid(reason) => write!(f, "<invalid: {reason}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_css_by_default() {
        assert_eq!(
            Selector::from("button[type='submit']"),
            Selector::Css("button[type='submit']".to_string())
        );
    }

    #[test]
    fn parses_text_prefixes() {
        assert_eq!(
            Selector::from("text:Create Workspace"),
            Selector::text("Create Workspace")
        );
        assert_eq!(
            Selector::from("text=Delete"),
            Selector::exact_text("Delete", None)
        );
    }

    #[test]
    fn parses_fallback_chain_in_order() {
        let sel = Selector::from("#create-btn || text:Create || button.primary");
        match sel {
            Selector::Fallback(parts) => {
                assert_eq!(parts.len(), 3);
                assert_eq!(parts[0], Selector::Css("#create-btn".to_string()));
                assert_eq!(parts[1], Selector::text("Create"));
                assert_eq!(parts[2], Selector::Css("button.primary".to_string()));
            }
            other => panic!("expected fallback chain, got {other:?}"),
        }
    }

    #[test]
    fn xpath_literal_handles_mixed_quotes() {
        assert_eq!(xpath_literal("plain"), "'plain'");
        assert_eq!(xpath_literal("it's"), "\"it's\"");
        assert!(xpath_literal(r#"both ' and ""#).starts_with("concat("));
    }
}
