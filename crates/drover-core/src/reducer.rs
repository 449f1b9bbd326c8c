//! Context reducer: shrinks page markup for model consumption.
//!
//! Raw page markup is far too large (and too noisy) to prompt with. The
//! reducer strips categories of content that carry no signal for action
//! generation (scripts, styles, vector graphics, binary-bearing attributes,
//! long prose runs) while preserving the structure the model needs:
//! interactive elements, test identifiers, accessibility labels and short
//! text. Stateless and deterministic given identical input and rule set.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default length above which a text run is collapsed to empty.
pub const DEFAULT_LONG_TEXT_THRESHOLD: usize = 25;

/// A single removal category, independently toggleable and composable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReduceRule {
    /// Strip `<!-- -->` comment blocks
    Comments,

    /// Strip `<script>` blocks
    Scripts,

    /// Strip `<style>` blocks and inline `style` attributes
    Styles,

    /// Strip `<svg>` blocks and bare `<path>` elements
    VectorGraphics,

    /// Drop the `src` attribute of `<img>` tags, keeping the tag itself
    ImageSources,

    /// Strip `data-*` and `aria-*` attributes, always preserving
    /// `data-testid` and `aria-label`
    DataAttributes,

    /// Collapse text content beyond the length threshold to empty
    LongText,

    /// Collapse redundant whitespace
    Whitespace,
}

impl ReduceRule {
    /// All recognized rules, in application order.
    pub fn all() -> Vec<ReduceRule> {
        vec![
            ReduceRule::Comments,
            ReduceRule::Scripts,
            ReduceRule::Styles,
            ReduceRule::VectorGraphics,
            ReduceRule::ImageSources,
            ReduceRule::DataAttributes,
            ReduceRule::LongText,
            ReduceRule::Whitespace,
        ]
    }

    /// Convert to the canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReduceRule::Comments => "comments",
            ReduceRule::Scripts => "scripts",
            ReduceRule::Styles => "styles",
            ReduceRule::VectorGraphics => "vectorgraphics",
            ReduceRule::ImageSources => "imagesources",
            ReduceRule::DataAttributes => "dataattributes",
            ReduceRule::LongText => "longtext",
            ReduceRule::Whitespace => "whitespace",
        }
    }
}

impl FromStr for ReduceRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "comments" => Ok(ReduceRule::Comments),
            "scripts" => Ok(ReduceRule::Scripts),
            "styles" => Ok(ReduceRule::Styles),
            "vectorgraphics" => Ok(ReduceRule::VectorGraphics),
            "imagesources" => Ok(ReduceRule::ImageSources),
            "dataattributes" => Ok(ReduceRule::DataAttributes),
            "longtext" => Ok(ReduceRule::LongText),
            "whitespace" => Ok(ReduceRule::Whitespace),
            _ => Err(format!("Invalid reduction rule: {s}")),
        }
    }
}

/// Rule selection for a run: an ordered remove set minus an explicit keep
/// override set. A rule fires only if requested for removal and not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    /// Categories requested for removal
    pub remove: Vec<ReduceRule>,

    /// Categories explicitly kept even if requested for removal
    pub keep: Vec<ReduceRule>,

    /// Length above which a text run collapses to empty
    pub long_text_threshold: usize,
}

impl RuleSet {
    /// Builds a rule set from remove/keep selections.
    pub fn new(remove: Vec<ReduceRule>, keep: Vec<ReduceRule>) -> Self {
        Self {
            remove,
            keep,
            long_text_threshold: DEFAULT_LONG_TEXT_THRESHOLD,
        }
    }

    /// Overrides the long-text collapse threshold.
    pub fn with_long_text_threshold(mut self, threshold: usize) -> Self {
        self.long_text_threshold = threshold;
        self
    }

    /// Whether a rule fires under this set.
    pub fn is_active(&self, rule: ReduceRule) -> bool {
        self.remove.contains(&rule) && !self.keep.contains(&rule)
    }
}

impl Default for RuleSet {
    /// The full removal set with no keeps, matching the reduction applied
    /// before every generation attempt unless the operator narrows it.
    fn default() -> Self {
        Self::new(ReduceRule::all(), Vec::new())
    }
}

static COMMENTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
static SCRIPTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b.*?</script>").expect("valid regex"));
static STYLE_BLOCKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style\b.*?</style>").expect("valid regex"));
static STYLE_ATTRS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\s+style="[^"]*""#).expect("valid regex"));
static SVG_BLOCKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<svg\b.*?</svg>").expect("valid regex"));
static PATH_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<path\b[^>]*/?>").expect("valid regex"));
static IMG_SRC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(<img\b[^>]*?)\s+src=["'][^"']*["']"#).expect("valid regex"));
static DATA_ATTRS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\s+(data-[a-z0-9-]+)=["'][^"']*["']"#).expect("valid regex"));
static ARIA_ATTRS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\s+(aria-[a-z0-9-]+)=["'][^"']*["']"#).expect("valid regex"));
static TEXT_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r">([^<>]+)<").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static INTER_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r">\s+<").expect("valid regex"));

/// Reduces page markup under the given rule set.
///
/// Applies the active rules in a fixed order. Idempotent on already-reduced
/// input under the same rule set; activating an additional category never
/// lengthens the output.
pub fn reduce(markup: &str, rules: &RuleSet) -> String {
    let mut reduced = markup.to_string();

    if rules.is_active(ReduceRule::Comments) {
        reduced = COMMENTS.replace_all(&reduced, "").into_owned();
    }
    if rules.is_active(ReduceRule::Scripts) {
        reduced = SCRIPTS.replace_all(&reduced, "").into_owned();
    }
    if rules.is_active(ReduceRule::Styles) {
        reduced = STYLE_BLOCKS.replace_all(&reduced, "").into_owned();
        reduced = STYLE_ATTRS.replace_all(&reduced, "").into_owned();
    }
    if rules.is_active(ReduceRule::VectorGraphics) {
        reduced = SVG_BLOCKS.replace_all(&reduced, "").into_owned();
        reduced = PATH_TAGS.replace_all(&reduced, "").into_owned();
    }
    if rules.is_active(ReduceRule::ImageSources) {
        reduced = IMG_SRC.replace_all(&reduced, "$1").into_owned();
    }
    if rules.is_active(ReduceRule::DataAttributes) {
        reduced = DATA_ATTRS
            .replace_all(&reduced, |caps: &regex::Captures<'_>| {
                keep_attribute(caps, "data-testid")
            })
            .into_owned();
        reduced = ARIA_ATTRS
            .replace_all(&reduced, |caps: &regex::Captures<'_>| {
                keep_attribute(caps, "aria-label")
            })
            .into_owned();
    }
    if rules.is_active(ReduceRule::LongText) {
        reduced = TEXT_RUNS
            .replace_all(&reduced, |caps: &regex::Captures<'_>| {
                if caps[1].trim().len() > rules.long_text_threshold {
                    "><".to_string()
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned();
    }
    if rules.is_active(ReduceRule::Whitespace) {
        reduced = WHITESPACE.replace_all(&reduced, " ").into_owned();
        reduced = INTER_TAG.replace_all(&reduced, "><").into_owned();
        reduced = reduced.trim().to_string();
    }

    reduced
}

/// Drops the matched attribute unless its name equals the preserved one.
fn keep_attribute(caps: &regex::Captures<'_>, preserved: &str) -> String {
    if caps[1].eq_ignore_ascii_case(preserved) {
        caps[0].to_string()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<body>
        <!-- navigation -->
        <script type="text/javascript">window.track = function () { return 42; };</script>
        <style>.hidden { display: none; }</style>
        <svg viewBox="0 0 24 24"><circle r="10"/></svg>
        <path d="M0 0 L10 10"/>
        <img src="data:image/png;base64,AAAA" alt="logo">
        <div style="color: red" data-testid="login-box" data-tracking-id="xyz" aria-label="Login" aria-hidden="true">
            <p>This paragraph is much longer than the configured threshold allows.</p>
            <button id="btnLogin">Login</button>
        </div>
    </body>"#;

    #[test]
    fn full_rule_set_strips_all_noise_categories() {
        let reduced = reduce(PAGE, &RuleSet::default());

        assert!(!reduced.contains("<!--"));
        assert!(!reduced.contains("<script"));
        assert!(!reduced.contains("<style"));
        assert!(!reduced.contains("<svg"));
        assert!(!reduced.contains("<path"));
        assert!(!reduced.contains("src="));
        assert!(!reduced.contains("style="));
        assert!(!reduced.contains("much longer than"));
        // Structural signal survives.
        assert!(reduced.contains("<img"));
        assert!(reduced.contains("data-testid=\"login-box\""));
        assert!(reduced.contains("aria-label=\"Login\""));
        assert!(!reduced.contains("data-tracking-id"));
        assert!(!reduced.contains("aria-hidden"));
        assert!(reduced.contains(">Login<"));
    }

    #[test]
    fn keep_overrides_suppress_requested_removal() {
        let rules = RuleSet::new(ReduceRule::all(), vec![ReduceRule::Scripts]);
        let reduced = reduce(PAGE, &rules);
        assert!(reduced.contains("<script"));
        assert!(!reduced.contains("<style"));
    }

    #[test]
    fn inactive_rules_leave_markup_untouched() {
        let rules = RuleSet::new(vec![], vec![]);
        assert_eq!(reduce(PAGE, &rules), PAGE);
    }

    #[test]
    fn reduction_is_idempotent() {
        let rules = RuleSet::default();
        let once = reduce(PAGE, &rules);
        let twice = reduce(&once, &rules);
        assert_eq!(once, twice);
    }

    #[test]
    fn each_category_never_lengthens_output() {
        for rule in ReduceRule::all() {
            let with = reduce(PAGE, &RuleSet::new(ReduceRule::all(), vec![]));
            let without = reduce(PAGE, &RuleSet::new(ReduceRule::all(), vec![rule]));
            assert!(
                with.len() <= without.len(),
                "removing {} increased output length",
                rule.as_str()
            );
        }
    }

    #[test]
    fn long_text_threshold_is_configurable() {
        let markup = "<p>twelve chars</p>";
        let strict = RuleSet::new(vec![ReduceRule::LongText], vec![]).with_long_text_threshold(5);
        let lax = RuleSet::new(vec![ReduceRule::LongText], vec![]).with_long_text_threshold(50);

        assert_eq!(reduce(markup, &strict), "<p></p>");
        assert_eq!(reduce(markup, &lax), markup);
    }

    #[test]
    fn rule_names_round_trip() {
        for rule in ReduceRule::all() {
            assert_eq!(rule.as_str().parse::<ReduceRule>(), Ok(rule));
        }
        assert_eq!("vector-graphics".parse::<ReduceRule>(), Ok(ReduceRule::VectorGraphics));
        assert!("minify".parse::<ReduceRule>().is_err());
    }
}
