//! Character classes
//!
//! A [`CharClass`] matches a single code point against a set of ranges and
//! predefined classes, optionally negated.
//!
//! ```rust
//! use rulecraft::grammar::CharClass;
//!
//! let hex = CharClass::xdigit();
//! assert!(hex.matches('f'));
//!
//! let plain = CharClass::none_of("\"\\\t\n");
//! assert!(plain.matches('a'));
//! assert!(!plain.matches('"'));
//! ```

use smallvec::SmallVec;
use std::fmt;

/// One member of a character class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClassItem {
    /// Inclusive code point range; a single character is `Range(c, c)`
    Range(char, char),
    /// ASCII decimal digits
    Digit,
    /// Unicode alphabetic
    Alpha,
    /// Unicode alphabetic or numeric
    Alnum,
    /// Alphanumeric or `_`
    Word,
    /// Unicode white space
    Space,
    /// ASCII hexadecimal digits
    XDigit,
    /// Another class, used when combining negated classes
    Class(Box<CharClass>),
}

impl ClassItem {
    fn matches(&self, ch: char) -> bool {
        match self {
            Self::Range(lo, hi) => (*lo..=*hi).contains(&ch),
            Self::Digit => ch.is_ascii_digit(),
            Self::Alpha => ch.is_alphabetic(),
            Self::Alnum => ch.is_alphanumeric(),
            Self::Word => ch.is_alphanumeric() || ch == '_',
            Self::Space => ch.is_whitespace(),
            Self::XDigit => ch.is_ascii_hexdigit(),
            Self::Class(class) => class.matches(ch),
        }
    }

    const fn name(&self) -> Option<&'static str> {
        match self {
            Self::Digit => Some("digit"),
            Self::Alpha => Some("alpha"),
            Self::Alnum => Some("alnum"),
            Self::Word => Some("word"),
            Self::Space => Some("space"),
            Self::XDigit => Some("xdigit"),
            Self::Range(..) | Self::Class(_) => None,
        }
    }
}

/// Inclusion or exclusion set over code points.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CharClass {
    items: SmallVec<[ClassItem; 4]>,
    negated: bool,
}

impl CharClass {
    /// Empty class; matches nothing until items are added.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn single(item: ClassItem) -> Self {
        let mut items = SmallVec::new();
        items.push(item);
        Self {
            items,
            negated: false,
        }
    }

    /// `<[lo..hi]>`
    #[must_use]
    pub fn range(lo: char, hi: char) -> Self {
        Self::single(ClassItem::Range(lo, hi))
    }

    /// Any of the listed characters.
    #[must_use]
    pub fn any_of(chars: &str) -> Self {
        Self {
            items: chars.chars().map(|c| ClassItem::Range(c, c)).collect(),
            negated: false,
        }
    }

    /// Anything except the listed characters.
    #[must_use]
    pub fn none_of(chars: &str) -> Self {
        Self::any_of(chars).negate()
    }

    #[must_use]
    pub fn digit() -> Self {
        Self::single(ClassItem::Digit)
    }

    #[must_use]
    pub fn alpha() -> Self {
        Self::single(ClassItem::Alpha)
    }

    #[must_use]
    pub fn alnum() -> Self {
        Self::single(ClassItem::Alnum)
    }

    #[must_use]
    pub fn word() -> Self {
        Self::single(ClassItem::Word)
    }

    #[must_use]
    pub fn space() -> Self {
        Self::single(ClassItem::Space)
    }

    #[must_use]
    pub fn xdigit() -> Self {
        Self::single(ClassItem::XDigit)
    }

    #[must_use]
    pub fn with_range(mut self, lo: char, hi: char) -> Self {
        self.items.push(ClassItem::Range(lo, hi));
        self
    }

    #[must_use]
    pub fn with_item(mut self, item: ClassItem) -> Self {
        self.items.push(item);
        self
    }

    /// Complement of this class.
    #[must_use]
    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    /// Class matching anything either class matches.
    #[must_use]
    pub fn union(mut self, other: Self) -> Self {
        if !self.negated && !other.negated {
            self.items.extend(other.items);
            return self;
        }
        let mut items = SmallVec::new();
        items.push(ClassItem::Class(Box::new(self)));
        items.push(ClassItem::Class(Box::new(other)));
        Self {
            items,
            negated: false,
        }
    }

    #[must_use]
    pub const fn is_negated(&self) -> bool {
        self.negated
    }

    #[must_use]
    pub fn items(&self) -> &[ClassItem] {
        &self.items
    }

    #[must_use]
    pub fn matches(&self, ch: char) -> bool {
        self.negated ^ self.items.iter().any(|item| item.matches(ch))
    }
}

fn write_class_char(f: &mut fmt::Formatter<'_>, ch: char) -> fmt::Result {
    match ch {
        '\t' => f.write_str("\\t"),
        '\n' => f.write_str("\\n"),
        '\r' => f.write_str("\\r"),
        '\\' | ']' | '-' => write!(f, "\\{ch}"),
        _ => write!(f, "{ch}"),
    }
}

impl fmt::Display for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.negated { "<-" } else { "<" })?;
        let mut first = true;

        let ranges: Vec<_> = self
            .items
            .iter()
            .filter_map(|item| match item {
                ClassItem::Range(lo, hi) => Some((*lo, *hi)),
                _ => None,
            })
            .collect();
        if !ranges.is_empty() || self.items.is_empty() {
            f.write_str("[")?;
            for (i, (lo, hi)) in ranges.iter().enumerate() {
                if i > 0 && (lo != hi || ranges[i - 1].0 != ranges[i - 1].1) {
                    f.write_str(" ")?;
                }
                write_class_char(f, *lo)?;
                if lo != hi {
                    f.write_str("..")?;
                    write_class_char(f, *hi)?;
                }
            }
            f.write_str("]")?;
            first = false;
        }

        for item in &self.items {
            let part = match item {
                ClassItem::Range(..) => continue,
                ClassItem::Class(inner) => inner.to_string(),
                named => named.name().unwrap_or_default().to_string(),
            };
            if !first {
                f.write_str("+")?;
            }
            f.write_str(&part)?;
            first = false;
        }
        f.write_str(">")
    }
}
