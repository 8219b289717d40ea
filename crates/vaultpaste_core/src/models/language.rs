//! Closed language enumeration with an explicit fallback for unknown tags.

use std::borrow::Cow;
use std::fmt;

/// Icon class used for languages without a dedicated icon.
pub const GENERIC_ICON_CLASS: &str = "devicon-codepen-plain";

/// Text badge rendered in place of an icon for plain text.
pub const PLAINTEXT_BADGE: &str = ".txt";

/// Extension used when the language has no mapping.
const FALLBACK_EXTENSION: &str = ".txt";

/// Languages the service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    Plaintext,
    Java,
    Python,
    Javascript,
    Cplusplus,
    Csharp,
    Html,
}

impl Language {
    /// Every supported language in picker order.
    pub const ALL: [Language; 7] = [
        Language::Plaintext,
        Language::Java,
        Language::Python,
        Language::Javascript,
        Language::Cplusplus,
        Language::Csharp,
        Language::Html,
    ];

    /// Wire value sent to and received from the service.
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Plaintext => "plaintext",
            Language::Java => "java",
            Language::Python => "python",
            Language::Javascript => "javascript",
            Language::Cplusplus => "cplusplus",
            Language::Csharp => "csharp",
            Language::Html => "html",
        }
    }

    /// Parse an exact wire value.
    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.as_str() == value)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::Plaintext => "Plain Text",
            Language::Java => "Java",
            Language::Python => "Python",
            Language::Javascript => "JavaScript",
            Language::Cplusplus => "C++",
            Language::Csharp => "C#",
            Language::Html => "HTML",
        }
    }

    /// Devicon class, `None` for plain text which renders a text badge instead.
    pub fn icon_class(self) -> Option<&'static str> {
        match self {
            Language::Plaintext => None,
            Language::Java => Some("devicon-java-plain"),
            Language::Python => Some("devicon-python-plain"),
            Language::Javascript => Some("devicon-javascript-plain"),
            Language::Cplusplus => Some("devicon-cplusplus-plain"),
            Language::Csharp => Some("devicon-csharp-plain"),
            Language::Html => Some("devicon-html5-plain"),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Language::Plaintext => ".txt",
            Language::Java => ".java",
            Language::Python => ".py",
            Language::Javascript => ".js",
            Language::Cplusplus => ".cpp",
            Language::Csharp => ".cs",
            Language::Html => ".html",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Icon treatment for a language badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageIcon {
    /// A dedicated icon class.
    Class(&'static str),
    /// Plain text renders a literal `.txt` badge with no icon class.
    Text(&'static str),
    /// Unknown languages get the generic code icon.
    Generic,
}

impl LanguageIcon {
    /// Icon class to apply, if any.
    pub fn class(&self) -> Option<&'static str> {
        match self {
            LanguageIcon::Class(class) => Some(*class),
            LanguageIcon::Text(_) => None,
            LanguageIcon::Generic => Some(GENERIC_ICON_CLASS),
        }
    }
}

/// A language tag as delivered by the service, known or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageTag {
    Known(Language),
    Unknown(String),
}

impl LanguageTag {
    pub fn parse(raw: &str) -> Self {
        match Language::from_wire(raw) {
            Some(lang) => LanguageTag::Known(lang),
            None => LanguageTag::Unknown(raw.to_string()),
        }
    }

    /// Badge text: the display name, or the raw tag when unmapped.
    pub fn display_name(&self) -> Cow<'_, str> {
        match self {
            LanguageTag::Known(lang) => Cow::Borrowed(lang.display_name()),
            LanguageTag::Unknown(raw) => Cow::Borrowed(raw.as_str()),
        }
    }

    pub fn icon(&self) -> LanguageIcon {
        match self {
            LanguageTag::Known(Language::Plaintext) => LanguageIcon::Text(PLAINTEXT_BADGE),
            LanguageTag::Known(lang) => lang
                .icon_class()
                .map(LanguageIcon::Class)
                .unwrap_or(LanguageIcon::Generic),
            LanguageTag::Unknown(_) => LanguageIcon::Generic,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            LanguageTag::Known(lang) => lang.extension(),
            LanguageTag::Unknown(_) => FALLBACK_EXTENSION,
        }
    }
}
