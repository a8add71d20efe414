// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Identities that address stored values.
//!
//! Collections only ever see the canonical tag string. Anything a transport
//! layer produces (a chat user, a channel) plugs in by implementing [`Tagged`].

use std::borrow::Cow;
use std::fmt;

/// Reduces an identity to the tag a collection is keyed by.
pub trait Tagged {
    fn tag(&self) -> Cow<'_, str>;
}

impl Tagged for str {
    fn tag(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl Tagged for String {
    fn tag(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl<T: Tagged + ?Sized> Tagged for &T {
    fn tag(&self) -> Cow<'_, str> {
        (**self).tag()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
    Discord,
    Telegram,
    Irc,
    Console,
    Other(String),
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Discord => f.write_str("discord"),
            Platform::Telegram => f.write_str("telegram"),
            Platform::Irc => f.write_str("irc"),
            Platform::Console => f.write_str("console"),
            Platform::Other(name) => write!(f, "other/{}", escape_platform(name)),
        }
    }
}

/// Lower-cases the name and escapes the characters that delimit tag parts,
/// so a custom platform can never render like a built-in one.
fn escape_platform(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars().flat_map(char::to_lowercase) {
        match c {
            '%' => escaped.push_str("%25"),
            '/' => escaped.push_str("%2f"),
            ':' => escaped.push_str("%3a"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// The author of a message: a user for private messages, a channel otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: i64,
    pub handle: String,
    pub name: String,
    pub platform: Platform,
}

impl Sender {
    pub fn new(platform: Platform, id: i64) -> Self {
        Self {
            id,
            handle: String::new(),
            name: String::new(),
            platform,
        }
    }

    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = handle.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// `<platform>:<id>`. Handles and display names can change, ids cannot.
impl Tagged for Sender {
    fn tag(&self) -> Cow<'_, str> {
        Cow::Owned(format!("{}:{}", self.platform, self.id))
    }
}
